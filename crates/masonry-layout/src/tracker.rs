#![forbid(unsafe_code)]

//! Column frontier and gap bookkeeping.
//!
//! [`ColumnTracker`] records, for every column, the **frontier** (the lowest
//! y at which a new item may start flush) and the **gaps** (unoccupied
//! vertical runs below the frontier that a later item may fill).
//!
//! # Gap lifecycle
//!
//! ```text
//!   col 0   col 1          A 2-span item placed at top=110 over columns
//!   ┌────┐  ┌────┐         whose frontiers are [110, 50] leaves column 1
//!   │    │  │    │         empty between y=50 and y=100 (110 - gutter).
//!   │    │  └────┘ 40
//!   │    │   gap   50..100
//!   └────┘         100
//!   ┌─────────────┐ 110
//!   │  2-span     │
//!   └─────────────┘
//! ```
//!
//! - **Created** when a placement starts below a column's frontier:
//!   `(frontier, top - frontier - gutter)`.
//! - **Consumed** when a placement overlaps it. Whatever is left above or
//!   below the new item (minus one gutter) stays behind as a smaller gap.
//! - **Pruned** once it lies entirely above the lowest top among the most
//!   recent `window` placements. Only gaps near the active edge of the feed
//!   are worth filling, and pruning keeps gap scans bounded.
//!
//! # Invariants
//!
//! 1. Gaps never overlap any placed item's `[top - gutter, bottom + gutter)`
//!    band in their column.
//! 2. Gaps in a column are sorted by `top` and have positive height.
//! 3. A column frontier never decreases.

use std::collections::VecDeque;

use masonry_core::geometry::{Interval, snap_top_px};
use serde::{Deserialize, Serialize};

/// An unoccupied vertical run inside one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    /// First free y.
    pub top: f64,
    /// Free height an item may use.
    pub height: f64,
}

impl Gap {
    #[inline]
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// One past the last free y.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[inline]
    pub fn interval(&self) -> Interval {
        Interval::from_extent(self.top, self.height)
    }

    /// Whether an item of `height` fits once its top is snapped to a pixel.
    #[inline]
    pub fn fits(&self, height: f64) -> bool {
        interval_fits(&self.interval(), height)
    }

    fn from_interval(iv: Interval) -> Option<Self> {
        (!iv.is_empty()).then(|| Self::new(iv.start, iv.len()))
    }
}

/// Whether `[snap_top_px(iv.start), iv.end)` can hold `height` pixels.
#[inline]
pub fn interval_fits(iv: &Interval, height: f64) -> bool {
    iv.end - snap_top_px(iv.start) >= height
}

/// Per-column frontier heights plus per-column gap lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTracker {
    heights: Vec<f64>,
    gaps: Vec<Vec<Gap>>,
    /// Tops of the most recent placements, oldest first.
    recent_tops: VecDeque<f64>,
    /// Sliding window length for staleness pruning.
    window: usize,
}

impl ColumnTracker {
    /// Empty tracker for `max_columns` columns (at least one).
    #[must_use]
    pub fn new(max_columns: usize, window: usize) -> Self {
        let columns = max_columns.max(1);
        Self {
            heights: vec![0.0; columns],
            gaps: vec![Vec::new(); columns],
            recent_tops: VecDeque::new(),
            window: window.max(1),
        }
    }

    // ── Configuration ───────────────────────────────────────────────

    /// Change the sliding window length, dropping the oldest tops if needed.
    pub fn set_window(&mut self, window: usize) {
        self.window = window.max(1);
        while self.recent_tops.len() > self.window {
            self.recent_tops.pop_front();
        }
    }

    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    #[must_use]
    pub fn max_columns(&self) -> usize {
        self.heights.len()
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Frontier of every column.
    #[must_use]
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Frontiers of `span` columns starting at `column`.
    #[must_use]
    pub fn span_heights(&self, column: usize, span: usize) -> &[f64] {
        &self.heights[column..column + span]
    }

    /// Column with the smallest frontier; ties go to the lowest index.
    #[must_use]
    pub fn shortest_column(&self) -> usize {
        let mut best = 0;
        for (column, &height) in self.heights.iter().enumerate().skip(1) {
            if height < self.heights[best] {
                best = column;
            }
        }
        best
    }

    /// Gaps in `column`, sorted by top.
    #[must_use]
    pub fn gaps_in(&self, column: usize) -> &[Gap] {
        &self.gaps[column]
    }

    /// Total number of tracked gaps.
    #[must_use]
    pub fn gap_count(&self) -> usize {
        self.gaps.iter().map(Vec::len).sum()
    }

    /// Whether `column` has any gap at least `height` tall.
    #[must_use]
    pub fn has_gap_at_least(&self, column: usize, height: f64) -> bool {
        self.gaps[column].iter().any(|g| g.height >= height)
    }

    /// First gap able to hold `height`, scanning columns left to right and
    /// each column's gaps top to bottom.
    #[must_use]
    pub fn first_fitting_gap(&self, height: f64) -> Option<(usize, Gap)> {
        self.gaps.iter().enumerate().find_map(|(column, gaps)| {
            gaps.iter()
                .find(|g| g.fits(height))
                .map(|&g| (column, g))
        })
    }

    // ── Mutation ────────────────────────────────────────────────────

    /// Record an item occupying `[top, top + height)` in `span` columns
    /// starting at `column`.
    pub fn record_placement(
        &mut self,
        column: usize,
        span: usize,
        top: f64,
        height: f64,
        gutter: f64,
    ) {
        let bottom = top + height;
        let occupied = Interval::new(top - gutter, bottom + gutter);

        for c in column..column + span {
            let current = self.heights[c];
            if top > current {
                let skipped = top - current - gutter;
                if skipped > 0.0 {
                    self.gaps[c].push(Gap::new(current, skipped));
                }
            }

            let old = std::mem::take(&mut self.gaps[c]);
            let mut kept = Vec::with_capacity(old.len() + 1);
            for gap in old {
                let free = gap.interval();
                if !free.overlaps(&occupied) {
                    kept.push(gap);
                    continue;
                }
                let above = Interval::new(free.start, free.end.min(occupied.start));
                let below = Interval::new(free.start.max(occupied.end), free.end);
                kept.extend(Gap::from_interval(above));
                kept.extend(Gap::from_interval(below));
            }
            kept.sort_by(|a, b| a.top.total_cmp(&b.top));
            self.gaps[c] = kept;

            self.heights[c] = current.max(bottom + gutter);
        }

        self.push_recent_top(top);
        self.prune_stale();
    }

    fn push_recent_top(&mut self, top: f64) {
        if self.recent_tops.len() == self.window {
            self.recent_tops.pop_front();
        }
        self.recent_tops.push_back(top);
    }

    /// Drop gaps lying entirely above every recent placement.
    fn prune_stale(&mut self) {
        let Some(floor) = self.recent_tops.iter().copied().reduce(f64::min) else {
            return;
        };
        for column in &mut self.gaps {
            column.retain(|g| g.bottom() > floor);
        }
    }
}
