#![forbid(unsafe_code)]

//! Column geometry and the placement engine.
//!
//! [`ColumnGrid`] turns the feed width and column settings into a column
//! count and pixel offsets. [`find_placement`] decides where one item goes
//! given the current [`ColumnTracker`] state; [`place`] does the same and
//! records the result.
//!
//! # Algorithm
//!
//! Single-column items:
//! 1. The first gap (columns left to right, gaps top to bottom) tall enough
//!    for the item is filled.
//! 2. Otherwise the item goes flush onto the shortest column; ties go to
//!    the lowest column index.
//!
//! Multi-column items:
//! 1. For every start column, each fitting gap in that column seeds a
//!    candidate interval. Every following spanned column must contribute a
//!    gap whose intersection with the candidate still fits; the candidate
//!    narrows to that intersection. A column's gaps are tried top to bottom,
//!    backtracking when a later column has no match. The first complete
//!    match is filled.
//! 2. Otherwise the item goes flush at the start column whose spanned
//!    frontiers are least jagged (`max - min`), first match on ties, at the
//!    tallest spanned frontier.
//!
//! Tops snap up to whole pixels, lefts round to the nearest pixel.
//!
//! # Complexity
//!
//! Gap lists are pruned to the recent-placement window. Single-column
//! placement is linear in the tracked gaps; the spanning search backtracks
//! across the spanned columns' gap lists.

use masonry_core::geometry::{Interval, snap_px, snap_top_px};
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::tracker::{ColumnTracker, interval_fits};

/// Upper bound on the column count, whatever the feed width.
pub const MAX_COLUMNS: usize = 1024;

// ============================================================================
// ColumnGrid
// ============================================================================

/// Horizontal geometry of one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnGrid {
    /// Number of columns that fit the feed width (at least one).
    pub max_columns: usize,
    pub column_width: f64,
    pub column_gutter: f64,
    /// Left offset of column 0.
    pub viewable_start: f64,
    /// Feed width the grid was measured against.
    pub feed_width: f64,
}

impl ColumnGrid {
    /// Measure the grid for a feed `feed_width` pixels wide.
    ///
    /// `max_columns = floor((width + gutter) / (column_width + gutter))`,
    /// clamped to `1..=MAX_COLUMNS`. With `align_center` the packed columns
    /// are centered; a single column wider than the feed starts at 0.
    #[must_use]
    pub fn measure(config: &LayoutConfig, feed_width: f64) -> Self {
        let column_width = config.column_width;
        let column_gutter = config.column_gutter;
        let width = if feed_width.is_finite() {
            feed_width.max(0.0)
        } else {
            0.0
        };

        let fit = ((width + column_gutter) / (column_width + column_gutter)).floor();
        // Saturating cast: NaN becomes 0.
        let max_columns = (fit as usize).clamp(1, MAX_COLUMNS);

        let mut grid = Self {
            max_columns,
            column_width,
            column_gutter,
            viewable_start: 0.0,
            feed_width: width,
        };
        if config.align_center {
            grid.viewable_start = ((width - grid.spannable_width()) / 2.0).max(0.0);
        }
        grid
    }

    /// Width of all columns plus the gutters between them.
    #[must_use]
    pub fn spannable_width(&self) -> f64 {
        self.width_of(self.max_columns)
    }

    /// Pixel width of an item spanning `span` columns.
    #[must_use]
    pub fn width_of(&self, span: usize) -> f64 {
        let span = span.max(1) as f64;
        span * self.column_width + (span - 1.0) * self.column_gutter
    }

    /// Left edge of `column`, rounded to a whole pixel.
    #[must_use]
    pub fn left_of(&self, column: usize) -> f64 {
        snap_px(self.viewable_start + column as f64 * (self.column_width + self.column_gutter))
    }
}

// ============================================================================
// Placement
// ============================================================================

/// How an item found its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementKind {
    /// Filled a gap left above the frontier.
    GapFill,
    /// Stacked on the column frontier.
    Flush,
}

/// Where one item goes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// First spanned column.
    pub column: usize,
    /// Snapped top edge.
    pub top: f64,
    /// Snapped left edge.
    pub left: f64,
    pub kind: PlacementKind,
}

/// Decide where an item of `span` columns and `height` pixels goes.
///
/// Pure: the tracker is not modified. `span` is clamped to the tracker's
/// column count.
#[must_use]
pub fn find_placement(
    tracker: &ColumnTracker,
    grid: &ColumnGrid,
    span: usize,
    height: f64,
) -> Placement {
    let span = span.clamp(1, tracker.max_columns());
    let (column, top, kind) = if span == 1 {
        find_single(tracker, height)
    } else {
        find_spanning(tracker, span, height)
    };
    Placement {
        column,
        top: snap_top_px(top),
        left: grid.left_of(column),
        kind,
    }
}

/// Find a slot for the item and record it in `tracker`.
pub fn place(
    tracker: &mut ColumnTracker,
    grid: &ColumnGrid,
    span: usize,
    height: f64,
) -> Placement {
    let span = span.clamp(1, tracker.max_columns());
    let placement = find_placement(tracker, grid, span, height);
    tracker.record_placement(
        placement.column,
        span,
        placement.top,
        height,
        grid.column_gutter,
    );
    tracing::trace!(
        column = placement.column,
        span,
        top = placement.top,
        height,
        kind = ?placement.kind,
        "placed item"
    );
    placement
}

fn find_single(tracker: &ColumnTracker, height: f64) -> (usize, f64, PlacementKind) {
    if let Some((column, gap)) = tracker.first_fitting_gap(height) {
        return (column, gap.top, PlacementKind::GapFill);
    }
    let column = tracker.shortest_column();
    (column, tracker.heights()[column], PlacementKind::Flush)
}

fn find_spanning(tracker: &ColumnTracker, span: usize, height: f64) -> (usize, f64, PlacementKind) {
    if let Some((column, top)) = find_spannable_gap(tracker, span, height) {
        return (column, top, PlacementKind::GapFill);
    }

    let mut best_column = 0;
    let mut best_jag = f64::INFINITY;
    let mut best_top = 0.0;
    for start in 0..=(tracker.max_columns() - span) {
        let heights = tracker.span_heights(start, span);
        let max = heights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = heights.iter().copied().fold(f64::INFINITY, f64::min);
        let jag = max - min;
        if jag < best_jag {
            best_column = start;
            best_jag = jag;
            best_top = max;
        }
    }
    (best_column, best_top, PlacementKind::Flush)
}

/// Search for an interval free in `span` adjacent columns.
fn find_spannable_gap(tracker: &ColumnTracker, span: usize, height: f64) -> Option<(usize, f64)> {
    for start in 0..=(tracker.max_columns() - span) {
        for seed in tracker.gaps_in(start).iter().filter(|g| g.fits(height)) {
            if let Some(shared) = narrow(tracker, start + 1, start + span, seed.interval(), height)
            {
                return Some((start, shared.start));
            }
        }
    }
    None
}

/// Intersect `candidate` with a gap from each of `column..end`, trying every
/// fitting gap of a column before giving up on it.
fn narrow(
    tracker: &ColumnTracker,
    column: usize,
    end: usize,
    candidate: Interval,
    height: f64,
) -> Option<Interval> {
    if column == end {
        return Some(candidate);
    }
    tracker.gaps_in(column).iter().find_map(|gap| {
        let shared = gap
            .interval()
            .intersection_opt(&candidate)
            .filter(|iv| interval_fits(iv, height))?;
        narrow(tracker, column + 1, end, shared, height)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::Gap;

    const GUTTER: f64 = 10.0;

    fn grid(columns: usize) -> ColumnGrid {
        let width = columns as f64 * 110.0 - GUTTER;
        ColumnGrid::measure(
            &LayoutConfig::new(100.0, GUTTER).with_align_center(false),
            width,
        )
    }

    fn run(columns: usize, items: &[(usize, f64)]) -> (ColumnTracker, Vec<Placement>) {
        let g = grid(columns);
        let mut tracker = ColumnTracker::new(g.max_columns, 64);
        let placements = items
            .iter()
            .map(|&(span, height)| place(&mut tracker, &g, span, height))
            .collect();
        (tracker, placements)
    }

    // ── Grid ────────────────────────────────────────────────────────

    #[test]
    fn max_columns_counts_inner_gutters_only() {
        let cfg = LayoutConfig::new(100.0, 10.0);
        assert_eq!(ColumnGrid::measure(&cfg, 320.0).max_columns, 3);
        assert_eq!(ColumnGrid::measure(&cfg, 319.0).max_columns, 2);
        assert_eq!(ColumnGrid::measure(&cfg, 50.0).max_columns, 1);
        assert_eq!(ColumnGrid::measure(&cfg, f64::NAN).max_columns, 1);
    }

    #[test]
    fn align_center_splits_leftover_width() {
        let cfg = LayoutConfig::new(100.0, 10.0);
        let g = ColumnGrid::measure(&cfg, 400.0);
        assert_eq!(g.spannable_width(), 320.0);
        assert_eq!(g.viewable_start, 40.0);
        assert_eq!(g.left_of(1), 150.0);

        let g = ColumnGrid::measure(&cfg.clone().with_align_center(false), 400.0);
        assert_eq!(g.viewable_start, 0.0);
        assert_eq!(g.left_of(2), 220.0);
    }

    #[test]
    fn narrow_feed_never_centers_negative() {
        let cfg = LayoutConfig::new(300.0, 10.0);
        let g = ColumnGrid::measure(&cfg, 200.0);
        assert_eq!(g.max_columns, 1);
        assert_eq!(g.viewable_start, 0.0);
    }

    #[test]
    fn width_includes_inner_gutters() {
        let g = grid(3);
        assert_eq!(g.width_of(1), 100.0);
        assert_eq!(g.width_of(2), 210.0);
        assert_eq!(g.width_of(3), 320.0);
    }

    // ── Single span ─────────────────────────────────────────────────

    #[test]
    fn shortest_column_receives_next_item() {
        let (_, p) = run(3, &[(1, 50.0), (1, 80.0), (1, 30.0), (1, 60.0)]);
        let cols: Vec<_> = p.iter().map(|p| p.column).collect();
        assert_eq!(cols, vec![0, 1, 2, 2]);
        assert_eq!(p[3].top, 40.0);
        assert_eq!(p[3].left, 220.0);
        assert!(p.iter().all(|p| p.kind == PlacementKind::Flush));
    }

    #[test]
    fn single_span_prefers_gap_over_shorter_column() {
        // Column 0 tall, then a full-width item leaves gaps in columns 1, 2.
        let (mut tracker, _) = run(3, &[(1, 200.0), (3, 20.0)]);
        let g = grid(3);
        let p = place(&mut tracker, &g, 1, 50.0);
        assert_eq!(p.kind, PlacementKind::GapFill);
        assert_eq!((p.column, p.top), (1, 0.0));
    }

    #[test]
    fn gap_too_small_falls_back_to_flush() {
        let (mut tracker, _) = run(2, &[(1, 100.0), (2, 20.0)]);
        let g = grid(2);
        // Gap in column 1 is 0..100; a 101px item cannot use it.
        let p = place(&mut tracker, &g, 1, 101.0);
        assert_eq!(p.kind, PlacementKind::Flush);
        assert_eq!(p.top, 140.0);
    }

    // ── Multi span ──────────────────────────────────────────────────

    #[test]
    fn least_jagged_start_first_match_on_ties() {
        // Frontiers [100, 40, 100].
        let (tracker, _) = run(3, &[(1, 90.0), (1, 30.0), (1, 90.0)]);
        assert_eq!(tracker.heights(), &[100.0, 40.0, 100.0]);
        let p = find_placement(&tracker, &grid(3), 2, 50.0);
        assert_eq!(p.kind, PlacementKind::Flush);
        assert_eq!((p.column, p.top), (0, 100.0));
    }

    #[test]
    fn spanning_item_prefers_level_columns() {
        // Frontiers [100, 40, 40].
        let (tracker, _) = run(3, &[(1, 90.0), (1, 30.0), (1, 30.0)]);
        let p = find_placement(&tracker, &grid(3), 2, 50.0);
        assert_eq!((p.column, p.top), (1, 40.0));
    }

    #[test]
    fn spanning_item_fills_shared_gap() {
        // Column 0 is tall; a full-width item leaves 0..190 free in
        // columns 1 and 2.
        let (mut tracker, _) = run(3, &[(1, 190.0), (3, 20.0)]);
        let g = grid(3);
        let p = place(&mut tracker, &g, 2, 120.0);
        assert_eq!(p.kind, PlacementKind::GapFill);
        assert_eq!((p.column, p.top), (1, 0.0));
        assert_eq!(p.left, 110.0);
        // Both columns keep the leftover below the new item.
        assert_eq!(tracker.gaps_in(1)[0].top, 130.0);
        assert_eq!(tracker.gaps_in(2)[0].top, 130.0);
    }

    #[test]
    fn spanning_gap_needs_overlap_in_every_column() {
        let g = grid(2);
        let mut tracker = ColumnTracker::new(2, 64);
        // Column 0 free 0..90, column 1 free 150..290: no common interval.
        tracker.record_placement(1, 1, 0.0, 140.0, GUTTER);
        tracker.record_placement(0, 1, 100.0, 190.0, GUTTER);
        tracker.record_placement(0, 2, 300.0, 10.0, GUTTER);
        assert!(!tracker.gaps_in(0).is_empty());
        assert!(!tracker.gaps_in(1).is_empty());
        let p = find_placement(&tracker, &g, 2, 60.0);
        assert_eq!(p.kind, PlacementKind::Flush);
    }

    #[test]
    fn spanning_gap_search_retries_later_gaps_of_a_column() {
        let g = grid(4);
        let mut tracker = ColumnTracker::new(4, 64);
        // Column 0 tall, then a full-width item: columns 1..4 free 0..300.
        tracker.record_placement(0, 1, 0.0, 290.0, GUTTER);
        tracker.record_placement(0, 4, 310.0, 10.0, GUTTER);
        tracker.record_placement(2, 1, 100.0, 40.0, GUTTER);
        tracker.record_placement(3, 1, 0.0, 190.0, GUTTER);
        assert_eq!(
            tracker.gaps_in(2),
            &[Gap::new(0.0, 90.0), Gap::new(150.0, 150.0)]
        );
        assert_eq!(tracker.gaps_in(3), &[Gap::new(200.0, 100.0)]);

        // Column 2's upper gap has no overlap with column 3; its lower one does.
        let p = find_placement(&tracker, &g, 3, 50.0);
        assert_eq!(p.kind, PlacementKind::GapFill);
        assert_eq!((p.column, p.top), (1, 200.0));
    }

    #[test]
    fn spanning_gap_search_still_fails_without_shared_area() {
        let g = grid(4);
        let mut tracker = ColumnTracker::new(4, 64);
        tracker.record_placement(0, 1, 0.0, 290.0, GUTTER);
        tracker.record_placement(0, 4, 310.0, 10.0, GUTTER);
        tracker.record_placement(2, 1, 100.0, 40.0, GUTTER);
        tracker.record_placement(3, 1, 0.0, 260.0, GUTTER);
        // Column 3 keeps only 270..300, too short for 50px.
        let p = find_placement(&tracker, &g, 3, 50.0);
        assert_eq!(p.kind, PlacementKind::Flush);
        assert_eq!(p.top, 330.0);
    }

    #[test]
    fn span_is_clamped_to_column_count() {
        let (tracker, p) = run(2, &[(5, 40.0)]);
        assert_eq!(p[0].column, 0);
        assert_eq!(tracker.heights(), &[50.0, 50.0]);
    }

    #[test]
    fn fractional_heights_snap_tops_down_screen() {
        let (_, p) = run(1, &[(1, 10.2), (1, 10.0)]);
        // Frontier 20.2 snaps to 21.
        assert_eq!(p[1].top, 21.0);
    }
}
