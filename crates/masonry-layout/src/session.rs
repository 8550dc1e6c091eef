#![forbid(unsafe_code)]

//! Layout session: owns all layout state and runs layout passes.
//!
//! A [`LayoutSession`] holds the column tracker, the pages, the running
//! average height, and the number of input items already consumed. Two pass
//! kinds exist:
//!
//! | Pass | When | Effect |
//! |------|------|--------|
//! | [`LayoutPass::Rearrange`] | first layout, grid change, shrinking item list, forced | Discards all state and places every item |
//! | [`LayoutPass::Append`] | item list grew, grid unchanged | Places only the new items; the last page keeps filling |
//!
//! # Transactional passes
//!
//! Every item of a pass is resolved before anything is placed. A
//! [`LayoutError`] therefore leaves the session exactly as it was, and the
//! next triggering event retries with the then-current list.
//!
//! # Force-Full Fallback
//!
//! With [`LayoutConfig::force_full_layout`] (or `MASONRY_FULL_LAYOUT=1` via
//! [`LayoutConfig::from_env`]) every pass is a rearrange.
//!
//! # Usage
//!
//! ```
//! use masonry_core::metrics::ScrollMetrics;
//! use masonry_layout::config::LayoutConfig;
//! use masonry_layout::resolver::{ItemResolver, MasonryItem, ResolverTable};
//! use masonry_layout::session::{LayoutPass, LayoutSession};
//!
//! struct Tile(f64);
//! impl MasonryItem for Tile {
//!     fn kind(&self) -> &str { "Tile" }
//! }
//!
//! let table = ResolverTable::new()
//!     .with("Tile", ItemResolver::new().with_height(|t: &Tile, _| t.0));
//! let config = LayoutConfig::new(100.0, 10.0).with_align_center(false);
//! let metrics = ScrollMetrics::window(320.0, 600.0);
//!
//! let mut session = LayoutSession::new(&config);
//! let mut items = vec![Tile(50.0), Tile(80.0), Tile(30.0)];
//! assert_eq!(
//!     session.layout(&items, &table, &config, &metrics).unwrap(),
//!     Some(LayoutPass::Rearrange)
//! );
//!
//! items.push(Tile(60.0));
//! assert_eq!(
//!     session.layout(&items, &table, &config, &metrics).unwrap(),
//!     Some(LayoutPass::Append)
//! );
//! assert_eq!(session.placed_items().last().unwrap().top, 40.0);
//! ```

use serde::{Deserialize, Serialize};

use masonry_core::metrics::ScrollMetrics;

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::paginator::{Page, PlacedItem, Paginator, items_per_page};
use crate::placement::{ColumnGrid, PlacementKind, place};
use crate::resolver::{MasonryItem, ResolvedBatch, ResolverTable};
use crate::tracker::ColumnTracker;
use crate::visibility::{ViewingWindow, refresh_visibility};

// ============================================================================
// LayoutPass / LayoutStats
// ============================================================================

/// Which kind of pass ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutPass {
    Rearrange,
    Append,
}

impl LayoutPass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rearrange => "rearrange",
            Self::Append => "append",
        }
    }
}

/// Counters for the most recent pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStats {
    /// Items placed in this pass.
    pub placed: usize,
    /// Items skipped because their height was unusable.
    pub skipped: usize,
    /// Placements that filled a gap.
    pub gap_fills: usize,
    /// Placements stacked on a frontier.
    pub flush: usize,
    /// Page capacity used for this pass.
    pub items_per_page: usize,
}

impl LayoutStats {
    /// Fraction of placements that filled a gap (0.0 – 1.0).
    pub fn gap_fill_rate(&self) -> f64 {
        if self.placed == 0 {
            0.0
        } else {
            self.gap_fills as f64 / self.placed as f64
        }
    }
}

// ============================================================================
// LayoutSnapshot
// ============================================================================

/// Serializable view of a session, for debugging and golden tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub grid: Option<ColumnGrid>,
    pub average_height: f64,
    pub last_working_index: usize,
    pub last_pass: Option<LayoutPass>,
    pub stats: LayoutStats,
    pub tracker: ColumnTracker,
    pub pages: Vec<Page>,
}

// ============================================================================
// LayoutSession
// ============================================================================

/// All mutable layout state for one feed.
#[derive(Debug, Clone)]
pub struct LayoutSession {
    grid: Option<ColumnGrid>,
    tracker: ColumnTracker,
    paginator: Paginator,
    /// Average item height feeding the next pass's page capacity.
    average_height: f64,
    /// Number of input items consumed so far.
    last_working_index: usize,
    last_pass: Option<LayoutPass>,
    stats: LayoutStats,
}

impl LayoutSession {
    /// Empty session. Only `config.default_average_height` is read here.
    #[must_use]
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            grid: None,
            tracker: ColumnTracker::new(1, 1),
            paginator: Paginator::new(1),
            average_height: config.default_average_height.max(1.0),
            last_working_index: 0,
            last_pass: None,
            stats: LayoutStats::default(),
        }
    }

    // ── Pass selection ──────────────────────────────────────────────

    /// The pass [`layout`](Self::layout) would run, or `None` when nothing
    /// changed.
    #[must_use]
    pub fn plan(&self, item_count: usize, config: &LayoutConfig, feed_width: f64) -> Option<LayoutPass> {
        let grid = ColumnGrid::measure(config, feed_width);
        if config.force_full_layout || self.grid != Some(grid) {
            return Some(LayoutPass::Rearrange);
        }
        match item_count.cmp(&self.last_working_index) {
            std::cmp::Ordering::Less => Some(LayoutPass::Rearrange),
            std::cmp::Ordering::Greater => Some(LayoutPass::Append),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Run whichever pass [`plan`](Self::plan) selects.
    pub fn layout<T: MasonryItem>(
        &mut self,
        items: &[T],
        table: &ResolverTable<T>,
        config: &LayoutConfig,
        metrics: &ScrollMetrics,
    ) -> Result<Option<LayoutPass>, LayoutError> {
        match self.plan(items.len(), config, metrics.feed_width) {
            Some(LayoutPass::Rearrange) => self.rearrange(items, table, config, metrics).map(Some),
            Some(LayoutPass::Append) => self.append(items, table, config, metrics).map(Some),
            None => Ok(None),
        }
    }

    // ── Passes ──────────────────────────────────────────────────────

    /// Discard all state and place every item.
    pub fn rearrange<T: MasonryItem>(
        &mut self,
        items: &[T],
        table: &ResolverTable<T>,
        config: &LayoutConfig,
        metrics: &ScrollMetrics,
    ) -> Result<LayoutPass, LayoutError> {
        let grid = ColumnGrid::measure(config, metrics.feed_width);
        let per_page = items_per_page(grid.max_columns, metrics.viewport_height, self.average_height);

        let _span = tracing::debug_span!(
            "masonry.layout",
            pass = "rearrange",
            items = items.len(),
            max_columns = grid.max_columns,
            items_per_page = per_page
        )
        .entered();

        let batch = table.resolve_from(items, 0, grid.max_columns)?;

        self.grid = Some(grid);
        self.tracker = ColumnTracker::new(grid.max_columns, per_page);
        self.paginator = Paginator::new(per_page);
        self.stats = LayoutStats {
            items_per_page: per_page,
            ..LayoutStats::default()
        };
        self.place_batch(&grid, &batch, items.len(), metrics);
        self.last_pass = Some(LayoutPass::Rearrange);
        Ok(LayoutPass::Rearrange)
    }

    /// Place `items[last_working_index..]` onto the existing layout.
    ///
    /// Falls back to [`rearrange`](Self::rearrange) when there is no prior
    /// layout, the grid changed, or the list shrank.
    pub fn append<T: MasonryItem>(
        &mut self,
        items: &[T],
        table: &ResolverTable<T>,
        config: &LayoutConfig,
        metrics: &ScrollMetrics,
    ) -> Result<LayoutPass, LayoutError> {
        let grid = ColumnGrid::measure(config, metrics.feed_width);
        if self.grid != Some(grid) || items.len() < self.last_working_index {
            return self.rearrange(items, table, config, metrics);
        }
        let per_page = items_per_page(grid.max_columns, metrics.viewport_height, self.average_height);

        let _span = tracing::debug_span!(
            "masonry.layout",
            pass = "append",
            items = items.len() - self.last_working_index,
            max_columns = grid.max_columns,
            items_per_page = per_page
        )
        .entered();

        let batch = table.resolve_from(items, self.last_working_index, grid.max_columns)?;

        self.tracker.set_window(per_page);
        self.paginator.set_capacity(per_page);
        self.stats = LayoutStats {
            items_per_page: per_page,
            ..LayoutStats::default()
        };
        self.place_batch(&grid, &batch, items.len(), metrics);
        self.last_pass = Some(LayoutPass::Append);
        Ok(LayoutPass::Append)
    }

    fn place_batch(
        &mut self,
        grid: &ColumnGrid,
        batch: &ResolvedBatch,
        item_count: usize,
        metrics: &ScrollMetrics,
    ) {
        for desc in &batch.descriptors {
            let placement = place(&mut self.tracker, grid, desc.column_span, desc.height);
            match placement.kind {
                PlacementKind::GapFill => self.stats.gap_fills += 1,
                PlacementKind::Flush => self.stats.flush += 1,
            }
            self.paginator.push(PlacedItem {
                index: desc.index,
                column: placement.column,
                column_span: desc.column_span,
                left: placement.left,
                top: placement.top,
                width: grid.width_of(desc.column_span),
                height: desc.height,
            });
        }
        self.paginator.finish();

        self.stats.placed = batch.descriptors.len();
        self.stats.skipped = batch.skipped;
        self.last_working_index = item_count;
        if let Some(average) = self.paginator.average_height() {
            self.average_height = average;
        }
        self.refresh_visibility(metrics);

        tracing::debug!(
            placed = self.stats.placed,
            skipped = self.stats.skipped,
            gap_fills = self.stats.gap_fills,
            pages = self.paginator.pages().len(),
            average_height = self.average_height,
            "layout pass complete"
        );
    }

    // ── Visibility ──────────────────────────────────────────────────

    /// Recompute page visibility for the scroll position in `metrics`.
    ///
    /// Returns `true` only when some page flipped.
    pub fn refresh_visibility(&mut self, metrics: &ScrollMetrics) -> bool {
        let window = ViewingWindow::for_metrics(metrics);
        refresh_visibility(self.paginator.pages_mut(), &window)
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        self.paginator.pages()
    }

    /// Pages currently flagged visible.
    pub fn visible_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages().iter().filter(|page| page.visible)
    }

    /// Every placed item, in placement order.
    pub fn placed_items(&self) -> impl DoubleEndedIterator<Item = &PlacedItem> {
        self.pages().iter().flat_map(|page| page.items.iter())
    }

    /// Height the scroll content must have: the last page's stop.
    #[must_use]
    pub fn content_height(&self) -> f64 {
        self.paginator.content_height()
    }

    #[must_use]
    pub fn average_height(&self) -> f64 {
        self.average_height
    }

    /// Column count of the current layout (0 before the first pass).
    #[must_use]
    pub fn max_columns(&self) -> usize {
        self.grid.map_or(0, |grid| grid.max_columns)
    }

    #[must_use]
    pub fn grid(&self) -> Option<&ColumnGrid> {
        self.grid.as_ref()
    }

    #[must_use]
    pub fn tracker(&self) -> &ColumnTracker {
        &self.tracker
    }

    /// Number of input items consumed by previous passes.
    #[must_use]
    pub fn last_working_index(&self) -> usize {
        self.last_working_index
    }

    #[must_use]
    pub fn last_pass(&self) -> Option<LayoutPass> {
        self.last_pass
    }

    #[must_use]
    pub fn stats(&self) -> &LayoutStats {
        &self.stats
    }

    /// Capture the full session state.
    #[must_use]
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            grid: self.grid,
            average_height: self.average_height,
            last_working_index: self.last_working_index,
            last_pass: self.last_pass,
            stats: self.stats.clone(),
            tracker: self.tracker.clone(),
            pages: self.paginator.pages().to_vec(),
        }
    }
}

impl Default for LayoutSession {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}
