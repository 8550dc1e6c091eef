#![forbid(unsafe_code)]

//! Grouping of placed items into fixed-capacity pages.
//!
//! Pages are the unit of virtualization: the renderer mounts only visible
//! pages, so page capacity is sized to roughly one viewport of items:
//!
//! ```text
//! items_per_page = max_columns × ceil(viewport_height / average_height)
//! ```
//!
//! The average height comes from the previous pass, bootstrapping at
//! [`DEFAULT_AVERAGE_HEIGHT`](crate::config::DEFAULT_AVERAGE_HEIGHT).

use masonry_core::geometry::Interval;
use serde::{Deserialize, Serialize};

/// Final geometry of one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    /// Position of the item in the caller's item list.
    pub index: usize,
    pub column: usize,
    pub column_span: usize,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacedItem {
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Vertical extent `[top, bottom)`.
    #[inline]
    pub fn extent(&self) -> Interval {
        Interval::from_extent(self.top, self.height)
    }

    /// Whether the item covers `column`.
    #[inline]
    pub fn spans_column(&self, column: usize) -> bool {
        column >= self.column && column < self.column + self.column_span
    }
}

/// A contiguous run of placed items rendered together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub items: Vec<PlacedItem>,
    /// Smallest item top (0 when empty).
    pub start: f64,
    /// Largest item bottom (0 when empty).
    pub stop: f64,
    pub visible: bool,
}

impl Page {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            index,
            items: Vec::new(),
            start: 0.0,
            stop: 0.0,
            visible: false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Closed vertical extent `[start, stop]`.
    #[must_use]
    pub fn extent(&self) -> Interval {
        Interval::new(self.start, self.stop)
    }

    /// Recompute `start` and `stop` from the items.
    pub fn refresh_extent(&mut self) {
        let extent = self
            .items
            .iter()
            .map(PlacedItem::extent)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        self.start = extent.start;
        self.stop = extent.end;
    }
}

/// Page capacity for one pass.
///
/// Never less than one; a non-positive average falls back to one row per
/// page.
#[must_use]
pub fn items_per_page(max_columns: usize, viewport_height: f64, average_height: f64) -> usize {
    let rows = if average_height > 0.0 && viewport_height.is_finite() {
        (viewport_height.max(0.0) / average_height).ceil()
    } else {
        1.0
    };
    // Saturating cast.
    max_columns.max(1).saturating_mul(rows as usize).max(1)
}

/// Builds pages and tracks the running height mean.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paginator {
    pages: Vec<Page>,
    capacity: usize,
    height_sum: f64,
    height_count: usize,
    /// First page touched since the last [`finish`](Self::finish).
    #[serde(skip)]
    dirty_from: Option<usize>,
}

impl Paginator {
    /// Empty paginator with the given page capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            ..Self::default()
        }
    }

    /// Change the capacity. Existing pages are left as they are; the last
    /// page keeps filling until it reaches the new capacity.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    /// Number of items placed across all pages.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.height_count
    }

    /// Append an item to the last page, starting a new one when full.
    ///
    /// Returns the index of the page that received it.
    pub fn push(&mut self, item: PlacedItem) -> usize {
        let needs_page = self
            .pages
            .last()
            .is_none_or(|page| page.len() >= self.capacity);
        if needs_page {
            self.pages.push(Page::new(self.pages.len()));
        }
        let index = self.pages.len() - 1;
        self.pages[index].items.push(item);

        self.height_sum += item.height;
        self.height_count += 1;
        self.dirty_from.get_or_insert(index);
        index
    }

    /// Refresh `start`/`stop` for every page touched since the last call.
    pub fn finish(&mut self) {
        if let Some(from) = self.dirty_from.take() {
            for page in &mut self.pages[from..] {
                page.refresh_extent();
            }
        }
    }

    /// Rounded mean of every height pushed so far, at least one pixel.
    ///
    /// `None` until an item has been placed.
    #[must_use]
    pub fn average_height(&self) -> Option<f64> {
        (self.height_count > 0)
            .then(|| (self.height_sum / self.height_count as f64).round().max(1.0))
    }

    /// Bottom of the last page (0 when there are no pages).
    #[must_use]
    pub fn content_height(&self) -> f64 {
        self.pages.last().map_or(0.0, |page| page.stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(index: usize, top: f64, height: f64) -> PlacedItem {
        PlacedItem {
            index,
            column: 0,
            column_span: 1,
            left: 0.0,
            top,
            width: 100.0,
            height,
        }
    }

    // ── Capacity ────────────────────────────────────────────────────

    #[test]
    fn items_per_page_rounds_rows_up() {
        assert_eq!(items_per_page(3, 800.0, 300.0), 9);
        assert_eq!(items_per_page(3, 900.0, 300.0), 9);
        assert_eq!(items_per_page(4, 100.0, 300.0), 4);
    }

    #[test]
    fn items_per_page_is_never_zero() {
        assert_eq!(items_per_page(0, 0.0, 300.0), 1);
        assert_eq!(items_per_page(2, 800.0, 0.0), 2);
        assert_eq!(items_per_page(2, f64::NAN, 300.0), 2);
    }

    // ── Pages ───────────────────────────────────────────────────────

    #[test]
    fn pages_fill_to_capacity() {
        let mut p = Paginator::new(2);
        let pages: Vec<_> = (0..5).map(|i| p.push(item(i, 0.0, 10.0))).collect();
        assert_eq!(pages, vec![0, 0, 1, 1, 2]);
        assert_eq!(p.pages().len(), 3);
        assert_eq!(p.pages()[2].index, 2);
    }

    #[test]
    fn finish_refreshes_extents() {
        let mut p = Paginator::new(4);
        p.push(item(0, 20.0, 50.0));
        p.push(item(1, 0.0, 30.0));
        assert_eq!(p.pages()[0].stop, 0.0);
        p.finish();
        assert_eq!(p.pages()[0].start, 0.0);
        assert_eq!(p.pages()[0].stop, 70.0);
        assert_eq!(p.content_height(), 70.0);
    }

    #[test]
    fn page_extent_covers_every_item() {
        let mut page = Page::new(0);
        page.items.push(item(0, 40.0, 20.0));
        page.items.push(item(1, 10.0, 10.0));
        page.refresh_extent();
        assert_eq!(page.extent(), Interval::new(10.0, 60.0));
        assert_eq!(page.items[0].extent(), Interval::new(40.0, 60.0));
    }

    #[test]
    fn empty_page_extent_is_zero() {
        let mut page = Page::new(0);
        page.refresh_extent();
        assert_eq!((page.start, page.stop), (0.0, 0.0));
        assert_eq!(Paginator::new(1).content_height(), 0.0);
    }

    #[test]
    fn growing_capacity_keeps_filling_last_page() {
        let mut p = Paginator::new(2);
        p.push(item(0, 0.0, 10.0));
        p.push(item(1, 0.0, 10.0));
        p.set_capacity(3);
        assert_eq!(p.push(item(2, 0.0, 10.0)), 0);
        assert_eq!(p.push(item(3, 0.0, 10.0)), 1);
    }

    // ── Average ─────────────────────────────────────────────────────

    #[test]
    fn average_is_rounded_mean() {
        let mut p = Paginator::new(8);
        assert_eq!(p.average_height(), None);
        p.push(item(0, 0.0, 100.0));
        p.push(item(1, 0.0, 151.0));
        assert_eq!(p.average_height(), Some(126.0));
    }

    #[test]
    fn average_of_zero_heights_stays_positive() {
        let mut p = Paginator::new(8);
        p.push(item(0, 0.0, 0.0));
        assert_eq!(p.average_height(), Some(1.0));
    }

    #[test]
    fn spans_column_covers_range() {
        let mut it = item(0, 0.0, 10.0);
        it.column = 1;
        it.column_span = 2;
        assert!(!it.spans_column(0));
        assert!(it.spans_column(1));
        assert!(it.spans_column(2));
        assert!(!it.spans_column(3));
    }
}
