#![forbid(unsafe_code)]

//! Viewing window, page visibility, and the load-more trigger.
//!
//! A page is mounted while its extent touches a window padded by one
//! viewport above and one below the visible area:
//!
//! ```text
//!   scroll_top - vh  ┬  padding
//!   scroll_top       ┼  ┐
//!                    │  │ viewport
//!   scroll_top + vh  ┼  ┘
//!                    │  padding
//!   scroll_top + 2vh ┴
//! ```
//!
//! Both ends are inclusive, so a page ending exactly on the window edge is
//! still visible.

use masonry_core::geometry::Interval;
use masonry_core::metrics::{ScrollAnchor, ScrollMetrics};

use crate::paginator::Page;

/// The padded window pages are tested against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewingWindow {
    pub range: Interval,
}

impl ViewingWindow {
    /// `[scroll_top - viewport_height, scroll_top + 2 × viewport_height]`.
    #[must_use]
    pub fn around(scroll_top: f64, viewport_height: f64) -> Self {
        Self {
            range: Interval::new(
                scroll_top - viewport_height,
                scroll_top + 2.0 * viewport_height,
            ),
        }
    }

    /// Window for the feed-relative scroll position in `metrics`.
    #[must_use]
    pub fn for_metrics(metrics: &ScrollMetrics) -> Self {
        Self::around(metrics.feed_scroll_top(), metrics.viewport_height)
    }
}

/// Whether `page` should be mounted.
#[must_use]
pub fn is_page_visible(page: &Page, window: &ViewingWindow) -> bool {
    page.extent().touches(&window.range)
}

/// Recompute every page's `visible` flag.
///
/// Returns `true` only if at least one flag changed.
pub fn refresh_visibility(pages: &mut [Page], window: &ViewingWindow) -> bool {
    let mut changed = false;
    for page in pages {
        let visible = is_page_visible(page, window);
        changed |= page.visible != visible;
        page.visible = visible;
    }
    changed
}

/// Whether the host should fetch more items.
///
/// - Window anchor: the feed's bottom edge is within `threshold` of the
///   viewport bottom.
/// - Container anchor: less than `threshold` pixels of content remain below
///   the scroll position.
///
/// Callers get a signal on every check that passes; de-duplication while a
/// fetch is in flight is the host's job.
#[must_use]
pub fn check_infinite_load(metrics: &ScrollMetrics, threshold: f64) -> bool {
    match metrics.anchor {
        ScrollAnchor::Window => metrics.bounds_bottom() < metrics.viewport_height + threshold,
        ScrollAnchor::Container { .. } => threshold > metrics.scroll_height - metrics.scroll_top,
    }
}
