#![forbid(unsafe_code)]

//! Viewport and scroll metrics supplied by the host.
//!
//! The layout engine never reads a window or a DOM node directly. The host
//! samples its scroll surface and hands a [`ScrollMetrics`] value to every
//! layout, scroll, or resize call.
//!
//! Two scroll surfaces are supported:
//!
//! | Anchor | Viewport height | Scroll top | Scroll offset |
//! |--------|-----------------|------------|---------------|
//! | [`ScrollAnchor::Window`] | window inner height | page Y offset | feed `offset_top` |
//! | [`ScrollAnchor::Container`] | container offset height | container scroll top | configured offset |

use serde::{Deserialize, Serialize};

/// Which surface scrolls the feed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ScrollAnchor {
    /// The whole page scrolls; the feed sits somewhere inside it.
    #[default]
    Window,
    /// A bounded scroll container hosts the feed.
    Container {
        /// Distance from the top of the container's content to the feed.
        scroll_offset: f64,
    },
}

impl ScrollAnchor {
    /// Whether this anchor is the global window surface.
    #[must_use]
    pub const fn is_window(&self) -> bool {
        matches!(self, Self::Window)
    }
}

/// A snapshot of the host's viewport and scroll state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Scroll surface kind.
    pub anchor: ScrollAnchor,
    /// Width available to the feed (its own offset width).
    pub feed_width: f64,
    /// Height of the visible viewport.
    pub viewport_height: f64,
    /// Current scroll position of the anchor.
    pub scroll_top: f64,
    /// Total scrollable height of the anchor (container mode).
    pub scroll_height: f64,
    /// Distance from the top of the document to the feed (window mode).
    pub offset_top: f64,
    /// Top of the feed's bounding box relative to the viewport.
    pub bounds_top: f64,
    /// Height of the feed's bounding box.
    pub bounds_height: f64,
}

impl ScrollMetrics {
    /// Metrics for a window-scrolled feed.
    #[must_use]
    pub fn window(feed_width: f64, viewport_height: f64) -> Self {
        Self {
            anchor: ScrollAnchor::Window,
            feed_width,
            viewport_height,
            ..Default::default()
        }
    }

    /// Metrics for a feed inside a bounded scroll container.
    #[must_use]
    pub fn container(feed_width: f64, viewport_height: f64, scroll_offset: f64) -> Self {
        Self {
            anchor: ScrollAnchor::Container { scroll_offset },
            feed_width,
            viewport_height,
            ..Default::default()
        }
    }

    /// Set the scroll position.
    #[must_use]
    pub fn with_scroll_top(mut self, scroll_top: f64) -> Self {
        self.scroll_top = scroll_top;
        self
    }

    /// Set the anchor's scrollable height.
    #[must_use]
    pub fn with_scroll_height(mut self, scroll_height: f64) -> Self {
        self.scroll_height = scroll_height;
        self
    }

    /// Set the feed's document offset.
    #[must_use]
    pub fn with_offset_top(mut self, offset_top: f64) -> Self {
        self.offset_top = offset_top;
        self
    }

    /// Set the feed's bounding box.
    #[must_use]
    pub fn with_bounds(mut self, top: f64, height: f64) -> Self {
        self.bounds_top = top;
        self.bounds_height = height;
        self
    }

    /// Offset between the anchor's scroll origin and the top of the feed.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        match self.anchor {
            ScrollAnchor::Window => self.offset_top,
            ScrollAnchor::Container { scroll_offset } => scroll_offset,
        }
    }

    /// Scroll position relative to the top of the feed, never negative.
    #[must_use]
    pub fn feed_scroll_top(&self) -> f64 {
        (self.scroll_top - self.scroll_offset()).max(0.0)
    }

    /// Bottom edge of the feed's bounding box relative to the viewport.
    #[inline]
    #[must_use]
    pub fn bounds_bottom(&self) -> f64 {
        self.bounds_top + self.bounds_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_offset_comes_from_feed_position() {
        let m = ScrollMetrics::window(1024.0, 800.0)
            .with_offset_top(120.0)
            .with_scroll_top(500.0);
        assert_eq!(m.scroll_offset(), 120.0);
        assert_eq!(m.feed_scroll_top(), 380.0);
    }

    #[test]
    fn container_offset_is_configured() {
        let m = ScrollMetrics::container(600.0, 400.0, 64.0)
            .with_offset_top(999.0)
            .with_scroll_top(100.0);
        assert_eq!(m.scroll_offset(), 64.0);
        assert_eq!(m.feed_scroll_top(), 36.0);
    }

    #[test]
    fn feed_scroll_top_clamps_to_zero() {
        let m = ScrollMetrics::window(1024.0, 800.0).with_offset_top(300.0);
        assert_eq!(m.feed_scroll_top(), 0.0);
    }

    #[test]
    fn bounds_bottom_sums_box() {
        let m = ScrollMetrics::window(1024.0, 800.0).with_bounds(-200.0, 700.0);
        assert_eq!(m.bounds_bottom(), 500.0);
        assert!(m.anchor.is_window());
    }
}
