#![forbid(unsafe_code)]

//! Masonry public facade crate.
//!
//! Re-exports the layout engine and its input types, and provides
//! [`MasonryFeed`], the controller a renderer drives from host events.

pub mod feed;

// --- Core re-exports -------------------------------------------------------

pub use masonry_core::geometry::Interval;
pub use masonry_core::metrics::{ScrollAnchor, ScrollMetrics};
pub use masonry_core::throttle::{Throttle, ThrottleConfig};

// --- Layout re-exports -----------------------------------------------------

pub use masonry_layout::{
    ColumnGrid, ItemResolver, LayoutConfig, LayoutError, LayoutPass, LayoutSession, LayoutSnapshot,
    LayoutStats, MasonryItem, Page, PlacedItem, ResolverTable,
};

pub use feed::{FeedConfig, FeedUpdate, MasonryFeed};

/// Standard result type for masonry APIs.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Convenience re-exports for feed hosts.
pub mod prelude {
    pub use crate::feed::{FeedConfig, FeedUpdate, MasonryFeed};
    pub use masonry_core::metrics::{ScrollAnchor, ScrollMetrics};
    pub use masonry_layout::{ItemResolver, LayoutConfig, MasonryItem, Page, ResolverTable};
}
