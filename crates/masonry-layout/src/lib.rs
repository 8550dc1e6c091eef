#![forbid(unsafe_code)]

//! Masonry grid layout: placement, gap tracking, pagination, visibility.
//!
//! Items of varying height and column span are packed into fixed-width
//! columns. Each pass produces [`PlacedItem`]s grouped into [`Page`]s that a
//! renderer mounts only while they are near the viewport.
//!
//! # Pipeline
//!
//! ```text
//! items ──► ResolverTable ──► place() ◄──► ColumnTracker
//!                                │
//!                                ▼
//!                            Paginator ──► refresh_visibility ──► pages
//! ```
//!
//! [`LayoutSession`] owns the whole pipeline and decides between a full
//! rearrange and an incremental append.

pub mod config;
pub mod error;
pub mod paginator;
pub mod placement;
pub mod resolver;
pub mod session;
pub mod tracker;
pub mod visibility;

pub use config::LayoutConfig;
pub use error::LayoutError;
pub use paginator::{Page, PlacedItem, items_per_page};
pub use placement::{ColumnGrid, Placement, PlacementKind};
pub use resolver::{ItemDescriptor, ItemResolver, MasonryItem, ResolverTable};
pub use session::{LayoutPass, LayoutSession, LayoutSnapshot, LayoutStats};
pub use tracker::{ColumnTracker, Gap};
pub use visibility::{ViewingWindow, check_infinite_load, is_page_visible};
