#![forbid(unsafe_code)]

//! Core: geometry, host scroll metrics, and event throttling.
//!
//! # Role in the masonry workspace
//! `masonry-core` is the input layer. It owns the value types the host hands
//! to the layout engine ([`metrics::ScrollMetrics`]), the interval math used
//! for gaps and viewing windows ([`geometry::Interval`]), and the rate limiter
//! that coalesces scroll/resize storms ([`throttle::Throttle`]).
//!
//! # How it fits in the system
//! `masonry-layout` consumes these types to place items and window pages;
//! the `masonry` facade drives the throttles from host events.

pub mod geometry;
pub mod metrics;
pub mod throttle;

pub use geometry::Interval;
pub use metrics::{ScrollAnchor, ScrollMetrics};
pub use throttle::{Throttle, ThrottleConfig};
