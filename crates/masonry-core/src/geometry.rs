#![forbid(unsafe_code)]

//! Geometric primitives.

use serde::{Deserialize, Serialize};

/// A vertical span in content pixels, half-open: `[start, end)`.
///
/// Column gaps, item extents, and viewing windows are all expressed as
/// intervals along the scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Interval {
    /// Top edge (inclusive).
    pub start: f64,
    /// Bottom edge (exclusive).
    pub end: f64,
}

impl Interval {
    /// Create a new interval.
    #[inline]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Create an interval from a top edge and a length.
    #[inline]
    pub fn from_extent(start: f64, len: f64) -> Self {
        Self::new(start, start + len)
    }

    /// Length of the interval (zero when inverted).
    #[inline]
    pub fn len(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Check if the interval has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check if two half-open intervals share any position.
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if two intervals meet when both are treated as closed.
    ///
    /// Used for visibility, where a page ending exactly at the window edge
    /// still counts.
    #[inline]
    pub fn touches(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Compute the intersection with another interval, returning `None` if no overlap.
    #[inline]
    pub fn intersection_opt(&self, other: &Interval) -> Option<Interval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);

        if start < end {
            Some(Interval::new(start, end))
        } else {
            None
        }
    }

    /// Smallest interval containing both.
    pub fn union(&self, other: &Interval) -> Interval {
        Interval::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// Round a horizontal pixel coordinate to a whole pixel.
///
/// Halves round away from zero.
#[inline]
pub fn snap_px(value: f64) -> f64 {
    value.round()
}

/// Round a vertical start coordinate up to a whole pixel.
///
/// Rounding down could pull an item into the band of the item above it.
#[inline]
pub fn snap_top_px(value: f64) -> f64 {
    value.ceil()
}
