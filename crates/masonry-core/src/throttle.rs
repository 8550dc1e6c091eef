#![forbid(unsafe_code)]

//! Rate limiting for high-frequency scroll and resize events.
//!
//! Scroll and resize notifications can arrive far faster than a layout pass
//! is worth running. [`Throttle`] bounds how often the wrapped action runs:
//!
//! - **Leading edge**: the first call outside an active window fires
//!   immediately and opens a new window.
//! - **Trailing edge**: calls that land inside an open window are coalesced
//!   into a single pending invocation that fires once the window closes.
//!   The host drives this with [`Throttle::check_timeout`], typically from a
//!   timer armed at [`Throttle::deadline`].
//!
//! The throttle never reads a clock itself; every method takes `now` so that
//! behavior is deterministic under test.
//!
//! # Usage
//!
//! ```
//! use masonry_core::throttle::{Throttle, ThrottleConfig};
//! use web_time::{Duration, Instant};
//!
//! let mut scroll = Throttle::new(ThrottleConfig::scroll());
//! let t0 = Instant::now();
//!
//! assert!(scroll.call(t0)); // leading edge fires
//! assert!(!scroll.call(t0 + Duration::from_millis(30))); // coalesced
//! assert!(scroll.is_pending());
//!
//! // Window closes: the coalesced call fires once.
//! assert!(scroll.check_timeout(t0 + Duration::from_millis(100)));
//! assert!(!scroll.check_timeout(t0 + Duration::from_millis(250)));
//! ```
//!
//! # Invariants
//!
//! 1. At most one invocation (leading or trailing) fires per window.
//! 2. A trailing invocation is only produced if at least one call was
//!    coalesced since the last invocation.
//! 3. With `trailing == false`, coalesced calls are dropped.

use web_time::{Duration, Instant};

/// Default resize throttle window.
pub const DEFAULT_RESIZE_WINDOW_MS: u64 = 150;

/// Default scroll throttle window.
pub const DEFAULT_SCROLL_WINDOW_MS: u64 = 100;

/// Configuration for a [`Throttle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Minimum spacing between two invocations.
    pub window: Duration,
    /// Fire on the first call of a window.
    pub leading: bool,
    /// Fire once after the window if calls were coalesced.
    pub trailing: bool,
}

impl ThrottleConfig {
    /// Resize handling: trailing-only over 150ms.
    #[must_use]
    pub const fn resize() -> Self {
        Self {
            window: Duration::from_millis(DEFAULT_RESIZE_WINDOW_MS),
            leading: false,
            trailing: true,
        }
    }

    /// Scroll handling: leading and trailing over 100ms.
    #[must_use]
    pub const fn scroll() -> Self {
        Self {
            window: Duration::from_millis(DEFAULT_SCROLL_WINDOW_MS),
            leading: true,
            trailing: true,
        }
    }

    /// Override the window length.
    #[must_use]
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self::scroll()
    }
}

/// Leading/trailing throttle driven by caller-supplied timestamps.
///
/// Not thread-safe; owned by the single event-processing thread.
#[derive(Debug, Clone)]
pub struct Throttle {
    config: ThrottleConfig,
    /// Start of the currently open window.
    window_start: Option<Instant>,
    /// A call was coalesced and awaits the trailing edge.
    pending: bool,
}

impl Throttle {
    /// Create a throttle with the given configuration.
    #[must_use]
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            window_start: None,
            pending: false,
        }
    }

    /// Register a call at `now`.
    ///
    /// Returns `true` when the wrapped action should run immediately.
    pub fn call(&mut self, now: Instant) -> bool {
        if self.window_open(now) {
            self.pending = self.config.trailing;
            return false;
        }

        self.window_start = Some(now);
        if self.config.leading {
            self.pending = false;
            true
        } else {
            self.pending = self.config.trailing;
            false
        }
    }

    /// Fire the trailing invocation if its window has closed.
    ///
    /// Returns `true` when the wrapped action should run now. Firing opens a
    /// fresh window so a burst straddling the boundary still respects the
    /// spacing.
    pub fn check_timeout(&mut self, now: Instant) -> bool {
        if !self.pending || self.window_open(now) {
            return false;
        }
        self.pending = false;
        self.window_start = Some(now);
        true
    }

    /// When the pending trailing invocation becomes due, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        if !self.pending {
            return None;
        }
        self.window_start.map(|start| start + self.config.window)
    }

    /// Whether a coalesced call awaits the trailing edge.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Drop any pending invocation and close the window.
    pub fn reset(&mut self) {
        self.window_start = None;
        self.pending = false;
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    fn window_open(&self, now: Instant) -> bool {
        self.window_start
            .is_some_and(|start| now.saturating_duration_since(start) < self.config.window)
    }
}
