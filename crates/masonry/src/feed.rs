#![forbid(unsafe_code)]

//! Feed controller: the surface a renderer drives.
//!
//! [`MasonryFeed`] wires a [`LayoutSession`] to host events. The host
//! forwards mount, item-list, resize, and scroll notifications together with
//! fresh [`ScrollMetrics`], renders whatever pages are visible, and arms a
//! timer at [`MasonryFeed::deadline`] that calls [`MasonryFeed::tick`].
//!
//! | Event | Throttle | Work |
//! |-------|----------|------|
//! | mount | none | rearrange, then a scroll check |
//! | item list changed | none | append or rearrange when the count changed |
//! | resize | 150ms, trailing only | rearrange |
//! | scroll | 100ms, leading + trailing | visibility refresh, load-more check |
//!
//! # Load more
//!
//! Every scroll check that finds the feed end within the threshold calls the
//! registered listener. Nothing is de-duplicated; hosts typically ignore the
//! signal while a fetch is in flight.

use std::fmt;

use masonry_core::metrics::ScrollMetrics;
use masonry_core::throttle::{Throttle, ThrottleConfig};
use masonry_layout::session::LayoutPass;
use masonry_layout::visibility::check_infinite_load;
use masonry_layout::{LayoutConfig, LayoutError, LayoutSession, MasonryItem, Page, ResolverTable};
use web_time::Instant;

/// Static settings for a [`MasonryFeed`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub layout: LayoutConfig,
    pub resize: ThrottleConfig,
    pub scroll: ThrottleConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            resize: ThrottleConfig::resize(),
            scroll: ThrottleConfig::scroll(),
        }
    }
}

impl FeedConfig {
    /// Defaults with the layout section read from `MASONRY_*` variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            layout: LayoutConfig::from_env(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout.validated();
        self
    }

    #[must_use]
    pub fn with_resize_throttle(mut self, config: ThrottleConfig) -> Self {
        self.resize = config;
        self
    }

    #[must_use]
    pub fn with_scroll_throttle(mut self, config: ThrottleConfig) -> Self {
        self.scroll = config;
        self
    }
}

/// What changed while handling one host event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedUpdate {
    /// A layout pass ran.
    pub pass: Option<LayoutPass>,
    /// Some page's visibility flipped.
    pub visibility_changed: bool,
    /// The load-more listener was signaled.
    pub load_more: bool,
}

impl FeedUpdate {
    /// Whether the renderer has to re-read the pages.
    #[must_use]
    pub fn needs_render(&self) -> bool {
        self.pass.is_some() || self.visibility_changed
    }

    fn merge(self, other: Self) -> Self {
        Self {
            pass: other.pass.or(self.pass),
            visibility_changed: self.visibility_changed || other.visibility_changed,
            load_more: self.load_more || other.load_more,
        }
    }
}

type LoadMoreListener = Box<dyn FnMut()>;

/// A virtualized, infinitely scrolling masonry feed.
pub struct MasonryFeed<T> {
    config: FeedConfig,
    table: ResolverTable<T>,
    session: LayoutSession,
    resize: Throttle,
    scroll: Throttle,
    /// Last metrics reported by the host; `None` until mounted.
    metrics: Option<ScrollMetrics>,
    on_load_more: Option<LoadMoreListener>,
    has_more: bool,
    is_loading: bool,
    load_signals: u64,
}

impl<T: MasonryItem> MasonryFeed<T> {
    #[must_use]
    pub fn new(config: FeedConfig, table: ResolverTable<T>) -> Self {
        let session = LayoutSession::new(&config.layout);
        Self {
            resize: Throttle::new(config.resize),
            scroll: Throttle::new(config.scroll),
            config,
            table,
            session,
            metrics: None,
            on_load_more: None,
            has_more: true,
            is_loading: false,
            load_signals: 0,
        }
    }

    /// Register the load-more listener, replacing any previous one.
    pub fn set_load_more<F>(&mut self, listener: F)
    where
        F: FnMut() + 'static,
    {
        self.on_load_more = Some(Box::new(listener));
    }

    #[must_use]
    pub fn with_load_more<F>(mut self, listener: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.set_load_more(listener);
        self
    }

    /// Whether the source can produce more items.
    pub fn set_has_more(&mut self, has_more: bool) {
        self.has_more = has_more;
    }

    /// Whether a fetch is in flight.
    pub fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
    }

    /// Whether to render the "loading next page" cap under the feed.
    #[must_use]
    pub fn shows_loading_cap(&self) -> bool {
        self.has_more && self.is_loading
    }

    // ── Host events ─────────────────────────────────────────────────

    /// Attach to the host surface and run the first layout.
    pub fn mount(
        &mut self,
        items: &[T],
        metrics: ScrollMetrics,
        now: Instant,
    ) -> Result<FeedUpdate, LayoutError> {
        self.metrics = Some(metrics);
        let pass = self.session.rearrange(items, &self.table, &self.config.layout, &metrics)?;
        let mut update = FeedUpdate {
            pass: Some(pass),
            ..FeedUpdate::default()
        };
        if self.scroll.call(now) {
            update = update.merge(self.scroll_check());
        }
        Ok(update)
    }

    /// Detach from the host surface. Pending throttled work is dropped.
    pub fn unmount(&mut self) {
        self.metrics = None;
        self.resize.reset();
        self.scroll.reset();
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.metrics.is_some()
    }

    /// The item list changed. Lays out again only if its length changed.
    pub fn set_items(&mut self, items: &[T]) -> Result<FeedUpdate, LayoutError> {
        let Some(metrics) = self.metrics else {
            return Ok(FeedUpdate::default());
        };
        let pass = self.session.layout(items, &self.table, &self.config.layout, &metrics)?;
        Ok(FeedUpdate {
            pass,
            ..FeedUpdate::default()
        })
    }

    /// The viewport changed size.
    ///
    /// With the default trailing-only throttle nothing runs here; the
    /// rearrange happens in [`tick`](Self::tick) once the window closes.
    pub fn on_resize(
        &mut self,
        items: &[T],
        metrics: ScrollMetrics,
        now: Instant,
    ) -> Result<FeedUpdate, LayoutError> {
        if !self.is_mounted() {
            return Ok(FeedUpdate::default());
        }
        self.metrics = Some(metrics);
        if self.resize.call(now) {
            return self.relayout(items);
        }
        tracing::debug!(pending = self.resize.is_pending(), "resize coalesced");
        Ok(FeedUpdate::default())
    }

    /// The scroll surface moved.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) -> FeedUpdate {
        if !self.is_mounted() {
            return FeedUpdate::default();
        }
        self.metrics = Some(metrics);
        if self.scroll.call(now) {
            self.scroll_check()
        } else {
            FeedUpdate::default()
        }
    }

    /// Run trailing throttled work that has come due.
    pub fn tick(&mut self, items: &[T], now: Instant) -> Result<FeedUpdate, LayoutError> {
        let mut update = FeedUpdate::default();
        if !self.is_mounted() {
            return Ok(update);
        }
        if self.resize.check_timeout(now) {
            update = update.merge(self.relayout(items)?);
        }
        if self.scroll.check_timeout(now) {
            update = update.merge(self.scroll_check());
        }
        Ok(update)
    }

    /// When [`tick`](Self::tick) next has work to do.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        match (self.resize.deadline(), self.scroll.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn relayout(&mut self, items: &[T]) -> Result<FeedUpdate, LayoutError> {
        let Some(metrics) = self.metrics else {
            return Ok(FeedUpdate::default());
        };
        let pass = self.session.rearrange(items, &self.table, &self.config.layout, &metrics)?;
        tracing::debug!(
            pass = pass.as_str(),
            feed_width = metrics.feed_width,
            max_columns = self.session.max_columns(),
            "resize relayout"
        );
        Ok(FeedUpdate {
            pass: Some(pass),
            ..FeedUpdate::default()
        })
    }

    fn scroll_check(&mut self) -> FeedUpdate {
        let Some(metrics) = self.metrics else {
            return FeedUpdate::default();
        };
        let visibility_changed = self.session.refresh_visibility(&metrics);
        let threshold = self.config.layout.threshold_for(metrics.viewport_height);
        let load_more = check_infinite_load(&metrics, threshold);
        if load_more {
            self.load_signals += 1;
            tracing::debug!(
                threshold,
                scroll_top = metrics.scroll_top,
                signals = self.load_signals,
                "load more"
            );
            if let Some(listener) = self.on_load_more.as_mut() {
                listener();
            }
        }
        FeedUpdate {
            pass: None,
            visibility_changed,
            load_more,
        }
    }

    // ── Render state ────────────────────────────────────────────────

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        self.session.pages()
    }

    pub fn visible_pages(&self) -> impl Iterator<Item = &Page> {
        self.session.visible_pages()
    }

    /// Height of the scroll content.
    #[must_use]
    pub fn content_height(&self) -> f64 {
        self.session.content_height()
    }

    #[must_use]
    pub fn session(&self) -> &LayoutSession {
        &self.session
    }

    #[must_use]
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Number of load-more signals emitted so far.
    #[must_use]
    pub fn load_signals(&self) -> u64 {
        self.load_signals
    }
}

impl<T> fmt::Debug for MasonryFeed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasonryFeed")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("mounted", &self.metrics.is_some())
            .field("has_more", &self.has_more)
            .field("is_loading", &self.is_loading)
            .field("load_signals", &self.load_signals)
            .finish_non_exhaustive()
    }
}
