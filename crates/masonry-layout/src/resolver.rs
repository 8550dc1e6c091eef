#![forbid(unsafe_code)]

//! Item descriptor resolution: column span and height per item.
//!
//! Each item reports a kind tag through [`MasonryItem::kind`]. A
//! [`ResolverTable`] maps kind tags to an [`ItemResolver`] that knows how to
//! size items of that kind:
//!
//! - the **span selector** returns how many columns the item wants (default 1),
//! - the **height selector** returns the item's pixel height for a given span.
//!
//! # Usage
//!
//! ```
//! use masonry_layout::resolver::{ItemResolver, MasonryItem, ResolverTable};
//!
//! struct Post { featured: bool }
//!
//! impl MasonryItem for Post {
//!     fn kind(&self) -> &str { "Post" }
//! }
//!
//! let table = ResolverTable::new().with(
//!     "Post",
//!     ItemResolver::new()
//!         .with_span(|p: &Post| if p.featured { 2 } else { 1 })
//!         .with_height(|_p: &Post, span| 200.0 + 40.0 * span as f64),
//! );
//!
//! let item = Post { featured: true };
//! let desc = table.resolve(&item, 0, 4).unwrap().unwrap();
//! assert_eq!(desc.column_span, 2);
//! assert_eq!(desc.height, 280.0);
//! ```
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Kind not registered / no height selector | [`LayoutError::MissingHeightSelector`], pass aborts |
//! | Height is NaN, infinite, or negative | `warn!` logged, item skipped |
//! | Span outside `1..=max_columns` | Clamped |

use rustc_hash::FxHashMap;

use crate::error::LayoutError;

/// An item that can be laid out in the grid.
pub trait MasonryItem {
    /// Kind tag used to look up the item's resolver.
    fn kind(&self) -> &str;
}

type SpanSelector<T> = Box<dyn Fn(&T) -> usize>;
type HeightSelector<T> = Box<dyn Fn(&T, usize) -> f64>;

/// Sizing strategy for one item kind.
pub struct ItemResolver<T> {
    span: Option<SpanSelector<T>>,
    height: Option<HeightSelector<T>>,
}

impl<T> ItemResolver<T> {
    /// An empty resolver (span 1, no height selector).
    #[must_use]
    pub fn new() -> Self {
        Self {
            span: None,
            height: None,
        }
    }

    /// Set the column span selector.
    #[must_use]
    pub fn with_span<F>(mut self, selector: F) -> Self
    where
        F: Fn(&T) -> usize + 'static,
    {
        self.span = Some(Box::new(selector));
        self
    }

    /// Set the height selector.
    #[must_use]
    pub fn with_height<F>(mut self, selector: F) -> Self
    where
        F: Fn(&T, usize) -> f64 + 'static,
    {
        self.height = Some(Box::new(selector));
        self
    }

    /// Whether a height selector is present.
    #[must_use]
    pub fn has_height(&self) -> bool {
        self.height.is_some()
    }
}

impl<T> Default for ItemResolver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ItemResolver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemResolver")
            .field("span", &self.span.is_some())
            .field("height", &self.height.is_some())
            .finish()
    }
}

/// Resolved sizing for one input item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemDescriptor {
    /// Position in the caller's item list.
    pub index: usize,
    /// Columns occupied, within `1..=max_columns`.
    pub column_span: usize,
    /// Pixel height.
    pub height: f64,
}

/// Descriptors for a contiguous run of items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedBatch {
    /// Items that will be placed, in input order.
    pub descriptors: Vec<ItemDescriptor>,
    /// Items dropped because their height was unusable.
    pub skipped: usize,
}

/// Kind-tag keyed table of [`ItemResolver`]s.
pub struct ResolverTable<T> {
    resolvers: FxHashMap<String, ItemResolver<T>>,
}

impl<T: MasonryItem> ResolverTable<T> {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolvers: FxHashMap::default(),
        }
    }

    /// Register (or replace) the resolver for `kind`.
    pub fn register(&mut self, kind: impl Into<String>, resolver: ItemResolver<T>) -> &mut Self {
        self.resolvers.insert(kind.into(), resolver);
        self
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, kind: impl Into<String>, resolver: ItemResolver<T>) -> Self {
        self.register(kind, resolver);
        self
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Column span for `item`, clamped to `[1, max_columns]`.
    ///
    /// Kinds without a span selector (or without a resolver) span one column.
    #[must_use]
    pub fn resolve_span(&self, item: &T, max_columns: usize) -> usize {
        let requested = self
            .resolvers
            .get(item.kind())
            .and_then(|r| r.span.as_ref())
            .map_or(1, |select| select(item));
        requested.clamp(1, max_columns.max(1))
    }

    /// Raw height for `item` at the given span.
    pub fn resolve_height(&self, item: &T, index: usize, span: usize) -> Result<f64, LayoutError> {
        let select = self
            .resolvers
            .get(item.kind())
            .and_then(|r| r.height.as_ref())
            .ok_or_else(|| LayoutError::MissingHeightSelector {
                kind: item.kind().to_string(),
                index,
            })?;
        Ok(select(item, span))
    }

    /// Resolve one item.
    ///
    /// Returns `Ok(None)` when the item must be skipped because its height is
    /// not a usable number.
    pub fn resolve(
        &self,
        item: &T,
        index: usize,
        max_columns: usize,
    ) -> Result<Option<ItemDescriptor>, LayoutError> {
        let column_span = self.resolve_span(item, max_columns);
        let height = self.resolve_height(item, index, column_span)?;

        if !height.is_finite() || height < 0.0 {
            tracing::warn!(
                kind = item.kind(),
                index,
                height,
                "skipping feed item: height is not a usable number"
            );
            return Ok(None);
        }

        Ok(Some(ItemDescriptor {
            index,
            column_span,
            height,
        }))
    }

    /// Resolve `items[start..]`, stopping at the first contract violation.
    pub fn resolve_from(
        &self,
        items: &[T],
        start: usize,
        max_columns: usize,
    ) -> Result<ResolvedBatch, LayoutError> {
        let mut batch = ResolvedBatch {
            descriptors: Vec::with_capacity(items.len().saturating_sub(start)),
            skipped: 0,
        };
        for (index, item) in items.iter().enumerate().skip(start) {
            match self.resolve(item, index, max_columns)? {
                Some(desc) => batch.descriptors.push(desc),
                None => batch.skipped += 1,
            }
        }
        Ok(batch)
    }
}

impl<T: MasonryItem> Default for ResolverTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ResolverTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.resolvers.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Card {
        kind: &'static str,
        span: usize,
        height: f64,
    }

    impl MasonryItem for Card {
        fn kind(&self) -> &str {
            self.kind
        }
    }

    fn card(kind: &'static str, span: usize, height: f64) -> Card {
        Card { kind, span, height }
    }

    fn table() -> ResolverTable<Card> {
        ResolverTable::new()
            .with(
                "Card",
                ItemResolver::new()
                    .with_span(|c: &Card| c.span)
                    .with_height(|c: &Card, _| c.height),
            )
            .with(
                "Plain",
                ItemResolver::new().with_height(|c: &Card, span| c.height * span as f64),
            )
            .with("Broken", ItemResolver::new().with_span(|_: &Card| 2))
    }

    // ── Span ────────────────────────────────────────────────────────

    #[test]
    fn span_defaults_to_one() {
        let t = table();
        assert_eq!(t.resolve_span(&card("Plain", 3, 10.0), 4), 1);
        assert_eq!(t.resolve_span(&card("Unknown", 3, 10.0), 4), 1);
    }

    #[test]
    fn span_clamps_to_column_count() {
        let t = table();
        assert_eq!(t.resolve_span(&card("Card", 5, 10.0), 3), 3);
        assert_eq!(t.resolve_span(&card("Card", 0, 10.0), 3), 1);
        assert_eq!(t.resolve_span(&card("Card", 2, 10.0), 0), 1);
    }

    // ── Height ──────────────────────────────────────────────────────

    #[test]
    fn height_selector_receives_span() {
        let t = table();
        let desc = t.resolve(&card("Plain", 1, 50.0), 0, 4).unwrap().unwrap();
        assert_eq!(desc.column_span, 1);
        assert_eq!(desc.height, 50.0);
    }

    #[test]
    fn missing_height_selector_is_fatal() {
        let t = table();
        let err = t.resolve(&card("Broken", 1, 50.0), 3, 4).unwrap_err();
        assert_eq!(
            err,
            LayoutError::MissingHeightSelector {
                kind: "Broken".to_string(),
                index: 3
            }
        );
    }

    #[test]
    fn unregistered_kind_is_fatal() {
        let t = table();
        assert!(t.resolve(&card("Ghost", 1, 50.0), 0, 4).is_err());
    }

    #[test]
    fn nan_height_is_skipped() {
        let t = table();
        assert_eq!(t.resolve(&card("Card", 1, f64::NAN), 0, 4).unwrap(), None);
        assert_eq!(t.resolve(&card("Card", 1, -1.0), 0, 4).unwrap(), None);
        assert_eq!(
            t.resolve(&card("Card", 1, f64::INFINITY), 0, 4).unwrap(),
            None
        );
    }

    // ── Batches ─────────────────────────────────────────────────────

    #[test]
    fn resolve_from_skips_prefix_and_counts_skips() {
        let t = table();
        let items = vec![
            card("Card", 1, 10.0),
            card("Card", 1, f64::NAN),
            card("Card", 2, 30.0),
            card("Plain", 1, 40.0),
        ];
        let batch = t.resolve_from(&items, 1, 3).unwrap();
        assert_eq!(batch.skipped, 1);
        let indices: Vec<_> = batch.descriptors.iter().map(|d| d.index).collect();
        assert_eq!(indices, vec![2, 3]);
        assert_eq!(batch.descriptors[0].column_span, 2);
    }

    #[test]
    fn resolve_from_aborts_on_contract_violation() {
        let t = table();
        let items = vec![card("Card", 1, 10.0), card("Broken", 1, 10.0)];
        assert!(t.resolve_from(&items, 0, 3).is_err());
    }

    #[test]
    fn register_replaces_existing_kind() {
        let mut t = table();
        assert_eq!(t.len(), 3);
        t.register("Card", ItemResolver::new().with_height(|_: &Card, _| 1.0));
        assert_eq!(t.len(), 3);
        let desc = t.resolve(&card("Card", 2, 99.0), 0, 4).unwrap().unwrap();
        assert_eq!(desc.column_span, 1);
        assert_eq!(desc.height, 1.0);
    }

    #[test]
    fn debug_lists_kinds() {
        let dbg = format!("{:?}", table());
        assert!(dbg.contains("Broken"));
        assert!(dbg.contains("height: false"));
    }
}
