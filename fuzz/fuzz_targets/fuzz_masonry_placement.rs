#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use masonry_core::metrics::ScrollMetrics;
use masonry_layout::{ItemResolver, LayoutConfig, LayoutSession, MasonryItem, ResolverTable};

#[derive(Debug, Arbitrary)]
struct Input {
    column_width: u8,
    gutter: u8,
    feed_width: u16,
    viewport: u16,
    align_center: bool,
    /// (span, height) pairs; heights are whole pixels so checks are exact.
    items: Vec<(u8, u16)>,
    /// Prefix lengths at which a pass runs.
    passes: Vec<u8>,
}

struct Card {
    span: usize,
    height: f64,
}

impl MasonryItem for Card {
    fn kind(&self) -> &str {
        "Card"
    }
}

fuzz_target!(|input: Input| {
    let config = LayoutConfig::new(f64::from(input.column_width.max(1)), f64::from(input.gutter % 32))
        .with_align_center(input.align_center);
    let metrics = ScrollMetrics::window(f64::from(input.feed_width), f64::from(input.viewport));
    let items: Vec<Card> = input
        .items
        .iter()
        .take(512)
        .map(|&(span, height)| Card {
            span: usize::from(span % 6),
            height: f64::from(height % 2048),
        })
        .collect();
    let table = ResolverTable::new().with(
        "Card",
        ItemResolver::new()
            .with_span(|c: &Card| c.span)
            .with_height(|c: &Card, _| c.height),
    );

    let mut session = LayoutSession::new(&config);
    let mut checkpoints: Vec<usize> = input
        .passes
        .iter()
        .map(|&p| usize::from(p).min(items.len()))
        .collect();
    checkpoints.push(items.len());

    for n in checkpoints {
        session
            .layout(&items[..n], &table, &config, &metrics)
            .expect("Card is registered");

        let Some(grid) = session.grid() else {
            panic!("a pass ran without a grid");
        };
        let placed: Vec<_> = session.placed_items().copied().collect();
        for item in &placed {
            assert!(item.column + item.column_span <= grid.max_columns);
        }
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                let shared = (a.column..a.column + a.column_span).any(|c| b.spans_column(c));
                if shared {
                    assert!(
                        a.bottom() <= b.top || b.bottom() <= a.top,
                        "overlap: {a:?} {b:?}"
                    );
                }
            }
        }
        for page in session.pages() {
            assert!(page.start <= page.stop);
        }
    }
});
