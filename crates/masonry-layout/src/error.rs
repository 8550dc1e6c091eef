#![forbid(unsafe_code)]

//! Layout pass errors.

use std::fmt;

/// A failure that aborts a whole layout pass.
///
/// When a pass fails, the session keeps its previous state; the next
/// triggering event retries with the then-current item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The item's kind has no registered height selector.
    MissingHeightSelector {
        /// Kind tag reported by the item.
        kind: String,
        /// Position of the offending item in the input list.
        index: usize,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeightSelector { kind, index } => write!(
                f,
                "item kind {kind:?} (item {index}) has no height selector registered"
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_kind_and_index() {
        let err = LayoutError::MissingHeightSelector {
            kind: "Banner".to_string(),
            index: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("\"Banner\""));
        assert!(msg.contains("item 7"));
    }

    #[test]
    fn is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&LayoutError::MissingHeightSelector {
            kind: String::new(),
            index: 0,
        });
    }
}
