#![forbid(unsafe_code)]

//! Layout configuration.
//!
//! # Defaults
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `column_width` | 240px | Fixed width of one column |
//! | `column_gutter` | 16px | Horizontal and vertical spacing between items |
//! | `align_center` | true | Center the packed columns in the feed width |
//! | `default_average_height` | 300px | Page sizing estimate before any item is placed |
//! | `threshold` | `None` | Load-more distance; `None` means twice the viewport height |
//! | `force_full_layout` | false | Run every pass as a full rearrange |
//!
//! # Environment Variables
//!
//! | Variable | Type | Description |
//! |----------|------|-------------|
//! | `MASONRY_COLUMN_WIDTH` | f64 | Column width in pixels |
//! | `MASONRY_COLUMN_GUTTER` | f64 | Gutter in pixels |
//! | `MASONRY_ALIGN_CENTER` | bool | Center columns |
//! | `MASONRY_FULL_LAYOUT` | bool | Disable append passes |

use serde::{Deserialize, Serialize};

/// Page sizing estimate used before the first pass has measured anything.
pub const DEFAULT_AVERAGE_HEIGHT: f64 = 300.0;

/// Default column width in pixels.
pub const DEFAULT_COLUMN_WIDTH: f64 = 240.0;

/// Default gutter in pixels.
pub const DEFAULT_COLUMN_GUTTER: f64 = 16.0;

/// Smallest column width accepted by [`LayoutConfig::validated`].
pub const MIN_COLUMN_WIDTH: f64 = 1.0;

/// Static inputs to every layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of a single column.
    pub column_width: f64,
    /// Spacing between columns and between stacked items.
    pub column_gutter: f64,
    /// Center the packed columns within the available width.
    pub align_center: bool,
    /// Average item height assumed before any item has been placed.
    pub default_average_height: f64,
    /// Pixel distance from the content end that triggers load-more.
    pub threshold: Option<f64>,
    /// Treat every pass as a rearrange, never an append.
    pub force_full_layout: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_width: DEFAULT_COLUMN_WIDTH,
            column_gutter: DEFAULT_COLUMN_GUTTER,
            align_center: true,
            default_average_height: DEFAULT_AVERAGE_HEIGHT,
            threshold: None,
            force_full_layout: false,
        }
    }
}

impl LayoutConfig {
    /// Config with the given column geometry and all other defaults.
    #[must_use]
    pub fn new(column_width: f64, column_gutter: f64) -> Self {
        Self {
            column_width,
            column_gutter,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_column_width(mut self, width: f64) -> Self {
        self.column_width = width;
        self
    }

    #[must_use]
    pub fn with_column_gutter(mut self, gutter: f64) -> Self {
        self.column_gutter = gutter;
        self
    }

    #[must_use]
    pub fn with_align_center(mut self, align_center: bool) -> Self {
        self.align_center = align_center;
        self
    }

    #[must_use]
    pub fn with_default_average_height(mut self, height: f64) -> Self {
        self.default_average_height = height;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    #[must_use]
    pub fn with_force_full_layout(mut self, force: bool) -> Self {
        self.force_full_layout = force;
        self
    }

    /// Load config overrides from environment variables.
    ///
    /// Unparseable values are ignored. The result is [`validated`](Self::validated).
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Split out from [`from_env`](Self::from_env) so the parsing can be tested
    /// without touching process environment.
    #[must_use]
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("MASONRY_COLUMN_WIDTH")
            && let Ok(px) = val.trim().parse::<f64>()
        {
            self.column_width = px;
        }

        if let Some(val) = lookup("MASONRY_COLUMN_GUTTER")
            && let Ok(px) = val.trim().parse::<f64>()
        {
            self.column_gutter = px;
        }

        if let Some(val) = lookup("MASONRY_ALIGN_CENTER") {
            self.align_center = parse_flag(&val);
        }

        if let Some(val) = lookup("MASONRY_FULL_LAYOUT") {
            self.force_full_layout = parse_flag(&val);
        }

        self.validated()
    }

    /// Clamp values to a usable range.
    ///
    /// - `column_width` ≥ 1 (non-finite falls back to the default)
    /// - `column_gutter` ≥ 0 (non-finite falls back to the default)
    /// - `default_average_height` ≥ 1
    /// - `threshold` ≥ 0; a non-finite threshold is dropped
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.column_width = finite_or(self.column_width, DEFAULT_COLUMN_WIDTH).max(MIN_COLUMN_WIDTH);
        self.column_gutter = finite_or(self.column_gutter, DEFAULT_COLUMN_GUTTER).max(0.0);
        self.default_average_height =
            finite_or(self.default_average_height, DEFAULT_AVERAGE_HEIGHT).max(1.0);
        self.threshold = self.threshold.filter(|t| t.is_finite()).map(|t| t.max(0.0));
        self
    }

    /// Whether the config is already within the validated ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        *self == self.clone().validated()
    }

    /// Load-more threshold for the given viewport height.
    #[must_use]
    pub fn threshold_for(&self, viewport_height: f64) -> f64 {
        self.threshold.unwrap_or(viewport_height * 2.0)
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

fn parse_flag(val: &str) -> bool {
    matches!(val.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = LayoutConfig::default();
        assert!(cfg.is_valid());
        assert!(cfg.align_center);
        assert_eq!(cfg.default_average_height, DEFAULT_AVERAGE_HEIGHT);
    }

    #[test]
    fn validated_clamps_ranges() {
        let cfg = LayoutConfig::new(-5.0, -1.0)
            .with_default_average_height(0.0)
            .with_threshold(-10.0)
            .validated();
        assert_eq!(cfg.column_width, MIN_COLUMN_WIDTH);
        assert_eq!(cfg.column_gutter, 0.0);
        assert_eq!(cfg.default_average_height, 1.0);
        assert_eq!(cfg.threshold, Some(0.0));
    }

    #[test]
    fn validated_replaces_non_finite() {
        let cfg = LayoutConfig::new(f64::NAN, f64::INFINITY)
            .with_threshold(f64::NAN)
            .validated();
        assert_eq!(cfg.column_width, DEFAULT_COLUMN_WIDTH);
        assert_eq!(cfg.column_gutter, DEFAULT_COLUMN_GUTTER);
        assert_eq!(cfg.threshold, None);
        assert!(!LayoutConfig::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn env_overrides_parse() {
        let cfg = LayoutConfig::default().with_env_overrides(lookup(&[
            ("MASONRY_COLUMN_WIDTH", "180"),
            ("MASONRY_COLUMN_GUTTER", " 12.5 "),
            ("MASONRY_ALIGN_CENTER", "no"),
            ("MASONRY_FULL_LAYOUT", "YES"),
        ]));
        assert_eq!(cfg.column_width, 180.0);
        assert_eq!(cfg.column_gutter, 12.5);
        assert!(!cfg.align_center);
        assert!(cfg.force_full_layout);
    }

    #[test]
    fn env_overrides_ignore_garbage() {
        let cfg = LayoutConfig::default()
            .with_env_overrides(lookup(&[("MASONRY_COLUMN_WIDTH", "wide")]));
        assert_eq!(cfg.column_width, DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn from_env_returns_valid_config() {
        // The variables may or may not be set in CI; the result is always clamped.
        assert!(LayoutConfig::from_env().is_valid());
    }

    #[test]
    fn threshold_defaults_to_two_viewports() {
        let cfg = LayoutConfig::default();
        assert_eq!(cfg.threshold_for(800.0), 1600.0);
        assert_eq!(cfg.with_threshold(400.0).threshold_for(800.0), 400.0);
    }

    #[test]
    fn parse_flag_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag("true"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn deserializes_partial_json() {
        let cfg: LayoutConfig =
            serde_json::from_str(r#"{"column_width": 100.0, "threshold": 250.0}"#).unwrap();
        assert_eq!(cfg.column_width, 100.0);
        assert_eq!(cfg.column_gutter, DEFAULT_COLUMN_GUTTER);
        assert_eq!(cfg.threshold, Some(250.0));
    }
}
