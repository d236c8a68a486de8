//! Configuration for index construction, marker policy and event timing.
//!
//! Every field has a serde default, so a partial JSON/TOML document only
//! needs to name what it overrides.
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vacancy_types::ShopRecord;

/// Highest zoom level an index may be configured for.
pub const MAX_SUPPORTED_ZOOM: u8 = 30;

/// Parameters of the cluster index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Cluster radius in screen pixels
    #[serde(default = "IndexConfig::default_radius")]
    pub radius: f64,

    /// Tile extent in pixels; the radius is measured against it
    #[serde(default = "IndexConfig::default_extent")]
    pub extent: f64,

    /// Lowest zoom level that gets its own clustering level
    #[serde(default)]
    pub min_zoom: u8,

    /// Highest zoom level that clusters; above it every point is a singleton
    #[serde(default = "IndexConfig::default_max_zoom")]
    pub max_zoom: u8,

    /// Minimum members for a group to be reported as a cluster
    #[serde(default = "IndexConfig::default_min_points")]
    pub min_points: usize,

    /// Tolerance added around every query bbox, in screen pixels at the query zoom
    #[serde(default)]
    pub padding: f64,
}

impl IndexConfig {
    const fn default_radius() -> f64 {
        80.0
    }

    const fn default_extent() -> f64 {
        512.0
    }

    const fn default_max_zoom() -> u8 {
        16
    }

    const fn default_min_points() -> usize {
        2
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_extent(mut self, extent: f64) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(format!("radius must be positive and finite, got {}", self.radius));
        }
        if !self.extent.is_finite() || self.extent <= 0.0 {
            return Err(format!("extent must be positive and finite, got {}", self.extent));
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(format!("padding must be non-negative, got {}", self.padding));
        }
        if self.min_zoom > self.max_zoom {
            return Err(format!(
                "min_zoom ({}) must be <= max_zoom ({})",
                self.min_zoom, self.max_zoom
            ));
        }
        if self.max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(format!(
                "max_zoom must be <= {}, got {}",
                MAX_SUPPORTED_ZOOM, self.max_zoom
            ));
        }
        if self.min_points < 2 {
            return Err("min_points must be at least 2".to_string());
        }
        Ok(())
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            radius: Self::default_radius(),
            extent: Self::default_extent(),
            min_zoom: 0,
            max_zoom: Self::default_max_zoom(),
            min_points: Self::default_min_points(),
            padding: 0.0,
        }
    }
}

/// Shop attribute used to rank point markers when they have to be truncated.
/// Higher values are more important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceKey {
    #[default]
    MonthlyRent,
    Deposit,
    Area,
}

impl ImportanceKey {
    pub fn score(&self, shop: &ShopRecord) -> f64 {
        let value = match self {
            ImportanceKey::MonthlyRent => shop.monthly_rent,
            ImportanceKey::Deposit => shop.deposit,
            ImportanceKey::Area => shop.area,
        };
        if value.is_nan() { f64::NEG_INFINITY } else { value }
    }
}

/// Policy applied when turning query features into on-screen markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkerPolicy {
    /// Upper bound on point markers
    #[serde(default = "MarkerPolicy::default_max_markers")]
    pub max_markers: usize,

    /// Below this zoom, large point sets are cut to a third of `max_markers`
    #[serde(default = "MarkerPolicy::default_min_zoom_threshold")]
    pub min_zoom_threshold: u8,

    #[serde(default)]
    pub importance: ImportanceKey,
}

impl MarkerPolicy {
    const fn default_max_markers() -> usize {
        500
    }

    const fn default_min_zoom_threshold() -> u8 {
        10
    }

    pub fn with_max_markers(mut self, max_markers: usize) -> Self {
        self.max_markers = max_markers;
        self
    }

    pub fn with_min_zoom_threshold(mut self, zoom: u8) -> Self {
        self.min_zoom_threshold = zoom;
        self
    }

    pub fn with_importance(mut self, importance: ImportanceKey) -> Self {
        self.importance = importance;
        self
    }

    /// Point budget when zoomed out past the threshold.
    pub fn zoomed_out_cap(&self) -> usize {
        self.max_markers / 3
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_markers == 0 {
            return Err("max_markers must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl Default for MarkerPolicy {
    fn default() -> Self {
        Self {
            max_markers: Self::default_max_markers(),
            min_zoom_threshold: Self::default_min_zoom_threshold(),
            importance: ImportanceKey::default(),
        }
    }
}

/// Debounce and throttle windows, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    #[serde(default = "TimingConfig::default_viewport_debounce_ms")]
    pub viewport_debounce_ms: u64,

    #[serde(default = "TimingConfig::default_click_throttle_ms")]
    pub click_throttle_ms: u64,

    /// Used by hosts that debounce filter-driven reloads at the call site
    #[serde(default = "TimingConfig::default_filter_debounce_ms")]
    pub filter_debounce_ms: u64,
}

impl TimingConfig {
    const fn default_viewport_debounce_ms() -> u64 {
        300
    }

    const fn default_click_throttle_ms() -> u64 {
        200
    }

    const fn default_filter_debounce_ms() -> u64 {
        500
    }

    pub fn viewport_debounce(&self) -> Duration {
        Duration::from_millis(self.viewport_debounce_ms)
    }

    pub fn click_throttle(&self) -> Duration {
        Duration::from_millis(self.click_throttle_ms)
    }

    pub fn filter_debounce(&self) -> Duration {
        Duration::from_millis(self.filter_debounce_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            viewport_debounce_ms: Self::default_viewport_debounce_ms(),
            click_throttle_ms: Self::default_click_throttle_ms(),
            filter_debounce_ms: Self::default_filter_debounce_ms(),
        }
    }
}

/// Engine configuration
///
/// # Example
///
/// ```rust
/// use vacancy_map::Config;
///
/// let json = r#"{
///     "index": { "radius": 60, "max_zoom": 17 },
///     "policy": { "importance": "area" }
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.index.radius, 60.0);
/// assert_eq!(config.index.min_points, 2);
/// assert_eq!(config.timing.viewport_debounce_ms, 300);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub policy: MarkerPolicy,

    #[serde(default)]
    pub timing: TimingConfig,
}

impl Config {
    pub fn with_index(mut self, index: IndexConfig) -> Self {
        self.index = index;
        self
    }

    pub fn with_policy(mut self, policy: MarkerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        self.index.validate()?;
        self.policy.validate()?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load a TOML config file.
    #[cfg(feature = "toml")]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&contents)?)
    }
}
