//! Engine configuration
//!
//! Process-wide, read-only settings for the clustering pipeline. Shared value
//! types (zoom tiers, cache directive) live in `geocluster-types` and are
//! re-exported here for convenience.
use crate::error::{ClusterError, Result};
use std::time::Duration;

pub use geocluster_types::config::{CacheDirective, TierPolicy, ZoomTier, ZoomTierConfig};

/// Highest zoom level the index can address without overflowing `2^z`.
const MAX_INDEX_ZOOM: u8 = 30;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub zoom_tiers: ZoomTierConfig,

    /// Requests at or above this zoom return raw listings instead of clusters
    #[serde(default = "EngineConfig::default_individual_point_threshold")]
    pub individual_point_threshold: f64,

    /// Zoom assumed when the request carries none
    #[serde(default = "EngineConfig::default_zoom")]
    pub default_zoom: f64,

    #[serde(default = "EngineConfig::default_min_zoom")]
    pub min_zoom: u8,

    /// Most detailed level at which clusters are formed
    #[serde(default = "EngineConfig::default_max_zoom")]
    pub max_zoom: u8,

    /// Tile extent in pixels; radius is measured relative to it
    #[serde(default = "EngineConfig::default_extent")]
    pub extent: f64,

    /// Minimum number of listings that form a cluster
    #[serde(default = "EngineConfig::default_min_points")]
    pub min_points: u32,

    /// Leaves sampled per cluster for price statistics
    #[serde(default = "EngineConfig::default_sample_limit")]
    pub sample_limit: usize,

    #[serde(default)]
    pub cache: CacheDirective,

    /// Deadline applied to each source's fetch and count
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,
}

impl EngineConfig {
    const fn default_individual_point_threshold() -> f64 {
        13.0
    }

    const fn default_zoom() -> f64 {
        10.0
    }

    const fn default_min_zoom() -> u8 {
        0
    }

    const fn default_max_zoom() -> u8 {
        12
    }

    const fn default_extent() -> f64 {
        512.0
    }

    const fn default_min_points() -> u32 {
        2
    }

    const fn default_sample_limit() -> usize {
        10
    }

    pub fn with_zoom_tiers(mut self, tiers: ZoomTierConfig) -> Self {
        self.zoom_tiers = tiers;
        self
    }

    pub fn with_individual_point_threshold(mut self, zoom: f64) -> Self {
        self.individual_point_threshold = zoom;
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        assert!(min_zoom <= max_zoom, "min_zoom must not exceed max_zoom");
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_sample_limit(mut self, limit: usize) -> Self {
        assert!(limit > 0, "Sample limit must be greater than zero");
        self.sample_limit = limit;
        self
    }

    pub fn with_cache(mut self, cache: CacheDirective) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        self.zoom_tiers.validate()?;

        if self.min_zoom > self.max_zoom {
            return Err("min_zoom must not exceed max_zoom".to_string());
        }
        if self.max_zoom > MAX_INDEX_ZOOM {
            return Err(format!("max_zoom must be at most {}", MAX_INDEX_ZOOM));
        }
        if !self.individual_point_threshold.is_finite() {
            return Err("individual_point_threshold must be finite".to_string());
        }
        if !self.default_zoom.is_finite() {
            return Err("default_zoom must be finite".to_string());
        }
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return Err("extent must be a positive number".to_string());
        }
        if self.min_points < 2 {
            return Err("min_points must be at least 2".to_string());
        }
        if self.sample_limit == 0 {
            return Err("sample_limit must be greater than zero".to_string());
        }
        if self.fetch_timeout_ms == Some(0) {
            return Err("fetch_timeout_ms must be greater than zero".to_string());
        }

        if self.individual_point_threshold > f64::from(self.max_zoom) + 1.0 {
            log::warn!(
                "Clustering stays enabled up to zoom {} but clusters stop forming above zoom {}",
                self.individual_point_threshold,
                self.max_zoom
            );
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate().map_err(ClusterError::InvalidConfig)?;
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate a TOML configuration.
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        config.validate().map_err(ClusterError::InvalidConfig)?;
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zoom_tiers: ZoomTierConfig::default(),
            individual_point_threshold: Self::default_individual_point_threshold(),
            default_zoom: Self::default_zoom(),
            min_zoom: Self::default_min_zoom(),
            max_zoom: Self::default_max_zoom(),
            extent: Self::default_extent(),
            min_points: Self::default_min_points(),
            sample_limit: Self::default_sample_limit(),
            cache: CacheDirective::default(),
            fetch_timeout_ms: None,
        }
    }
}
