//! Zoom-dependent clustering policy.

use crate::config::{EngineConfig, TierPolicy, ZoomTierConfig};

/// Deepest zoom a map client can request.
pub const MAX_MAP_ZOOM: f64 = 22.0;

/// Maps a request zoom to a cluster radius, point budget and clustering mode.
///
/// Pure and infallible: every zoom value, including out-of-range and
/// non-finite ones, resolves to some tier.
#[derive(Debug, Clone)]
pub struct ZoomPolicy {
    tiers: ZoomTierConfig,
    individual_point_threshold: f64,
    default_zoom: f64,
}

impl ZoomPolicy {
    pub fn new(tiers: ZoomTierConfig, individual_point_threshold: f64, default_zoom: f64) -> Self {
        Self {
            tiers,
            individual_point_threshold,
            default_zoom,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.zoom_tiers.clone(),
            config.individual_point_threshold,
            config.default_zoom,
        )
    }

    /// Clamp a zoom into `[0, MAX_MAP_ZOOM]`; non-finite values become the default zoom.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        let zoom = if zoom.is_finite() {
            zoom
        } else {
            self.default_zoom
        };
        zoom.clamp(0.0, MAX_MAP_ZOOM)
    }

    /// Parse a raw zoom parameter, falling back to the default zoom.
    pub fn resolve_zoom(&self, raw: Option<&str>) -> f64 {
        let zoom = raw
            .and_then(crate::compute::filter::parse_number)
            .unwrap_or(self.default_zoom);
        self.clamp_zoom(zoom)
    }

    /// Resolve the tier for `zoom`.
    ///
    /// The first tier whose threshold is at or above the zoom wins; beyond
    /// the last threshold the last tier applies.
    ///
    /// ```
    /// use geocluster::compute::ZoomPolicy;
    /// use geocluster::EngineConfig;
    ///
    /// let policy = ZoomPolicy::from_config(&EngineConfig::default());
    /// let tier = policy.policy_for(5.0);
    /// assert_eq!(tier.radius, 120.0);
    /// assert!(tier.clustering_enabled);
    /// ```
    pub fn policy_for(&self, zoom: f64) -> TierPolicy {
        let zoom = self.clamp_zoom(zoom);
        let tier = self
            .tiers
            .tiers
            .iter()
            .find(|tier| tier.max_zoom >= zoom)
            .or_else(|| self.tiers.tiers.last())
            .copied()
            .unwrap_or_else(|| ZoomTierConfig::default().tiers[0]);

        TierPolicy {
            radius: tier.radius,
            max_points: tier.max_points,
            clustering_enabled: zoom < self.individual_point_threshold,
        }
    }

    pub fn table_version(&self) -> u32 {
        self.tiers.version
    }
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
