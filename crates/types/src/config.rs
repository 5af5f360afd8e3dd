use serde::{Deserialize, Serialize};

/// One row of the zoom tier table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoomTier {
    /// Highest zoom (inclusive) this tier applies to.
    pub max_zoom: f64,
    /// Cluster radius in screen pixels.
    pub radius: f64,
    /// Maximum records fetched per source.
    pub max_points: usize,
}

impl ZoomTier {
    pub const fn new(max_zoom: f64, radius: f64, max_points: usize) -> Self {
        Self {
            max_zoom,
            radius,
            max_points,
        }
    }
}

/// Versioned lookup table from zoom threshold to radius and point budget.
///
/// Tiers are ordered by ascending `max_zoom`. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoomTierConfig {
    #[serde(default = "ZoomTierConfig::default_version")]
    pub version: u32,
    pub tiers: Vec<ZoomTier>,
}

impl ZoomTierConfig {
    const fn default_version() -> u32 {
        1
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tiers.is_empty() {
            return Err("Zoom tier table must contain at least one tier".to_string());
        }
        for tier in &self.tiers {
            if !tier.max_zoom.is_finite() {
                return Err("Zoom tier thresholds must be finite".to_string());
            }
            if !(tier.radius.is_finite() && tier.radius > 0.0) {
                return Err(format!(
                    "Zoom tier {} has a non-positive radius",
                    tier.max_zoom
                ));
            }
            if tier.max_points == 0 {
                return Err(format!(
                    "Zoom tier {} has a zero point budget",
                    tier.max_zoom
                ));
            }
        }
        if self
            .tiers
            .windows(2)
            .any(|pair| pair[0].max_zoom >= pair[1].max_zoom)
        {
            return Err("Zoom tiers must be sorted by strictly ascending max_zoom".to_string());
        }
        Ok(())
    }
}

impl Default for ZoomTierConfig {
    fn default() -> Self {
        Self {
            version: Self::default_version(),
            tiers: vec![
                ZoomTier::new(8.0, 120.0, 100),
                ZoomTier::new(10.0, 80.0, 200),
                ZoomTier::new(12.0, 60.0, 500),
                ZoomTier::new(22.0, 40.0, 2000),
            ],
        }
    }
}

/// Resolved policy for a single request zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierPolicy {
    pub radius: f64,
    pub max_points: usize,
    pub clustering_enabled: bool,
}

/// HTTP caching directive advertised on every successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheDirective {
    /// Shared-cache lifetime in seconds.
    #[serde(default = "CacheDirective::default_s_maxage")]
    pub s_maxage: u32,
    /// Window in seconds during which a stale copy may be served while revalidating.
    #[serde(default = "CacheDirective::default_stale_while_revalidate")]
    pub stale_while_revalidate: u32,
}

impl CacheDirective {
    const fn default_s_maxage() -> u32 {
        30
    }

    const fn default_stale_while_revalidate() -> u32 {
        60
    }

    /// Render as a `Cache-Control` header value.
    ///
    /// ```
    /// use geocluster_types::config::CacheDirective;
    ///
    /// assert_eq!(
    ///     CacheDirective::default().header_value(),
    ///     "public, s-maxage=30, stale-while-revalidate=60"
    /// );
    /// ```
    pub fn header_value(&self) -> String {
        format!(
            "public, s-maxage={}, stale-while-revalidate={}",
            self.s_maxage, self.stale_while_revalidate
        )
    }
}

impl Default for CacheDirective {
    fn default() -> Self {
        Self {
            s_maxage: Self::default_s_maxage(),
            stale_while_revalidate: Self::default_stale_while_revalidate(),
        }
    }
}
