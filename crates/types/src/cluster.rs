use serde::{Deserialize, Serialize};

/// Aggregate marker returned for a cluster of two or more listings.
///
/// `count` is always the exact number of listings under the cluster. The
/// price fields are computed over a bounded sample of its leaves and are
/// `None` when no sampled leaf carries a price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub id: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub count: u32,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub avg_price: Option<f64>,
    pub expansion_zoom: u32,
}

impl ClusterSummary {
    /// True when the price statistics are internally consistent.
    pub fn prices_ordered(&self) -> bool {
        match (self.min_price, self.avg_price, self.max_price) {
            (Some(min), Some(avg), Some(max)) => min <= avg && avg <= max,
            (None, None, None) => true,
            _ => false,
        }
    }
}
