use serde::{Deserialize, Serialize};

/// Per-response processing statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStats {
    /// Normalized points fed into clustering (or listing selection)
    pub points_considered: usize,
    pub clusters_returned: usize,
    pub listings_returned: usize,
}

impl ResponseStats {
    pub fn new(points_considered: usize) -> Self {
        Self {
            points_considered,
            ..Self::default()
        }
    }

    pub fn record_clusters(&mut self, count: usize) {
        self.clusters_returned += count;
    }

    pub fn record_listings(&mut self, count: usize) {
        self.listings_returned += count;
    }
}
