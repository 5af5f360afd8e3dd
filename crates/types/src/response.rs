use crate::cluster::ClusterSummary;
use crate::config::CacheDirective;
use crate::point::Point;
use crate::stats::ResponseStats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-source totals plus their sum.
///
/// Serializes flat: `{ "<sourceTag>": n, ..., "total": n }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalCount {
    #[serde(flatten)]
    pub by_source: BTreeMap<String, u64>,
    pub total: u64,
}

impl TotalCount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a source's total; a repeated tag replaces the earlier value.
    pub fn record(&mut self, tag: impl Into<String>, count: u64) {
        if let Some(previous) = self.by_source.insert(tag.into(), count) {
            self.total -= previous;
        }
        self.total += count;
    }

    pub fn get(&self, tag: &str) -> Option<u64> {
        self.by_source.get(tag).copied()
    }
}

/// Final payload of a clustered-map query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResponse {
    pub clustered: bool,
    pub zoom: f64,
    pub clusters: Vec<ClusterSummary>,
    pub listings: Vec<Point>,
    pub total_count: TotalCount,
    pub stats: ResponseStats,
    /// Sent as a `Cache-Control` header rather than in the body.
    #[serde(skip)]
    pub cache: CacheDirective,
}

impl ClusterResponse {
    /// Listings represented by this response, counting every cluster member.
    pub fn represented_points(&self) -> u64 {
        self.clusters.iter().map(|c| c.count as u64).sum::<u64>() + self.listings.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_count_flat_shape() {
        let mut totals = TotalCount::new();
        totals.record("gps", 40);
        totals.record("crmls", 60);

        let json = serde_json::to_value(&totals).unwrap();
        assert_eq!(json["gps"], 40);
        assert_eq!(json["crmls"], 60);
        assert_eq!(json["total"], 100);
    }

    #[test]
    fn test_total_count_replaces_repeated_tag() {
        let mut totals = TotalCount::new();
        totals.record("gps", 40);
        totals.record("gps", 10);
        assert_eq!(totals.total, 10);
        assert_eq!(totals.get("gps"), Some(10));
    }

    #[test]
    fn test_response_has_no_cache_field() {
        let response = ClusterResponse {
            clustered: false,
            zoom: 14.0,
            clusters: Vec::new(),
            listings: Vec::new(),
            total_count: TotalCount::new(),
            stats: ResponseStats::default(),
            cache: CacheDirective::default(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("cache").is_none());
        assert_eq!(json["totalCount"]["total"], 0);
        assert_eq!(json["stats"]["listingsReturned"], 0);
    }
}
