//! Final payload assembly.

use crate::compute::aggregate::ClusterAggregator;
use crate::compute::spatial::{IndexEntry, SpatialClusterIndex};
use crate::config::CacheDirective;
use crate::error::Result;
use geocluster_types::bbox::BoundingBox;
use geocluster_types::point::Point;
use geocluster_types::response::{ClusterResponse, TotalCount};
use geocluster_types::stats::ResponseStats;

/// Merges clusters or listings, totals and cache directives into a
/// [`ClusterResponse`]. Inputs are borrowed and never modified.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseAssembler {
    cache: CacheDirective,
}

impl ResponseAssembler {
    pub fn new(cache: CacheDirective) -> Self {
        Self { cache }
    }

    /// Response for a clustering zoom: every node of `index` visible in
    /// `bbox`, clusters summarized and lone points passed through.
    pub fn clustered(
        &self,
        zoom: f64,
        bbox: &BoundingBox,
        index: &SpatialClusterIndex,
        aggregator: &ClusterAggregator,
        total_count: TotalCount,
    ) -> Result<ClusterResponse> {
        let mut clusters = Vec::new();
        let mut listings = Vec::new();
        for entry in index.clusters_in(bbox, zoom) {
            match entry {
                IndexEntry::Cluster(node) => clusters.push(aggregator.summarize(index, &node)?),
                IndexEntry::Leaf(point) => listings.push(point.clone()),
            }
        }

        let mut stats = ResponseStats::new(index.len());
        stats.record_clusters(clusters.len());
        stats.record_listings(listings.len());

        Ok(ClusterResponse {
            clustered: true,
            zoom,
            clusters,
            listings,
            total_count,
            stats,
            cache: self.cache,
        })
    }

    /// Response for a street-level zoom: the points inside `bbox`, in input
    /// order, truncated to `max_points`.
    pub fn individual(
        &self,
        zoom: f64,
        bbox: &BoundingBox,
        points: &[Point],
        max_points: usize,
        total_count: TotalCount,
    ) -> ClusterResponse {
        let listings: Vec<Point> = points
            .iter()
            .filter(|point| bbox.contains(point.lat, point.lng))
            .take(max_points)
            .cloned()
            .collect();

        let mut stats = ResponseStats::new(points.len());
        stats.record_listings(listings.len());

        ClusterResponse {
            clustered: false,
            zoom,
            clusters: Vec::new(),
            listings,
            total_count,
            stats,
            cache: self.cache,
        }
    }

    /// Successful response carrying nothing, used when no source was queried.
    pub fn empty(&self, zoom: f64, clustered: bool) -> ClusterResponse {
        ClusterResponse {
            clustered,
            zoom,
            clusters: Vec::new(),
            listings: Vec::new(),
            total_count: TotalCount::new(),
            stats: ResponseStats::default(),
            cache: self.cache,
        }
    }
}
