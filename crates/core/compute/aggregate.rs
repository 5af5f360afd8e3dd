//! Per-cluster summary statistics.

use crate::compute::spatial::{ClusterNode, SpatialClusterIndex};
use crate::error::Result;
use geocluster_types::cluster::ClusterSummary;

/// Summarizes index clusters into [`ClusterSummary`] markers.
///
/// `count` is always exact. Price statistics come from at most
/// `sample_limit` leaves, so their cost is bounded regardless of cluster
/// size.
#[derive(Debug, Clone, Copy)]
pub struct ClusterAggregator {
    sample_limit: usize,
}

/// Running min/max/sum over the priced leaves of a sample.
#[derive(Debug, Default)]
struct PriceStats {
    min: f64,
    max: f64,
    sum: f64,
    priced: usize,
}

impl PriceStats {
    fn add(&mut self, price: f64) {
        if self.priced == 0 {
            self.min = price;
            self.max = price;
        } else {
            self.min = self.min.min(price);
            self.max = self.max.max(price);
        }
        self.sum += price;
        self.priced += 1;
    }

    /// `(min, max, avg)` with the average rounded and kept within `[min, max]`.
    fn finish(&self) -> Option<(f64, f64, f64)> {
        if self.priced == 0 {
            return None;
        }
        let avg = (self.sum / self.priced as f64).round();
        Some((self.min, self.max, avg.clamp(self.min, self.max)))
    }
}

impl ClusterAggregator {
    pub fn new(sample_limit: usize) -> Self {
        Self {
            sample_limit: sample_limit.max(1),
        }
    }

    pub fn sample_limit(&self) -> usize {
        self.sample_limit
    }

    pub fn summarize(
        &self,
        index: &SpatialClusterIndex,
        cluster: &ClusterNode,
    ) -> Result<ClusterSummary> {
        let mut stats = PriceStats::default();
        for leaf in index.leaves_of(cluster.id, self.sample_limit, 0)? {
            if let Some(price) = leaf.price {
                stats.add(price);
            }
        }
        let prices = stats.finish();

        Ok(ClusterSummary {
            id: cluster.id,
            latitude: cluster.lat,
            longitude: cluster.lng,
            count: cluster.point_count,
            min_price: prices.map(|(min, _, _)| min),
            max_price: prices.map(|(_, max, _)| max),
            avg_price: prices.map(|(_, _, avg)| avg),
            expansion_zoom: index.expansion_zoom(cluster.id)?,
        })
    }
}

impl Default for ClusterAggregator {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::spatial::{IndexEntry, IndexOptions};
    use geocluster_types::bbox::BoundingBox;
    use geocluster_types::point::Point;

    fn clustered(points: Vec<Point>) -> (SpatialClusterIndex, ClusterNode) {
        let index = SpatialClusterIndex::build(points, IndexOptions::default()).unwrap();
        let node = match index.clusters_in(&BoundingBox::world(), 0.0).as_slice() {
            [IndexEntry::Cluster(node)] => *node,
            other => panic!("expected a single cluster, got {:?}", other),
        };
        (index, node)
    }

    fn nearby(count: usize, price: impl Fn(usize) -> Option<f64>) -> Vec<Point> {
        (0..count)
            .map(|i| {
                let mut point = Point::new(format!("t:{}", i), "t", 34.0, -118.0 + i as f64 * 1e-4);
                point.price = price(i);
                point
            })
            .collect()
    }

    #[test]
    fn test_price_statistics() {
        let prices = [100_000.0, 250_001.0, 400_000.0];
        let (index, node) = clustered(nearby(3, |i| Some(prices[i])));
        let summary = ClusterAggregator::default().summarize(&index, &node).unwrap();

        assert_eq!(summary.count, 3);
        assert_eq!(summary.min_price, Some(100_000.0));
        assert_eq!(summary.max_price, Some(400_000.0));
        assert_eq!(summary.avg_price, Some(250_000.0));
        assert!(summary.prices_ordered());
    }

    #[test]
    fn test_missing_prices_ignored() {
        let (index, node) = clustered(nearby(4, |i| (i % 2 == 0).then_some(500_000.0)));
        let summary = ClusterAggregator::default().summarize(&index, &node).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.min_price, Some(500_000.0));
        assert_eq!(summary.avg_price, Some(500_000.0));
    }

    #[test]
    fn test_unpriced_cluster() {
        let (index, node) = clustered(nearby(2, |_| None));
        let summary = ClusterAggregator::default().summarize(&index, &node).unwrap();
        assert_eq!(summary.min_price, None);
        assert_eq!(summary.max_price, None);
        assert_eq!(summary.avg_price, None);
        assert!(summary.prices_ordered());
    }

    #[test]
    fn test_sampling_bounds_statistics_not_count() {
        let (index, node) = clustered(nearby(50, |i| Some(1000.0 * (i + 1) as f64)));
        let aggregator = ClusterAggregator::new(5);
        let summary = aggregator.summarize(&index, &node).unwrap();

        let sampled: Vec<f64> = index
            .leaves_of(node.id, 5, 0)
            .unwrap()
            .iter()
            .filter_map(|leaf| leaf.price)
            .collect();
        assert_eq!(summary.count, 50);
        assert_eq!(
            summary.max_price,
            sampled.iter().copied().reduce(f64::max)
        );
        assert!(summary.prices_ordered());
    }

    #[test]
    fn test_expansion_zoom_above_query() {
        let (index, node) = clustered(nearby(3, |_| None));
        let summary = ClusterAggregator::default().summarize(&index, &node).unwrap();
        assert!(summary.expansion_zoom >= 1);
        assert!(summary.expansion_zoom <= 13);
    }
}
