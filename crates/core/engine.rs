//! The per-request clustering pipeline.

use crate::compute::spatial::{IndexOptions, SpatialClusterIndex};
use crate::compute::{
    ClusterAggregator, FilterNormalizer, RecordNormalizer, ResponseAssembler, ZoomPolicy,
};
use crate::config::EngineConfig;
use crate::error::{ClusterError, Result};
use crate::source::SourceFetcher;
use geocluster_types::filter::{FilterSet, RawQuery};
use geocluster_types::response::{ClusterResponse, TotalCount};

/// Runs zoom policy, fan-out, normalization, clustering and assembly for
/// each request.
///
/// Holds only read-only state, so one engine is shared across concurrent
/// requests behind an `Arc`. Build it with [`crate::EngineBuilder`].
#[derive(Debug)]
pub struct ClusterEngine {
    config: EngineConfig,
    policy: ZoomPolicy,
    fetcher: SourceFetcher,
    aggregator: ClusterAggregator,
    assembler: ResponseAssembler,
}

impl ClusterEngine {
    pub(crate) fn new(config: EngineConfig, fetcher: SourceFetcher) -> Self {
        Self {
            policy: ZoomPolicy::from_config(&config),
            aggregator: ClusterAggregator::new(config.sample_limit),
            assembler: ResponseAssembler::new(config.cache),
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn policy(&self) -> &ZoomPolicy {
        &self.policy
    }

    /// Tags of the registered sources, in registration order.
    pub fn source_tags(&self) -> Vec<String> {
        self.fetcher.tags().map(str::to_string).collect()
    }

    /// Answer a query given as raw request parameters.
    ///
    /// Malformed parameters fall back to defaults. Fails only when every
    /// queried source fails or the index cannot be built.
    pub async fn query(&self, raw: &RawQuery) -> Result<ClusterResponse> {
        let filter = FilterNormalizer::normalize(raw);
        let zoom = self.policy.resolve_zoom(raw.zoom.as_deref());
        log::debug!("Query for {:?} at zoom {}", filter.bbox, zoom);
        self.query_filter(&filter, zoom).await
    }

    /// Answer a query with an already normalized filter.
    pub async fn query_filter(&self, filter: &FilterSet, zoom: f64) -> Result<ClusterResponse> {
        let zoom = self.policy.clamp_zoom(zoom);
        let tier = self.policy.policy_for(zoom);

        let report = self.fetcher.fetch_all(filter, tier.max_points).await;
        if report.attempted == 0 {
            log::debug!("No configured source admitted by the filter");
            return Ok(self.assembler.empty(zoom, tier.clustering_enabled));
        }
        for (tag, e) in &report.failures {
            log::warn!("Excluding source '{}' from response: {}", tag, e);
        }
        if report.all_failed() {
            return Err(ClusterError::AllSourcesFailed {
                attempted: report.attempted,
            });
        }

        let mut total_count = TotalCount::new();
        let mut points = Vec::new();
        for batch in &report.batches {
            total_count.record(batch.tag, batch.total);
            points.extend(RecordNormalizer::normalize_batch(
                batch.tag,
                batch.fields,
                &batch.records,
            ));
        }

        log::debug!(
            "zoom={} radius={} budget={} points={} clustering={}",
            zoom,
            tier.radius,
            tier.max_points,
            points.len(),
            tier.clustering_enabled
        );

        if !tier.clustering_enabled {
            return Ok(self.assembler.individual(
                zoom,
                &filter.bbox,
                &points,
                tier.max_points,
                total_count,
            ));
        }

        let options = IndexOptions::from_config(&self.config, tier.radius);
        let index = SpatialClusterIndex::build(points, options)?;
        self.assembler
            .clustered(zoom, &filter.bbox, &index, &self.aggregator, total_count)
    }
}
