//! Listing source abstraction and parallel fan-out.
//!
//! A [`ListingSource`] is one upstream listing store. The engine never talks
//! to a store directly: [`SourceFetcher`] queries every admitted source
//! concurrently and reports each one's outcome separately, so a failing
//! store only removes its own listings from the response.

use crate::compute::normalize::{FieldMap, RawRecord};
use crate::error::{ClusterError, Result};
use futures::future::{BoxFuture, join_all, try_join};
use geocluster_types::filter::FilterSet;
use std::sync::Arc;
use std::time::Duration;

mod memory;

pub use memory::MemorySource;

/// Trait for upstream listing stores
///
/// Implementations must be safe to share across concurrent requests.
pub trait ListingSource: Send + Sync {
    /// Provenance label attached to every point from this source
    fn tag(&self) -> &str;

    /// How this source's records map onto canonical point fields
    fn field_map(&self) -> &FieldMap;

    /// Up to `limit` raw records matching `filter`
    fn fetch<'a>(
        &'a self,
        filter: &'a FilterSet,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<RawRecord>>>;

    /// Number of records matching `filter`, ignoring any limit
    fn count<'a>(&'a self, filter: &'a FilterSet) -> BoxFuture<'a, Result<u64>>;
}

/// Records and total from one source that answered both queries.
#[derive(Debug)]
pub struct SourceBatch<'a> {
    pub tag: &'a str,
    pub fields: &'a FieldMap,
    pub records: Vec<RawRecord>,
    pub total: u64,
}

/// Outcome of one fan-out.
#[derive(Debug, Default)]
pub struct FetchReport<'a> {
    pub batches: Vec<SourceBatch<'a>>,
    /// Failed sources with the reason, in source order
    pub failures: Vec<(String, ClusterError)>,
    /// Sources admitted by the filter and queried
    pub attempted: usize,
}

impl FetchReport<'_> {
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.batches.is_empty()
    }
}

/// Queries every admitted source in parallel under an optional deadline.
#[derive(Clone, Default)]
pub struct SourceFetcher {
    sources: Vec<Arc<dyn ListingSource>>,
    timeout: Option<Duration>,
}

impl SourceFetcher {
    pub fn new(sources: Vec<Arc<dyn ListingSource>>, timeout: Option<Duration>) -> Self {
        Self { sources, timeout }
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|source| source.tag())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Fetch up to `limit` records from each source admitted by `filter`.
    ///
    /// Waits until every source has answered, failed or timed out. Batches
    /// and failures keep the registration order of their sources.
    pub async fn fetch_all<'a>(&'a self, filter: &'a FilterSet, limit: usize) -> FetchReport<'a> {
        let admitted: Vec<&'a dyn ListingSource> = self
            .sources
            .iter()
            .map(|source| source.as_ref())
            .filter(|source| filter.admits_source(source.tag()))
            .collect();

        let outcomes = join_all(
            admitted
                .iter()
                .map(|source| self.fetch_one(*source, filter, limit)),
        )
        .await;

        let mut report = FetchReport {
            attempted: admitted.len(),
            ..FetchReport::default()
        };
        for (source, outcome) in admitted.into_iter().zip(outcomes) {
            match outcome {
                Ok(batch) => report.batches.push(batch),
                Err(e) => report.failures.push((source.tag().to_string(), e)),
            }
        }
        report
    }

    async fn fetch_one<'a>(
        &self,
        source: &'a dyn ListingSource,
        filter: &'a FilterSet,
        limit: usize,
    ) -> Result<SourceBatch<'a>> {
        let queries = try_join(source.fetch(filter, limit), source.count(filter));
        let (records, total) = match self.timeout {
            Some(deadline) => tokio::time::timeout(deadline, queries)
                .await
                .map_err(|_| ClusterError::Timeout {
                    tag: source.tag().to_string(),
                    timeout_ms: deadline.as_millis() as u64,
                })??,
            None => queries.await?,
        };

        log::debug!(
            "Source '{}' returned {} records of {} matching",
            source.tag(),
            records.len(),
            total
        );
        Ok(SourceBatch {
            tag: source.tag(),
            fields: source.field_map(),
            records,
            total,
        })
    }
}

impl std::fmt::Debug for SourceFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFetcher")
            .field("sources", &self.tags().collect::<Vec<_>>())
            .field("timeout", &self.timeout)
            .finish()
    }
}
