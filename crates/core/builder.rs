//! Engine builder
//!
//! Assembles configuration and listing sources into a [`ClusterEngine`].

use crate::config::EngineConfig;
use crate::engine::ClusterEngine;
use crate::error::{ClusterError, Result};
use crate::source::{ListingSource, SourceFetcher};
use std::sync::Arc;

/// Key of the combined entry in per-source totals; no source may use it.
const RESERVED_TAG: &str = "total";

/// Builder for a [`ClusterEngine`].
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    sources: Vec<Arc<dyn ListingSource>>,
}

impl EngineBuilder {
    /// Create a builder with default configuration and no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a listing source. Sources are queried in registration order.
    pub fn source(mut self, source: Arc<dyn ListingSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn sources<I>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ListingSource>>,
    {
        self.sources.extend(sources);
        self
    }

    /// Validate the configuration and source tags and build the engine.
    pub fn build(self) -> Result<ClusterEngine> {
        self.config.validate().map_err(ClusterError::InvalidConfig)?;

        let mut seen: Vec<&str> = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let tag = source.tag();
            if tag.trim().is_empty() {
                return Err(ClusterError::InvalidConfig(
                    "Source tags must not be empty".to_string(),
                ));
            }
            if tag.eq_ignore_ascii_case(RESERVED_TAG) {
                return Err(ClusterError::InvalidConfig(format!(
                    "Source tag '{}' is reserved",
                    tag
                )));
            }
            if seen.iter().any(|other| other.eq_ignore_ascii_case(tag)) {
                return Err(ClusterError::InvalidConfig(format!(
                    "Duplicate source tag '{}'",
                    tag
                )));
            }
            seen.push(tag);
        }
        if self.sources.is_empty() {
            log::warn!("Building a cluster engine with no listing sources");
        }

        let fetcher = SourceFetcher::new(self.sources, self.config.fetch_timeout());
        Ok(ClusterEngine::new(self.config, fetcher))
    }
}
