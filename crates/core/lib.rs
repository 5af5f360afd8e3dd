//! Viewport-adaptive spatial clustering for interactive listing maps.
//!
//! Given a viewport, a zoom level and a set of filters, the engine returns
//! either aggregated clusters (at low zoom) or individual listings (at
//! street level), drawn from several upstream listing sources at once.
//!
//! ## Pipeline
//! Each request flows through, in order:
//! - **Zoom policy**: zoom to cluster radius, point budget and mode
//! - **Filter normalization**: raw parameters to a canonical filter, never failing
//! - **Source fan-out**: bounded, parallel fetches; a failing source is dropped, not fatal
//! - **Record normalization**: per-source field names to one point shape
//! - **Spatial cluster index**: hierarchical greedy clustering, built per request
//! - **Aggregation and assembly**: counts, sampled price statistics, totals
//!
//! ```rust
//! use geocluster::{EngineBuilder, MemorySource};
//! use geocluster_types::filter::RawQuery;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> geocluster::Result<()> {
//! let gps = MemorySource::with_records(
//!     "gps",
//!     vec![
//!         json!({ "listingKey": "1", "latitude": 34.05, "longitude": -118.25, "listPrice": 900000, "propertyType": "A" }),
//!         json!({ "listingKey": "2", "latitude": 34.06, "longitude": -118.24, "listPrice": 700000, "propertyType": "A" }),
//!     ],
//! );
//! let engine = EngineBuilder::new().source(Arc::new(gps)).build()?;
//!
//! let response = engine.query(&RawQuery::viewport(35.0, 33.0, -117.0, -119.0, 8.0)).await?;
//! assert!(response.clustered);
//! assert_eq!(response.clusters[0].count, 2);
//! assert_eq!(response.total_count.total, 2);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod engine;
pub mod error;
pub mod source;

pub use builder::EngineBuilder;
pub use engine::ClusterEngine;
pub use error::{ClusterError, Result};

pub use config::{CacheDirective, EngineConfig, TierPolicy, ZoomTier, ZoomTierConfig};
pub use source::{ListingSource, MemorySource};

pub use geocluster_types::bbox::BoundingBox;
pub use geocluster_types::cluster::ClusterSummary;
pub use geocluster_types::filter::{FilterSet, RawQuery};
pub use geocluster_types::point::Point;
pub use geocluster_types::response::{ClusterResponse, TotalCount};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use crate::compute::{FieldMap, RawRecord};
    pub use crate::{
        BoundingBox, ClusterEngine, ClusterError, ClusterResponse, EngineBuilder, EngineConfig,
        ListingSource, MemorySource, Point, RawQuery, Result,
    };
}
