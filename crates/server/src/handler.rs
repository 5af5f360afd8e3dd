//! Handler implementation for the cluster RPC service

use crate::error::CLUSTERING_FAILED;
use crate::protocol::ClusterService;
use geocluster::ClusterEngine;
use geocluster_types::filter::RawQuery;
use geocluster_types::response::ClusterResponse;
use std::sync::Arc;
use tarpc::context;
use tracing::error;

#[derive(Clone)]
pub struct Handler {
    engine: Arc<ClusterEngine>,
}

impl Handler {
    pub fn new(engine: Arc<ClusterEngine>) -> Self {
        Self { engine }
    }
}

impl ClusterService for Handler {
    async fn clusters(
        self,
        _: context::Context,
        query: RawQuery,
    ) -> Result<ClusterResponse, String> {
        self.engine.query(&query).await.map_err(|e| {
            error!("Clustering request failed: {}", e);
            CLUSTERING_FAILED.to_string()
        })
    }

    async fn sources(self, _: context::Context) -> Vec<String> {
        self.engine.source_tags()
    }
}
