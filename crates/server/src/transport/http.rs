//! HTTP/JSON transport for the cluster server
//!
//! Endpoints:
//! - `GET /api/listings/clustered` - clusters or listings for a viewport
//! - `GET /health` - liveness check

use crate::error::ServerError;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use geocluster::ClusterEngine;
use geocluster_types::filter::RawQuery;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// Path of the clustered listings endpoint.
pub const CLUSTERED_PATH: &str = "/api/listings/clustered";

/// Build the router over a shared engine.
pub fn router(engine: Arc<ClusterEngine>) -> Router {
    Router::new()
        .route(CLUSTERED_PATH, get(clustered_handler))
        .route("/health", get(health_handler))
        .with_state(engine)
}

/// Serve HTTP until `shutdown` resolves.
pub async fn run_server(
    listener: tokio::net::TcpListener,
    engine: Arc<ClusterEngine>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!("Cluster HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Parameters arrive as raw pairs so that repeated or unknown names never
/// reject the request.
async fn clustered_handler(
    State(engine): State<Arc<ClusterEngine>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ServerError> {
    let query: RawQuery = pairs.into_iter().collect();
    let response = engine.query(&query).await?;

    let cache_control = HeaderValue::from_str(&response.cache.header_value())
        .unwrap_or_else(|_| HeaderValue::from_static("no-store"));
    Ok(([(header::CACHE_CONTROL, cache_control)], Json(response)).into_response())
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
