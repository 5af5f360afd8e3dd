//! Error types for the server transports.

use geocluster::ClusterError;
use thiserror::Error;

/// Message returned to clients for any failed clustering request.
pub const CLUSTERING_FAILED: &str = "Clustering failed";

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Clustering failed: {0}")]
    Cluster(#[from] ClusterError),

    #[error("Invalid source spec '{0}', expected tag=path")]
    SourceSpec(String),
}

#[cfg(feature = "http")]
impl axum::response::IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        tracing::error!("{}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(serde_json::json!({ "error": CLUSTERING_FAILED })),
        )
            .into_response()
    }
}
