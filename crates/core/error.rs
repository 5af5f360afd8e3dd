//! Error types for the clustering engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusterError {
    /// Every queried listing source failed; no partial payload is produced.
    #[error("All {attempted} listing sources failed")]
    AllSourcesFailed { attempted: usize },

    #[error("Listing source '{tag}' failed: {message}")]
    Source { tag: String, message: String },

    #[error("Listing source '{tag}' timed out after {timeout_ms} ms")]
    Timeout { tag: String, timeout_ms: u64 },

    #[error("Unknown cluster id {0}")]
    UnknownCluster(u32),

    #[error("Index build failed: {0}")]
    IndexBuild(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ClusterError {
    pub fn source_failure(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            tag: tag.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClusterError>;
