//! Cluster server
//!
//! Serves a [`geocluster::ClusterEngine`] over the network.
//!
//! # Transports
//!
//! - **HTTP** (default feature `http`): `GET /api/listings/clustered`, axum-based
//! - **RPC**: tarpc service with length-delimited JSON framing
//!
//! # Example
//!
//! ```ignore
//! use geocluster_server::run_server;
//!
//! run_server(listener, engine, shutdown).await?;
//! ```

pub mod error;
pub mod handler;
pub mod protocol;
pub mod sources;
pub mod transport;

pub use error::{CLUSTERING_FAILED, ServerError};
pub use protocol::{ClusterService, ClusterServiceClient};
pub use sources::{SourceSpec, load_sources};

pub use transport::rpc::run_server;
