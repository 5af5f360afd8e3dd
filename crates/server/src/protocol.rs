//! Protocol definitions for the cluster RPC service
//!
//! Requests carry the same raw, all-optional parameters as the HTTP query
//! string; responses are the same payload the HTTP transport serializes.

use geocluster_types::filter::RawQuery;
use geocluster_types::response::ClusterResponse;

#[tarpc::service]
pub trait ClusterService {
    /// Clusters or listings for one viewport. The error string is generic;
    /// details stay in the server log.
    async fn clusters(query: RawQuery) -> Result<ClusterResponse, String>;

    /// Tags of the listing sources the server queries.
    async fn sources() -> Vec<String>;
}
