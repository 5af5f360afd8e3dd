//! Spatial projection and the per-request cluster index.

pub mod index;
pub mod projection;

pub use index::{ClusterNode, IndexEntry, IndexOptions, NodeId, SpatialClusterIndex};
