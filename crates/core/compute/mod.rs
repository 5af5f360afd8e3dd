//! Request pipeline stages: zoom policy, filter and record normalization,
//! spatial clustering, aggregation and response assembly.

pub mod aggregate;
pub mod assemble;
pub mod filter;
pub mod normalize;
pub mod spatial;
pub mod zoom;

pub use aggregate::ClusterAggregator;
pub use assemble::ResponseAssembler;
pub use filter::FilterNormalizer;
pub use normalize::{FieldMap, RawRecord, RecordNormalizer};
pub use zoom::ZoomPolicy;
