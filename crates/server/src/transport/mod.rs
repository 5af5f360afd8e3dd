//! Transport layer for the cluster server
//!
//! Available transports:
//! - `rpc` - tarpc-based RPC
//! - `http` - HTTP/JSON API (requires `http` feature, on by default)

pub mod rpc;

#[cfg(feature = "http")]
pub mod http;
