//! # geocluster-types
//!
//! Value types shared by the geocluster engine and its transports.
//!
//! - **Geometry**: [`bbox::BoundingBox`]
//! - **Listings**: [`point::Point`], the canonical listing shape
//! - **Requests**: [`filter::RawQuery`], [`filter::FilterSet`]
//! - **Results**: [`cluster::ClusterSummary`], [`response::ClusterResponse`]
//! - **Configuration**: [`config::ZoomTierConfig`], [`config::CacheDirective`]
//!
//! All types are serializable with Serde.
//!
//! ## Examples
//!
//! ```rust
//! use geocluster_types::bbox::BoundingBox;
//! use geocluster_types::point::Point;
//!
//! let downtown = BoundingBox::new(34.06, 34.04, -118.23, -118.26);
//! let listing = Point::new("gps:1", "gps", 34.05, -118.24);
//! assert!(downtown.contains(listing.lat, listing.lng));
//! ```

pub mod bbox;
pub mod cluster;
pub mod config;
pub mod filter;
pub mod point;
pub mod response;
pub mod stats;
