//! Vector-service boundary for annbridge
//!
//! This crate owns everything at the edge of the external ANN service:
//! - VectorService: the black-box capability contract
//! - BridgeConfig / DatabaseConfig: per-database connection settings
//! - ConnectionRegistry / ServiceConnector: connect-once, reuse caching
//! - MemoryVectorService: brute-force in-memory implementation for tests
//!   and embedded deployments

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod memory;
pub mod registry;
pub mod traits;

pub use config::{BridgeConfig, DatabaseConfig};
pub use memory::{IndexInfo, MemoryConnector, MemoryVectorService};
pub use registry::{ConnectionRegistry, ServiceConnector};
pub use traits::{
    unavailable, Column, ColumnValues, Filter, SearchHit, SearchParams, VectorService,
};
