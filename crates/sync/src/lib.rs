//! Synchronization and query translation for annbridge
//!
//! This crate keeps vector-service collections in step with the
//! relational store and turns similarity searches back into relational
//! predicates:
//! - IndexLifecycleManager: create / drop / recreate collections
//! - EntrySynchronizer: row assembly, column-major writes, schema guard,
//!   delete, update, full rebuild
//! - NearestNeighborResolver: top-k search, key decoding, `IN` predicate
//! - Bridge: registry wiring and multi-database fan-out

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod lifecycle;
pub mod resolve;
pub mod sync;

pub use bridge::Bridge;
pub use lifecycle::IndexLifecycleManager;
pub use resolve::{NearestNeighborResolver, NearestNeighbors};
pub use sync::{EntryRow, EntrySynchronizer, SyncOptions};
