//! annbridge - keeps per-entity vectors in an external ANN service in
//! sync with a relational entity store
//!
//! A relational store owns entities whose primary key is an integer or a
//! 128-bit UUID; the vector service only stores signed 64-bit scalars and
//! float vectors. annbridge encodes each key into three scalar fields
//! (losslessly), synchronizes rows into the service, and translates
//! nearest-neighbor searches back into `id IN (…)` predicates for the
//! relational query compiler.
//!
//! # Quick Start
//!
//! ```ignore
//! use annbridge::{
//!     Bridge, BridgeConfig, ConnectionRegistry, EntityBinding, IdKind,
//!     MemoryConnector, VectorFieldSpec,
//! };
//!
//! let config = BridgeConfig::new().with_database("default", "localhost", 19530);
//! let registry = ConnectionRegistry::new(config, Box::new(MemoryConnector));
//! let bridge = Bridge::new(registry);
//!
//! let binding = EntityBinding::new(
//!     "product",
//!     "default",
//!     IdKind::Int,
//!     vec![VectorFieldSpec::new("similarity", 2)],
//! )?;
//!
//! // Populate the collection from the store, then search.
//! bridge.rebuild_all(&[binding.clone()], &store)?;
//! let nearest = bridge.resolver(&binding, "similarity")?.resolve(&[0.0, 0.0], 5)?;
//! let predicate = nearest.predicate("id"); // "id IN (…)", nearest first
//! ```
//!
//! # Architecture
//!
//! The relational store is the source of truth; the vector service holds
//! a derived, rebuildable projection. Consistency between the two is
//! best-effort and converges via explicit rebuild.

// Re-export the public API from the member crates
pub use annbridge_core::*;
pub use annbridge_service::*;
pub use annbridge_sync::*;
