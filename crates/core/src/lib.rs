//! Core types for annbridge
//!
//! This crate defines the foundational types shared by the service
//! boundary and the synchronization layer:
//! - EntityId / IdKind: relational primary keys, integer or 128-bit
//! - KeyParts: the reversible 2/63/63-bit decomposition of a 128-bit key
//! - VectorFieldSpec: per-attribute vector configuration
//! - CollectionSchema / SchemaBuilder: deterministic schema derivation
//! - EntityBinding: static registration of an entity type's vector fields
//! - IdPredicate: the `id IN (…)` fragment handed to the query compiler
//! - BridgeError: the error taxonomy for every layer

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binding;
pub mod entity;
pub mod error;
pub mod field;
pub mod key;
pub mod predicate;
pub mod schema;

// Re-export commonly used types at the crate root
pub use binding::EntityBinding;
pub use entity::{EntityId, EntitySource, IdKind, VectorEntity};
pub use error::{BridgeError, BridgeResult};
pub use field::{DistanceMetric, ElementType, IndexKind, IndexParams, VectorFieldSpec};
pub use key::{KeyParts, HIGH_BITS, HIGH_MASK, PART_BITS, PART_MASK};
pub use predicate::IdPredicate;
pub use schema::{
    CollectionSchema, FieldDef, FieldType, SchemaBuilder, PK_HIGH_FIELD, PK_LOW_FIELD,
    PK_MID_FIELD, ROW_KEY_FIELD,
};
