//! Static registration of an entity type's vector fields
//!
//! Instead of reflecting over entity attributes at runtime, each entity
//! type registers an [`EntityBinding`] once at setup time: its collection
//! name, the logical database it lives in, the kind of primary key it
//! uses, and the ordered list of vector field declarations. Everything
//! downstream (lifecycle, synchronization, lookup) works off the binding.

use crate::entity::IdKind;
use crate::error::BridgeResult;
use crate::field::VectorFieldSpec;
use crate::schema::{CollectionSchema, SchemaBuilder};

/// The declared vector-index surface of one entity type
///
/// Immutable after construction; the derived schema is computed once and
/// reused for every schema check and write.
#[derive(Debug, Clone)]
pub struct EntityBinding {
    collection: String,
    database: String,
    id_kind: IdKind,
    specs: Vec<VectorFieldSpec>,
    schema: CollectionSchema,
}

impl EntityBinding {
    /// Register an entity type's vector fields
    ///
    /// Specs are sorted by name so the binding is independent of
    /// declaration order.
    ///
    /// # Errors
    /// `Configuration` for duplicate names, reserved names, or invalid
    /// dimensions (see [`SchemaBuilder::build`]).
    pub fn new(
        collection: impl Into<String>,
        database: impl Into<String>,
        id_kind: IdKind,
        specs: Vec<VectorFieldSpec>,
    ) -> BridgeResult<Self> {
        let collection = collection.into();
        let schema = SchemaBuilder::build(&collection, &specs)?;
        let mut specs = specs;
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(EntityBinding {
            collection,
            database: database.into(),
            id_kind,
            specs,
            schema,
        })
    }

    /// Collection name in the vector service
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Logical database this entity type's collection lives in
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Declared primary-key kind
    pub fn id_kind(&self) -> IdKind {
        self.id_kind
    }

    /// Vector field declarations, sorted by name
    pub fn specs(&self) -> &[VectorFieldSpec] {
        &self.specs
    }

    /// The derived collection schema
    pub fn schema(&self) -> &CollectionSchema {
        &self.schema
    }

    /// Field names the live collection is expected to carry, in order
    pub fn expected_field_names(&self) -> Vec<String> {
        self.schema.field_names()
    }

    /// Look up one field's declaration by name
    pub fn spec(&self, field: &str) -> Option<&VectorFieldSpec> {
        self.specs.iter().find(|s| s.name == field)
    }
}
