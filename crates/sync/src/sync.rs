//! Entry synchronization between the relational store and the vector service
//!
//! ## Design
//!
//! The relational store owns the data; the vector service holds a derived,
//! rebuildable projection. The synchronizer converts entity rows into
//! column-major insert payloads, guards every write with a live schema
//! check, and drives the one supported consistency-recovery mechanism:
//! full rebuild (recreate, bulk load, flush).
//!
//! Consistency is best-effort. `rebuild` is an unguarded drop/create/load
//! sequence; a concurrent search can observe a missing or partially
//! populated collection, and callers needing stronger guarantees must
//! serialize rebuild against queries themselves.
//!
//! Unlike earlier revisions of this layer, `delete` and `bulk_delete` are
//! real operations that remove rows by synthetic key, so `update` no
//! longer accumulates stale rows.

use std::sync::Arc;

use tracing::{debug, info};

use annbridge_core::{
    BridgeError, BridgeResult, EntityBinding, EntitySource, KeyParts, VectorEntity,
    PK_HIGH_FIELD, PK_LOW_FIELD, PK_MID_FIELD, ROW_KEY_FIELD,
};
use annbridge_service::{Column, VectorService};

use crate::lifecycle::IndexLifecycleManager;

/// Tuning knobs for bulk writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Rows per insert call during bulk operations
    pub batch_size: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions { batch_size: 1024 }
    }
}

/// One entity row in vector-service form: key parts plus vector values
///
/// Transient; produced at write time and handed straight to the service.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRow {
    /// Synthetic row key
    pub key: u64,
    /// Identifier decomposition
    pub parts: KeyParts,
    /// Vector values, one per declared field in binding order
    pub vectors: Vec<Vec<f32>>,
}

/// Keeps one entity type's vector-service rows in step with the store
pub struct EntrySynchronizer {
    service: Arc<dyn VectorService>,
    binding: EntityBinding,
    options: SyncOptions,
}

impl EntrySynchronizer {
    /// Synchronizer with default options
    pub fn new(service: Arc<dyn VectorService>, binding: EntityBinding) -> Self {
        EntrySynchronizer {
            service,
            binding,
            options: SyncOptions::default(),
        }
    }

    /// Override the bulk-write options
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// The binding this synchronizer writes for
    pub fn binding(&self) -> &EntityBinding {
        &self.binding
    }

    /// Assemble the vector-service row for one entity
    ///
    /// Reads the declared vector attributes in schema field order and
    /// derives the key parts and synthetic key.
    ///
    /// # Errors
    /// `InvalidArgument` if the entity's key kind disagrees with the
    /// binding, a declared vector is missing, or a vector has the wrong
    /// dimensionality.
    pub fn row_for<E: VectorEntity>(&self, entity: &E) -> BridgeResult<EntryRow> {
        let id = entity.entity_id();
        if id.kind() != self.binding.id_kind() {
            return Err(BridgeError::InvalidArgument {
                detail: format!(
                    "entity id {id} does not match the binding's declared key kind"
                ),
            });
        }
        let parts = KeyParts::encode(id.as_u128())?;

        let mut vectors = Vec::with_capacity(self.binding.specs().len());
        for spec in self.binding.specs() {
            let value = entity.vector(&spec.name).ok_or_else(|| {
                BridgeError::InvalidArgument {
                    detail: format!("entity {id} carries no value for vector field '{}'", spec.name),
                }
            })?;
            if value.len() != spec.dim {
                return Err(BridgeError::InvalidArgument {
                    detail: format!(
                        "vector field '{}' of entity {id} has dimension {}, declared {}",
                        spec.name,
                        value.len(),
                        spec.dim
                    ),
                });
            }
            vectors.push(value.to_vec());
        }

        Ok(EntryRow {
            key: parts.synthetic_key(),
            parts,
            vectors,
        })
    }

    /// Write one entity's row
    pub fn insert<E: VectorEntity>(&self, entity: &E) -> BridgeResult<()> {
        self.bulk_insert(std::slice::from_ref(entity))?;
        Ok(())
    }

    /// Write many entities in column-major batches; returns the row count
    ///
    /// An empty batch is a no-op: zero calls reach the vector service. A
    /// non-empty batch is schema-checked first and then inserted in
    /// chunks of [`SyncOptions::batch_size`]; each chunk succeeds or
    /// fails as a unit.
    pub fn bulk_insert<E: VectorEntity>(&self, entities: &[E]) -> BridgeResult<usize> {
        if entities.is_empty() {
            return Ok(0);
        }
        self.check_schema()?;

        let rows: Vec<EntryRow> = entities
            .iter()
            .map(|e| self.row_for(e))
            .collect::<BridgeResult<_>>()?;

        let mut inserted = 0;
        for chunk in rows.chunks(self.options.batch_size.max(1)) {
            inserted += self
                .service
                .insert(self.binding.collection(), &self.columns(chunk))?;
        }
        debug!(
            target: "annbridge::sync",
            collection = self.binding.collection(),
            rows = inserted,
            "Bulk insert"
        );
        Ok(inserted)
    }

    /// Remove one entity's row from the vector service
    ///
    /// The original layer this replaces left deletion unimplemented and
    /// let updates append stale rows; here removal is first-class, by
    /// synthetic key.
    pub fn delete<E: VectorEntity>(&self, entity: &E) -> BridgeResult<usize> {
        self.bulk_delete(std::slice::from_ref(entity))
    }

    /// Remove many entities' rows; returns the removed count
    pub fn bulk_delete<E: VectorEntity>(&self, entities: &[E]) -> BridgeResult<usize> {
        if entities.is_empty() {
            return Ok(0);
        }
        self.check_schema()?;
        let keys: Vec<u64> = entities
            .iter()
            .map(|e| {
                KeyParts::encode(e.entity_id().as_u128()).map(|parts| parts.synthetic_key())
            })
            .collect::<BridgeResult<_>>()?;
        self.service.delete(self.binding.collection(), &keys)
    }

    /// Replace one entity's row: delete by key, then insert
    pub fn update<E: VectorEntity>(&self, entity: &E) -> BridgeResult<()> {
        self.check_schema()?;
        let row = self.row_for(entity)?;
        self.service.delete(self.binding.collection(), &[row.key])?;
        self.service
            .insert(self.binding.collection(), &self.columns(std::slice::from_ref(&row)))?;
        Ok(())
    }

    /// Recreate the collection and repopulate it from the store
    ///
    /// Drop-if-exists, create, bulk insert of every row the source scans,
    /// then flush so the data is searchable. Returns the row count.
    pub fn rebuild<S: EntitySource>(&self, source: &S) -> BridgeResult<usize> {
        let lifecycle = IndexLifecycleManager::new(Arc::clone(&self.service));
        lifecycle.recreate(&self.binding)?;

        let entities = source.scan()?;
        let inserted = self.bulk_insert(&entities)?;
        self.flush()?;
        info!(
            target: "annbridge::sync",
            collection = self.binding.collection(),
            rows = inserted,
            "Rebuild complete"
        );
        Ok(inserted)
    }

    /// Make recent inserts visible to search
    ///
    /// The service may buffer inserts; call this after bulk writes and
    /// before any nearest-neighbor query that depends on them.
    pub fn flush(&self) -> BridgeResult<()> {
        self.service.flush(&[self.binding.collection()])
    }

    /// Compare the declared field names against the live collection
    ///
    /// # Errors
    /// `SchemaMismatch` on any difference; the pending write is aborted,
    /// never auto-migrated.
    pub fn check_schema(&self) -> BridgeResult<()> {
        let live = self.service.describe_collection(self.binding.collection())?;
        let expected = self.binding.expected_field_names();
        let actual = live.field_names();
        if expected != actual {
            return Err(BridgeError::SchemaMismatch {
                collection: self.binding.collection().to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Transpose rows into the column-major form the service requires
    fn columns(&self, rows: &[EntryRow]) -> Vec<Column> {
        let mut columns = vec![
            Column::int64(
                ROW_KEY_FIELD,
                rows.iter().map(|r| r.key as i64).collect(),
            ),
            Column::int64(
                PK_HIGH_FIELD,
                rows.iter().map(|r| r.parts.high as i64).collect(),
            ),
            Column::int64(
                PK_MID_FIELD,
                rows.iter().map(|r| r.parts.mid as i64).collect(),
            ),
            Column::int64(
                PK_LOW_FIELD,
                rows.iter().map(|r| r.parts.low as i64).collect(),
            ),
        ];
        for (i, spec) in self.binding.specs().iter().enumerate() {
            columns.push(Column::float_vector(
                spec.name.clone(),
                rows.iter().map(|r| r.vectors[i].clone()).collect(),
            ));
        }
        columns
    }
}
