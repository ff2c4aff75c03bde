//! Shared fixtures for the synchronization integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use annbridge_core::{
    BridgeResult, EntityBinding, EntityId, EntitySource, IdKind, VectorEntity, VectorFieldSpec,
};
use annbridge_service::{MemoryVectorService, VectorService};
use annbridge_sync::EntrySynchronizer;

/// One relational row with vector attributes, as the tests see it
#[derive(Debug, Clone)]
pub struct TestEntity {
    pub id: EntityId,
    pub vectors: BTreeMap<String, Vec<f32>>,
}

impl TestEntity {
    pub fn int(id: u64, field: &str, vector: Vec<f32>) -> Self {
        TestEntity {
            id: EntityId::Int(id),
            vectors: BTreeMap::from([(field.to_string(), vector)]),
        }
    }

    pub fn uuid(id: Uuid, field: &str, vector: Vec<f32>) -> Self {
        TestEntity {
            id: EntityId::Uuid(id),
            vectors: BTreeMap::from([(field.to_string(), vector)]),
        }
    }
}

impl VectorEntity for TestEntity {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn vector(&self, field: &str) -> Option<&[f32]> {
        self.vectors.get(field).map(|v| v.as_slice())
    }
}

/// Relational-store stand-in: a full scan over a fixed row set
pub struct TestStore(pub Vec<TestEntity>);

impl EntitySource for TestStore {
    type Entity = TestEntity;

    fn scan(&self) -> BridgeResult<Vec<TestEntity>> {
        Ok(self.0.clone())
    }
}

/// A memory service both as its concrete type (for call counters) and as
/// the trait object the components take
pub fn memory_service() -> (Arc<MemoryVectorService>, Arc<dyn VectorService>) {
    let service = Arc::new(MemoryVectorService::new());
    let dyn_service: Arc<dyn VectorService> = service.clone();
    (service, dyn_service)
}

/// Binding for a `product` entity with one 2-dimensional `similarity` field
pub fn product_binding(id_kind: IdKind) -> EntityBinding {
    EntityBinding::new(
        "product",
        "default",
        id_kind,
        vec![VectorFieldSpec::new("similarity", 2)],
    )
    .unwrap()
}

pub fn synchronizer(service: Arc<dyn VectorService>, id_kind: IdKind) -> EntrySynchronizer {
    EntrySynchronizer::new(service, product_binding(id_kind))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
