//! End-to-end flows: rebuild, search, decode, predicate emission
//!
//! These tests run the full path against the in-memory service: entity
//! rows go in through the synchronizer, similarity queries come back out
//! through the resolver as ranked identifiers and `IN` predicates.

mod common;

use std::sync::Arc;

use uuid::Uuid;

use annbridge_core::{EntityId, IdKind};
use annbridge_sync::NearestNeighborResolver;

use common::{init_tracing, memory_service, product_binding, synchronizer, TestEntity, TestStore};

fn resolver(service: Arc<dyn annbridge_service::VectorService>, id_kind: IdKind) -> NearestNeighborResolver {
    NearestNeighborResolver::new(service, product_binding(id_kind), "similarity").unwrap()
}

#[test]
fn test_rebuild_convergence() {
    init_tracing();
    let (_raw, service) = memory_service();
    let sync = synchronizer(service.clone(), IdKind::Int);

    let store = TestStore(vec![
        TestEntity::int(1, "similarity", vec![0.0, 0.0]),
        TestEntity::int(2, "similarity", vec![12.34, 56.78]),
    ]);
    assert_eq!(sync.rebuild(&store).unwrap(), 2);

    let resolver = resolver(service, IdKind::Int);
    let nearest = resolver.resolve(&[-1.0, -1.0], 1).unwrap();
    assert_eq!(nearest.ids(), &[EntityId::Int(1)]);

    let nearest = resolver.resolve(&[99.0, 99.0], 1).unwrap();
    assert_eq!(nearest.ids(), &[EntityId::Int(2)]);
}

#[test]
fn test_rebuild_twice_drops_stale_rows() {
    let (_raw, service) = memory_service();
    let sync = synchronizer(service.clone(), IdKind::Int);

    sync.rebuild(&TestStore(vec![
        TestEntity::int(1, "similarity", vec![0.0, 0.0]),
        TestEntity::int(2, "similarity", vec![5.0, 5.0]),
    ]))
    .unwrap();

    // Entity 2 disappeared from the store; a rebuild must not keep it.
    sync.rebuild(&TestStore(vec![TestEntity::int(
        1,
        "similarity",
        vec![0.0, 0.0],
    )]))
    .unwrap();

    let nearest = resolver(service, IdKind::Int).resolve(&[5.0, 5.0], 10).unwrap();
    assert_eq!(nearest.ids(), &[EntityId::Int(1)]);
}

#[test]
fn test_uuid_identity_preserved_bit_for_bit() {
    let (_raw, service) = memory_service();
    let sync = synchronizer(service.clone(), IdKind::Uuid);

    let id = Uuid::new_v4();
    sync.rebuild(&TestStore(vec![TestEntity::uuid(
        id,
        "similarity",
        vec![12.34, 56.78],
    )]))
    .unwrap();

    let nearest = resolver(service, IdKind::Uuid).resolve(&[99.0, 99.0], 1).unwrap();
    assert_eq!(nearest.ids(), &[EntityId::Uuid(id)]);
}

#[test]
fn test_extreme_128_bit_identifiers_survive_the_full_path() {
    let (_raw, service) = memory_service();
    let sync = synchronizer(service.clone(), IdKind::Uuid);

    let ids = [Uuid::from_u128(0), Uuid::from_u128(u128::MAX), Uuid::from_u128(1 << 126)];
    let store = TestStore(
        ids.iter()
            .enumerate()
            .map(|(i, id)| TestEntity::uuid(*id, "similarity", vec![i as f32 * 10.0, 0.0]))
            .collect(),
    );
    sync.rebuild(&store).unwrap();

    let resolver = resolver(service, IdKind::Uuid);
    for (i, id) in ids.iter().enumerate() {
        let nearest = resolver.resolve(&[i as f32 * 10.0, 0.0], 1).unwrap();
        assert_eq!(nearest.ids(), &[EntityId::Uuid(*id)]);
    }
}

#[test]
fn test_order_preserved_nearest_first() {
    let (_raw, service) = memory_service();
    let sync = synchronizer(service.clone(), IdKind::Int);

    // Known distances from the origin: 1.0, 3.0, 10.0.
    sync.rebuild(&TestStore(vec![
        TestEntity::int(30, "similarity", vec![10.0, 0.0]),
        TestEntity::int(10, "similarity", vec![1.0, 0.0]),
        TestEntity::int(20, "similarity", vec![3.0, 0.0]),
    ]))
    .unwrap();

    let nearest = resolver(service, IdKind::Int).resolve(&[0.0, 0.0], 3).unwrap();
    assert_eq!(
        nearest.ids(),
        &[EntityId::Int(10), EntityId::Int(20), EntityId::Int(30)]
    );
}

#[test]
fn test_predicate_fragment_in_rank_order() {
    let (_raw, service) = memory_service();
    let sync = synchronizer(service.clone(), IdKind::Int);

    sync.rebuild(&TestStore(vec![
        TestEntity::int(7, "similarity", vec![2.0, 0.0]),
        TestEntity::int(3, "similarity", vec![1.0, 0.0]),
    ]))
    .unwrap();

    let nearest = resolver(service, IdKind::Int).resolve(&[0.0, 0.0], 2).unwrap();
    let predicate = nearest.predicate("id");
    assert_eq!(predicate.to_sql(), "id IN (3, 7)");
}

#[test]
fn test_k_larger_than_collection_returns_everything() {
    let (_raw, service) = memory_service();
    let sync = synchronizer(service.clone(), IdKind::Int);

    sync.rebuild(&TestStore(vec![
        TestEntity::int(1, "similarity", vec![0.0, 0.0]),
        TestEntity::int(2, "similarity", vec![1.0, 1.0]),
    ]))
    .unwrap();

    let nearest = resolver(service, IdKind::Int).resolve(&[0.0, 0.0], 50).unwrap();
    assert_eq!(nearest.len(), 2);
}

#[test]
fn test_insert_without_flush_is_not_searchable() {
    let (_raw, service) = memory_service();
    let sync = synchronizer(service.clone(), IdKind::Int);

    sync.rebuild(&TestStore(vec![TestEntity::int(
        1,
        "similarity",
        vec![0.0, 0.0],
    )]))
    .unwrap();

    // A plain insert is buffered by the service until the next flush.
    sync.insert(&TestEntity::int(2, "similarity", vec![8.0, 8.0]))
        .unwrap();
    let resolver = resolver(service, IdKind::Int);
    let nearest = resolver.resolve(&[8.0, 8.0], 1).unwrap();
    assert_eq!(nearest.ids(), &[EntityId::Int(1)]);

    sync.flush().unwrap();
    let nearest = resolver.resolve(&[8.0, 8.0], 1).unwrap();
    assert_eq!(nearest.ids(), &[EntityId::Int(2)]);
}
