//! In-memory vector service
//!
//! A brute-force O(n) implementation of the capability contract, used by
//! tests and embedded deployments. It deliberately models the two
//! behaviors of a real service that callers must handle:
//!
//! - inserts are buffered and invisible to search/query until `flush`
//! - search and query require the collection to be loaded first
//!
//! Search results are ordered by ascending distance with key as the
//! tie-break, so identical datasets always rank identically.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use annbridge_core::{
    BridgeError, BridgeResult, CollectionSchema, DistanceMetric, FieldType, IndexKind,
    IndexParams, ROW_KEY_FIELD,
};

use crate::config::DatabaseConfig;
use crate::registry::ServiceConnector;
use crate::traits::{Column, ColumnValues, Filter, SearchHit, SearchParams, VectorService};

#[derive(Debug, Clone)]
struct MemRow {
    key: u64,
    scalars: BTreeMap<String, i64>,
    vectors: BTreeMap<String, Vec<f32>>,
}

/// Index declaration recorded for one vector field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexInfo {
    /// Metric the index was built with
    pub metric: DistanceMetric,
    /// Algorithm family
    pub index: IndexKind,
    /// Tuning parameters
    pub params: IndexParams,
}

struct MemCollection {
    schema: CollectionSchema,
    rows: Vec<MemRow>,
    /// Rows below this offset are flushed and visible to search/query
    visible: usize,
    loaded: bool,
    indexes: BTreeMap<String, IndexInfo>,
}

impl MemCollection {
    fn new(schema: CollectionSchema) -> Self {
        MemCollection {
            schema,
            rows: Vec::new(),
            visible: 0,
            loaded: false,
            indexes: BTreeMap::new(),
        }
    }

    fn require_loaded(&self) -> BridgeResult<()> {
        if !self.loaded {
            return Err(BridgeError::InvalidArgument {
                detail: format!("collection '{}' is not loaded", self.schema.name),
            });
        }
        Ok(())
    }

    fn vector_dim(&self, field: &str) -> BridgeResult<usize> {
        match self.schema.fields.iter().find(|f| f.name == field) {
            Some(f) => match f.ty {
                FieldType::FloatVector { dim } => Ok(dim),
                FieldType::Int64 => Err(BridgeError::InvalidArgument {
                    detail: format!("field '{field}' is not a vector field"),
                }),
            },
            None => Err(BridgeError::InvalidArgument {
                detail: format!(
                    "collection '{}' has no field '{field}'",
                    self.schema.name
                ),
            }),
        }
    }
}

/// Brute-force in-memory implementation of [`VectorService`]
///
/// Thread-safe; one instance backs one logical database. Tracks the
/// number of insert calls it has received so tests can assert that
/// aborted or empty writes never reach the service.
#[derive(Default)]
pub struct MemoryVectorService {
    collections: RwLock<BTreeMap<String, MemCollection>>,
    insert_calls: AtomicUsize,
}

impl MemoryVectorService {
    /// Fresh service with no collections
    pub fn new() -> Self {
        MemoryVectorService::default()
    }

    /// Number of insert calls received so far
    pub fn insert_call_count(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// The index declaration recorded for one vector field, if any
    pub fn index_info(&self, collection: &str, field: &str) -> Option<IndexInfo> {
        self.collections
            .read()
            .get(collection)
            .and_then(|col| col.indexes.get(field).copied())
    }

    fn not_found(name: &str) -> BridgeError {
        BridgeError::NotFound {
            name: name.to_string(),
        }
    }
}

impl VectorService for MemoryVectorService {
    fn has_collection(&self, name: &str) -> BridgeResult<bool> {
        Ok(self.collections.read().contains_key(name))
    }

    fn describe_collection(&self, name: &str) -> BridgeResult<CollectionSchema> {
        let collections = self.collections.read();
        let col = collections.get(name).ok_or_else(|| Self::not_found(name))?;
        Ok(col.schema.clone())
    }

    fn create_collection(&self, schema: &CollectionSchema) -> BridgeResult<()> {
        let mut collections = self.collections.write();
        if collections.contains_key(&schema.name) {
            return Err(BridgeError::AlreadyExists {
                name: schema.name.clone(),
            });
        }
        collections.insert(schema.name.clone(), MemCollection::new(schema.clone()));
        Ok(())
    }

    fn drop_collection(&self, name: &str) -> BridgeResult<()> {
        let mut collections = self.collections.write();
        collections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(name))
    }

    fn build_index(
        &self,
        collection: &str,
        field: &str,
        metric: DistanceMetric,
        index: IndexKind,
        params: IndexParams,
    ) -> BridgeResult<()> {
        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        col.vector_dim(field)?;
        col.indexes.insert(
            field.to_string(),
            IndexInfo {
                metric,
                index,
                params,
            },
        );
        Ok(())
    }

    fn insert(&self, collection: &str, columns: &[Column]) -> BridgeResult<usize> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        // One column per schema field, in schema order, equal lengths.
        if columns.len() != col.schema.fields.len() {
            return Err(BridgeError::InvalidArgument {
                detail: format!(
                    "insert into '{collection}' carries {} columns, schema has {} fields",
                    columns.len(),
                    col.schema.fields.len()
                ),
            });
        }
        let row_count = columns[0].values.len();
        let mut rows: Vec<MemRow> = (0..row_count)
            .map(|_| MemRow {
                key: 0,
                scalars: BTreeMap::new(),
                vectors: BTreeMap::new(),
            })
            .collect();

        for (field, column) in col.schema.fields.iter().zip(columns) {
            if field.name != column.name {
                return Err(BridgeError::InvalidArgument {
                    detail: format!(
                        "insert column '{}' does not match schema field '{}'",
                        column.name, field.name
                    ),
                });
            }
            if column.values.len() != row_count {
                return Err(BridgeError::InvalidArgument {
                    detail: format!("insert column '{}' has a mismatched row count", column.name),
                });
            }
            match (&field.ty, &column.values) {
                (FieldType::Int64, ColumnValues::Int64(values)) => {
                    for (row, value) in rows.iter_mut().zip(values) {
                        if field.name == ROW_KEY_FIELD {
                            row.key = u64::try_from(*value).map_err(|_| {
                                BridgeError::InvalidArgument {
                                    detail: format!("negative row key {value}"),
                                }
                            })?;
                        }
                        row.scalars.insert(field.name.clone(), *value);
                    }
                }
                (FieldType::FloatVector { dim }, ColumnValues::FloatVector(values)) => {
                    for (row, value) in rows.iter_mut().zip(values) {
                        if value.len() != *dim {
                            return Err(BridgeError::InvalidArgument {
                                detail: format!(
                                    "vector for field '{}' has dimension {}, expected {}",
                                    field.name,
                                    value.len(),
                                    dim
                                ),
                            });
                        }
                        row.vectors.insert(field.name.clone(), value.clone());
                    }
                }
                _ => {
                    return Err(BridgeError::InvalidArgument {
                        detail: format!("insert column '{}' has the wrong value type", column.name),
                    });
                }
            }
        }

        col.rows.extend(rows);
        Ok(row_count)
    }

    fn delete(&self, collection: &str, keys: &[u64]) -> BridgeResult<usize> {
        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        let doomed: HashSet<u64> = keys.iter().copied().collect();
        let mut removed = 0usize;
        let mut removed_visible = 0usize;
        let visible = col.visible;
        let mut kept = Vec::with_capacity(col.rows.len());
        for (i, row) in col.rows.drain(..).enumerate() {
            if doomed.contains(&row.key) {
                removed += 1;
                if i < visible {
                    removed_visible += 1;
                }
            } else {
                kept.push(row);
            }
        }
        col.rows = kept;
        col.visible -= removed_visible;
        Ok(removed)
    }

    fn search(
        &self,
        collection: &str,
        field: &str,
        queries: &[Vec<f32>],
        params: &SearchParams,
        k: usize,
    ) -> BridgeResult<Vec<Vec<SearchHit>>> {
        let collections = self.collections.read();
        let col = collections
            .get(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        col.require_loaded()?;
        let dim = col.vector_dim(field)?;

        let mut result_sets = Vec::with_capacity(queries.len());
        for query in queries {
            if query.len() != dim {
                return Err(BridgeError::InvalidArgument {
                    detail: format!(
                        "query vector has dimension {}, field '{field}' expects {dim}",
                        query.len()
                    ),
                });
            }
            let mut hits: Vec<SearchHit> = col.rows[..col.visible]
                .iter()
                .filter_map(|row| {
                    row.vectors.get(field).map(|v| SearchHit {
                        key: row.key,
                        distance: distance(query, v, params.metric),
                    })
                })
                .collect();
            // Ascending distance, key tie-break, so ranking is deterministic.
            hits.sort_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.key.cmp(&b.key))
            });
            hits.truncate(k);
            result_sets.push(hits);
        }
        Ok(result_sets)
    }

    fn query(
        &self,
        collection: &str,
        filter: &Filter,
        output_fields: &[&str],
    ) -> BridgeResult<Vec<Vec<i64>>> {
        let collections = self.collections.read();
        let col = collections
            .get(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        col.require_loaded()?;

        for field in output_fields {
            let def = col
                .schema
                .fields
                .iter()
                .find(|f| f.name == *field)
                .ok_or_else(|| BridgeError::InvalidArgument {
                    detail: format!("collection '{collection}' has no field '{field}'"),
                })?;
            if def.ty != FieldType::Int64 {
                return Err(BridgeError::InvalidArgument {
                    detail: format!("output field '{field}' is not a scalar field"),
                });
            }
        }

        let Filter::KeyIn(keys) = filter;
        let wanted: HashSet<u64> = keys.iter().copied().collect();

        // Rows come back in key order, not filter order; callers that need
        // a particular order must impose it themselves.
        let mut matched: Vec<&MemRow> = col.rows[..col.visible]
            .iter()
            .filter(|row| wanted.contains(&row.key))
            .collect();
        matched.sort_by_key(|row| row.key);

        Ok(matched
            .into_iter()
            .map(|row| {
                output_fields
                    .iter()
                    .map(|field| row.scalars.get(*field).copied().unwrap_or(0))
                    .collect()
            })
            .collect())
    }

    fn load(&self, collection: &str) -> BridgeResult<()> {
        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        col.loaded = true;
        Ok(())
    }

    fn flush(&self, collections: &[&str]) -> BridgeResult<()> {
        let mut guard = self.collections.write();
        for name in collections {
            let col = guard.get_mut(*name).ok_or_else(|| Self::not_found(name))?;
            col.visible = col.rows.len();
        }
        Ok(())
    }
}

/// Distance between two vectors; lower is nearer for every metric
fn distance(a: &[f32], b: &[f32], metric: DistanceMetric) -> f32 {
    match metric {
        DistanceMetric::Euclidean => a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f32>()
            .sqrt(),
        // Inner product ranks higher-dot nearer; negate to keep
        // ascending-distance ordering.
        DistanceMetric::InnerProduct => -a.iter().zip(b.iter()).map(|(x, y)| x * y).sum::<f32>(),
    }
}

/// Connector producing one fresh in-memory service per database
pub struct MemoryConnector;

impl ServiceConnector for MemoryConnector {
    fn connect(
        &self,
        _database: &str,
        _config: &DatabaseConfig,
    ) -> BridgeResult<Arc<dyn VectorService>> {
        Ok(Arc::new(MemoryVectorService::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annbridge_core::{SchemaBuilder, VectorFieldSpec};

    fn service_with_collection() -> MemoryVectorService {
        let service = MemoryVectorService::new();
        let schema =
            SchemaBuilder::build("product", &[VectorFieldSpec::new("similarity", 2)]).unwrap();
        service.create_collection(&schema).unwrap();
        service
    }

    fn insert_row(service: &MemoryVectorService, key: i64, parts: [i64; 3], vector: [f32; 2]) {
        service
            .insert(
                "product",
                &[
                    Column::int64(ROW_KEY_FIELD, vec![key]),
                    Column::int64("pk_high", vec![parts[0]]),
                    Column::int64("pk_mid", vec![parts[1]]),
                    Column::int64("pk_low", vec![parts[2]]),
                    Column::float_vector("similarity", vec![vector.to_vec()]),
                ],
            )
            .unwrap();
    }

    fn params() -> SearchParams {
        SearchParams {
            metric: DistanceMetric::Euclidean,
            nprobe: 32,
        }
    }

    #[test]
    fn test_create_twice_fails() {
        let service = service_with_collection();
        let schema =
            SchemaBuilder::build("product", &[VectorFieldSpec::new("similarity", 2)]).unwrap();
        let err = service.create_collection(&schema).unwrap_err();
        assert!(matches!(err, BridgeError::AlreadyExists { .. }));
    }

    #[test]
    fn test_drop_missing_fails() {
        let service = MemoryVectorService::new();
        assert!(service.drop_collection("product").unwrap_err().is_not_found());
    }

    #[test]
    fn test_unflushed_rows_invisible() {
        let service = service_with_collection();
        service.load("product").unwrap();
        insert_row(&service, 1, [0, 0, 1], [1.0, 1.0]);

        let hits = service
            .search("product", "similarity", &[vec![1.0, 1.0]], &params(), 5)
            .unwrap();
        assert!(hits[0].is_empty());

        service.flush(&["product"]).unwrap();
        let hits = service
            .search("product", "similarity", &[vec![1.0, 1.0]], &params(), 5)
            .unwrap();
        assert_eq!(hits[0].len(), 1);
        assert_eq!(hits[0][0].key, 1);
    }

    #[test]
    fn test_search_requires_load() {
        let service = service_with_collection();
        let err = service
            .search("product", "similarity", &[vec![0.0, 0.0]], &params(), 1)
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument { .. }));
    }

    #[test]
    fn test_search_orders_by_distance_with_key_tiebreak() {
        let service = service_with_collection();
        service.load("product").unwrap();
        insert_row(&service, 10, [0, 0, 10], [5.0, 5.0]);
        insert_row(&service, 2, [0, 0, 2], [1.0, 1.0]);
        insert_row(&service, 7, [0, 0, 7], [1.0, 1.0]);
        service.flush(&["product"]).unwrap();

        let hits = service
            .search("product", "similarity", &[vec![1.0, 1.0]], &params(), 3)
            .unwrap();
        let keys: Vec<u64> = hits[0].iter().map(|h| h.key).collect();
        assert_eq!(keys, vec![2, 7, 10]);
    }

    #[test]
    fn test_search_rejects_wrong_dimension() {
        let service = service_with_collection();
        service.load("product").unwrap();
        let err = service
            .search("product", "similarity", &[vec![1.0, 2.0, 3.0]], &params(), 1)
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument { .. }));
    }

    #[test]
    fn test_delete_removes_rows() {
        let service = service_with_collection();
        service.load("product").unwrap();
        insert_row(&service, 1, [0, 0, 1], [0.0, 0.0]);
        insert_row(&service, 2, [0, 0, 2], [9.0, 9.0]);
        service.flush(&["product"]).unwrap();

        assert_eq!(service.delete("product", &[1]).unwrap(), 1);
        let hits = service
            .search("product", "similarity", &[vec![0.0, 0.0]], &params(), 5)
            .unwrap();
        let keys: Vec<u64> = hits[0].iter().map(|h| h.key).collect();
        assert_eq!(keys, vec![2]);
    }

    #[test]
    fn test_query_returns_key_parts() {
        let service = service_with_collection();
        service.load("product").unwrap();
        insert_row(&service, 5, [1, 2, 3], [0.0, 0.0]);
        service.flush(&["product"]).unwrap();

        let rows = service
            .query(
                "product",
                &Filter::KeyIn(vec![5]),
                &["pk_high", "pk_mid", "pk_low"],
            )
            .unwrap();
        assert_eq!(rows, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_query_rejects_vector_output_field() {
        let service = service_with_collection();
        service.load("product").unwrap();
        let err = service
            .query("product", &Filter::KeyIn(vec![1]), &["similarity"])
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument { .. }));
    }

    #[test]
    fn test_insert_call_counter() {
        let service = service_with_collection();
        assert_eq!(service.insert_call_count(), 0);
        insert_row(&service, 1, [0, 0, 1], [0.0, 0.0]);
        assert_eq!(service.insert_call_count(), 1);
    }

    #[test]
    fn test_flush_missing_collection_fails() {
        let service = MemoryVectorService::new();
        assert!(service.flush(&["product"]).unwrap_err().is_not_found());
    }

    #[test]
    fn test_inner_product_ranks_higher_dot_first() {
        let service = service_with_collection();
        service.load("product").unwrap();
        insert_row(&service, 1, [0, 0, 1], [0.1, 0.1]);
        insert_row(&service, 2, [0, 0, 2], [10.0, 10.0]);
        service.flush(&["product"]).unwrap();

        let ip = SearchParams {
            metric: DistanceMetric::InnerProduct,
            nprobe: 32,
        };
        let hits = service
            .search("product", "similarity", &[vec![1.0, 1.0]], &ip, 2)
            .unwrap();
        assert_eq!(hits[0][0].key, 2);
    }
}
