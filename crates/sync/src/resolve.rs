//! Nearest-neighbor lookup resolution
//!
//! A lookup walks four stages: load the collection into the service's
//! query-ready state, run the top-k similarity search, fetch the key
//! parts for the returned synthetic keys, and decode them back into
//! entity identifiers. The search ranking (nearest first) is preserved
//! throughout; the scalar query that fetches key parts returns rows in
//! arbitrary order, so rows are re-ranked by synthetic key before
//! decoding.
//!
//! The emitted predicate carries positional order only, no scores. The
//! relational layer may or may not keep that order in its own results;
//! preserving rank end-to-end is a caller concern, as is any retry or
//! timeout policy around the blocking service calls.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use annbridge_core::{
    BridgeError, BridgeResult, EntityBinding, EntityId, IdPredicate, KeyParts,
    PK_HIGH_FIELD, PK_LOW_FIELD, PK_MID_FIELD, ROW_KEY_FIELD,
};
use annbridge_service::{Filter, SearchParams, VectorService};

/// Identifiers matched by one nearest-neighbor lookup, nearest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearestNeighbors {
    ids: Vec<EntityId>,
}

impl NearestNeighbors {
    /// Matched identifiers in rank order
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    /// Consume into the ranked identifier list
    pub fn into_ids(self) -> Vec<EntityId> {
        self.ids
    }

    /// Number of matches
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the search matched nothing
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Fold the matches into an `<column> IN (…)` predicate fragment
    pub fn predicate(&self, column: impl Into<String>) -> IdPredicate {
        IdPredicate::new(column, self.ids.clone())
    }
}

/// Resolves similarity queries into ranked entity identifiers
///
/// A plain value over the service connection, the entity binding and the
/// field being searched; one instance per (entity type, field) pair is
/// cheap and reusable.
pub struct NearestNeighborResolver {
    service: Arc<dyn VectorService>,
    binding: EntityBinding,
    field: String,
}

impl std::fmt::Debug for NearestNeighborResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearestNeighborResolver")
            .field("binding", &self.binding)
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

impl NearestNeighborResolver {
    /// Resolver for one declared vector field
    ///
    /// # Errors
    /// `InvalidArgument` if the binding does not declare the field.
    pub fn new(
        service: Arc<dyn VectorService>,
        binding: EntityBinding,
        field: impl Into<String>,
    ) -> BridgeResult<Self> {
        let field = field.into();
        if binding.spec(&field).is_none() {
            return Err(BridgeError::InvalidArgument {
                detail: format!(
                    "binding for '{}' declares no vector field '{field}'",
                    binding.collection()
                ),
            });
        }
        Ok(NearestNeighborResolver {
            service,
            binding,
            field,
        })
    }

    /// Find the k entities nearest to the query vector
    ///
    /// # Errors
    /// `InvalidArgument` if `k == 0` or the query dimensionality differs
    /// from the field's declaration; `ServiceUnavailable` surfaces
    /// unchanged from the service, with no internal retry.
    pub fn resolve(&self, query: &[f32], k: usize) -> BridgeResult<NearestNeighbors> {
        let spec = self.binding.spec(&self.field).ok_or_else(|| {
            BridgeError::InvalidArgument {
                detail: format!("unknown vector field '{}'", self.field),
            }
        })?;
        if k == 0 {
            return Err(BridgeError::InvalidArgument {
                detail: "nearest-neighbor count must be positive".to_string(),
            });
        }
        if query.len() != spec.dim {
            return Err(BridgeError::InvalidArgument {
                detail: format!(
                    "query vector has dimension {}, field '{}' expects {}",
                    query.len(),
                    self.field,
                    spec.dim
                ),
            });
        }

        let collection = self.binding.collection();
        self.service.load(collection)?;

        let params = SearchParams {
            metric: spec.metric,
            nprobe: spec.params.nprobe,
        };
        let mut result_sets =
            self.service
                .search(collection, &self.field, &[query.to_vec()], &params, k)?;
        let ranked_keys: Vec<u64> = result_sets
            .drain(..)
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|hit| hit.key)
            .collect();
        debug!(
            target: "annbridge::resolve",
            collection,
            field = %self.field,
            k,
            matches = ranked_keys.len(),
            "Similarity search complete"
        );
        if ranked_keys.is_empty() {
            return Ok(NearestNeighbors { ids: Vec::new() });
        }

        let rows = self.service.query(
            collection,
            &Filter::KeyIn(ranked_keys.clone()),
            &[ROW_KEY_FIELD, PK_HIGH_FIELD, PK_MID_FIELD, PK_LOW_FIELD],
        )?;

        // Group decoded ids by synthetic key: the key is not
        // collision-free, so one ranked key may map to several rows.
        let mut by_key: HashMap<u64, Vec<EntityId>> = HashMap::new();
        for row in rows {
            let [key, high, mid, low] = Self::scalar_row(&row)?;
            let parts = KeyParts::new(high, mid, low)?;
            let id = EntityId::from_u128(self.binding.id_kind(), parts.decode())?;
            by_key.entry(key).or_default().push(id);
        }

        // Emit in search-rank order. A key with no row was deleted
        // between search and query; it simply drops out.
        let mut ids = Vec::with_capacity(ranked_keys.len());
        for key in ranked_keys {
            if let Some(decoded) = by_key.remove(&key) {
                ids.extend(decoded);
            }
        }
        Ok(NearestNeighbors { ids })
    }

    fn scalar_row(row: &[i64]) -> BridgeResult<[u64; 4]> {
        if row.len() != 4 {
            return Err(BridgeError::InvalidArgument {
                detail: format!("key-part row has {} values, expected 4", row.len()),
            });
        }
        let mut out = [0u64; 4];
        for (slot, value) in out.iter_mut().zip(row) {
            *slot = u64::try_from(*value).map_err(|_| BridgeError::Encoding {
                detail: format!("negative key part {value} in vector-service row"),
            })?;
        }
        Ok(out)
    }
}
