//! The vector-service capability contract
//!
//! Everything the bridge needs from an external ANN service, as an
//! object-safe trait. The service's internal search and indexing
//! algorithms are a black box; this trait only fixes the boundary:
//! collections, indexes, column-major inserts, top-k search, scalar
//! queries, load and flush.
//!
//! All operations are synchronous and blocking. No call here is retried
//! internally; connectivity failures surface as `ServiceUnavailable`.

use annbridge_core::{
    BridgeError, BridgeResult, CollectionSchema, DistanceMetric, IndexKind, IndexParams,
};

/// Values of one column in a column-major insert payload
///
/// The index service takes columns, not rows; the synchronizer transposes
/// entity rows into this form before calling [`VectorService::insert`].
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Signed 64-bit scalars
    Int64(Vec<i64>),
    /// Float vectors, one per row
    FloatVector(Vec<Vec<f32>>),
}

impl ColumnValues {
    /// Number of rows this column carries
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Int64(v) => v.len(),
            ColumnValues::FloatVector(v) => v.len(),
        }
    }

    /// Whether the column carries no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One named column of an insert payload
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Field name this column belongs to
    pub name: String,
    /// Row values, one per inserted row
    pub values: ColumnValues,
}

impl Column {
    /// Scalar column
    pub fn int64(name: impl Into<String>, values: Vec<i64>) -> Self {
        Column {
            name: name.into(),
            values: ColumnValues::Int64(values),
        }
    }

    /// Float-vector column
    pub fn float_vector(name: impl Into<String>, values: Vec<Vec<f32>>) -> Self {
        Column {
            name: name.into(),
            values: ColumnValues::FloatVector(values),
        }
    }
}

/// One result of a similarity search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Synthetic row key of the matched row
    pub key: u64,
    /// Distance to the query vector; lower is nearer
    pub distance: f32,
}

/// Search-time parameters, taken from the field's declaration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    /// Distance metric the field was indexed with
    pub metric: DistanceMetric,
    /// Probe / candidate-list count
    pub nprobe: u32,
}

/// Server-side row filter for scalar queries
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Rows whose synthetic row key is in the given set
    KeyIn(Vec<u64>),
}

/// Black-box capability contract of the external vector service
///
/// Implementations wrap a remote service (one connection per logical
/// database) or an embedded one. The bridge treats every method as a
/// blocking remote call.
pub trait VectorService: Send + Sync {
    /// Whether a collection with this name exists
    fn has_collection(&self, name: &str) -> BridgeResult<bool>;

    /// The live schema of an existing collection
    ///
    /// # Errors
    /// `NotFound` if the collection does not exist.
    fn describe_collection(&self, name: &str) -> BridgeResult<CollectionSchema>;

    /// Create a collection with the given schema
    ///
    /// # Errors
    /// `AlreadyExists` if a same-named collection exists; callers must
    /// drop explicitly first.
    fn create_collection(&self, schema: &CollectionSchema) -> BridgeResult<()>;

    /// Remove a collection and all its rows
    ///
    /// # Errors
    /// `NotFound` if the collection does not exist; dropping is not
    /// idempotent at this layer.
    fn drop_collection(&self, name: &str) -> BridgeResult<()>;

    /// Build the index for one vector field
    fn build_index(
        &self,
        collection: &str,
        field: &str,
        metric: DistanceMetric,
        index: IndexKind,
        params: IndexParams,
    ) -> BridgeResult<()>;

    /// Insert rows in column-major form; returns the row count
    ///
    /// Inserts may be buffered by the service and are not visible to
    /// search until [`VectorService::flush`]. A bulk insert succeeds or
    /// fails as a unit; there is no per-row partial success.
    fn insert(&self, collection: &str, columns: &[Column]) -> BridgeResult<usize>;

    /// Remove rows by synthetic row key; returns the removed count
    fn delete(&self, collection: &str, keys: &[u64]) -> BridgeResult<usize>;

    /// Top-k similarity search over one vector field
    ///
    /// One ordered result set per query vector, nearest first. Requires
    /// the collection to be loaded.
    fn search(
        &self,
        collection: &str,
        field: &str,
        queries: &[Vec<f32>],
        params: &SearchParams,
        k: usize,
    ) -> BridgeResult<Vec<Vec<SearchHit>>>;

    /// Scalar query: filtered rows projected onto scalar output fields
    ///
    /// Returns one `Vec<i64>` per matched row, values aligned with
    /// `output_fields`. Row order is unspecified.
    fn query(
        &self,
        collection: &str,
        filter: &Filter,
        output_fields: &[&str],
    ) -> BridgeResult<Vec<Vec<i64>>>;

    /// Bring a collection into the service's query-ready state
    fn load(&self, collection: &str) -> BridgeResult<()>;

    /// Make buffered inserts visible to search
    fn flush(&self, collections: &[&str]) -> BridgeResult<()>;
}

impl std::fmt::Debug for dyn VectorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn VectorService")
    }
}

/// Convenience: map a low-level connectivity failure into the taxonomy
pub fn unavailable(detail: impl Into<String>) -> BridgeError {
    BridgeError::ServiceUnavailable {
        detail: detail.into(),
    }
}
