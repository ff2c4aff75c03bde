//! Collection lifecycle: create, drop, recreate
//!
//! There is no incremental schema migration. A collection is created from
//! a binding's derived schema with one index per vector field; any schema
//! change goes through `recreate`, which drops whatever exists and builds
//! fresh. Dropping is not idempotent at the service layer, so `recreate`
//! is the only place a missing collection is tolerated.

use std::sync::Arc;

use tracing::info;

use annbridge_core::{BridgeError, BridgeResult, EntityBinding};
use annbridge_service::VectorService;

/// Creates, drops and recreates collections for entity bindings
pub struct IndexLifecycleManager {
    service: Arc<dyn VectorService>,
}

impl IndexLifecycleManager {
    /// Manager over one vector-service connection
    pub fn new(service: Arc<dyn VectorService>) -> Self {
        IndexLifecycleManager { service }
    }

    /// Create the binding's collection and build one index per vector field
    ///
    /// # Errors
    /// `AlreadyExists` if a same-named collection exists; callers must
    /// drop explicitly first. `ServiceUnavailable` surfaces unchanged.
    pub fn create(&self, binding: &EntityBinding) -> BridgeResult<()> {
        let collection = binding.collection();
        if self.service.has_collection(collection)? {
            return Err(BridgeError::AlreadyExists {
                name: collection.to_string(),
            });
        }
        self.service.create_collection(binding.schema())?;
        for spec in binding.specs() {
            self.service
                .build_index(collection, &spec.name, spec.metric, spec.index, spec.params)?;
        }
        info!(
            target: "annbridge::lifecycle",
            collection,
            fields = binding.specs().len(),
            "Collection created"
        );
        Ok(())
    }

    /// Remove the binding's collection
    ///
    /// # Errors
    /// `NotFound` if the collection does not exist.
    pub fn drop(&self, binding: &EntityBinding) -> BridgeResult<()> {
        self.service.drop_collection(binding.collection())?;
        info!(
            target: "annbridge::lifecycle",
            collection = binding.collection(),
            "Collection dropped"
        );
        Ok(())
    }

    /// Drop the collection if it exists, then create it fresh
    ///
    /// Absence during the drop step is success-of-intent; every other
    /// drop failure propagates.
    pub fn recreate(&self, binding: &EntityBinding) -> BridgeResult<()> {
        match self.drop(binding) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        self.create(binding)
    }
}
