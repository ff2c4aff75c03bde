//! High-level wiring of registry, bindings and components
//!
//! An entity type keyed into several logical databases declares one
//! binding per database; [`Bridge`] fans rebuilds and updates out across
//! them, resolving each binding's connection through the registry.

use annbridge_core::{BridgeResult, EntityBinding, EntitySource, VectorEntity};
use annbridge_service::ConnectionRegistry;

use crate::resolve::NearestNeighborResolver;
use crate::sync::{EntrySynchronizer, SyncOptions};

/// Entry point tying the connection registry to entity bindings
pub struct Bridge {
    registry: ConnectionRegistry,
    options: SyncOptions,
}

impl Bridge {
    /// Bridge over a connection registry, with default sync options
    pub fn new(registry: ConnectionRegistry) -> Self {
        Bridge {
            registry,
            options: SyncOptions::default(),
        }
    }

    /// Override the bulk-write options used by synchronizers
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// The underlying connection registry
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Synchronizer for one binding, connected to its database
    pub fn synchronizer(&self, binding: &EntityBinding) -> BridgeResult<EntrySynchronizer> {
        let service = self.registry.get(binding.database())?;
        Ok(EntrySynchronizer::new(service, binding.clone()).with_options(self.options))
    }

    /// Resolver for one binding and vector field
    pub fn resolver(
        &self,
        binding: &EntityBinding,
        field: &str,
    ) -> BridgeResult<NearestNeighborResolver> {
        let service = self.registry.get(binding.database())?;
        NearestNeighborResolver::new(service, binding.clone(), field)
    }

    /// Rebuild every binding of an entity type from one store scan
    ///
    /// Each binding is rebuilt in its own database; returns the total row
    /// count written.
    pub fn rebuild_all<S: EntitySource>(
        &self,
        bindings: &[EntityBinding],
        source: &S,
    ) -> BridgeResult<usize> {
        let mut total = 0;
        for binding in bindings {
            total += self.synchronizer(binding)?.rebuild(source)?;
        }
        Ok(total)
    }

    /// Propagate one entity's current state to every binding
    pub fn update_all<E: VectorEntity>(
        &self,
        bindings: &[EntityBinding],
        entity: &E,
    ) -> BridgeResult<()> {
        for binding in bindings {
            self.synchronizer(binding)?.update(entity)?;
        }
        Ok(())
    }
}
