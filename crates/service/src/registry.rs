//! Connection registry for vector services
//!
//! One cached connection per logical database name, established lazily
//! through a [`ServiceConnector`] and reused for the life of the process.
//! The registry is an explicit object passed by reference to whatever
//! needs service access; there is no ambient global state.
//!
//! There is no teardown: connections live until the registry is dropped,
//! and re-establishing one after a fresh registry is idempotent.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use annbridge_core::BridgeResult;

use crate::config::{BridgeConfig, DatabaseConfig};
use crate::traits::VectorService;

/// Factory turning a database address into a live service connection
///
/// # Errors
/// `ServiceUnavailable` when the backing service cannot be reached; the
/// registry surfaces this unchanged and caches nothing.
pub trait ServiceConnector: Send + Sync {
    /// Establish a connection to one logical database
    fn connect(
        &self,
        database: &str,
        config: &DatabaseConfig,
    ) -> BridgeResult<Arc<dyn VectorService>>;
}

/// Cache of vector-service connections keyed by database name
pub struct ConnectionRegistry {
    config: BridgeConfig,
    connector: Box<dyn ServiceConnector>,
    cache: DashMap<String, Arc<dyn VectorService>>,
}

impl ConnectionRegistry {
    /// Build a registry over a configuration block and a connector
    pub fn new(config: BridgeConfig, connector: Box<dyn ServiceConnector>) -> Self {
        ConnectionRegistry {
            config,
            connector,
            cache: DashMap::new(),
        }
    }

    /// Connection for a logical database, connecting on first use
    ///
    /// # Errors
    /// `Configuration` if the database is not declared,
    /// `ServiceUnavailable` if connecting fails. Failed connections are
    /// not cached; the next call retries from scratch.
    pub fn get(&self, database: &str) -> BridgeResult<Arc<dyn VectorService>> {
        if let Some(service) = self.cache.get(database) {
            return Ok(Arc::clone(&service));
        }
        let db_config = self.config.database(database)?;
        debug!(
            target: "annbridge::registry",
            database,
            host = %db_config.host,
            port = db_config.port,
            "Connecting to vector service"
        );
        let service = self.connector.connect(database, db_config)?;
        let entry = self
            .cache
            .entry(database.to_string())
            .or_insert_with(|| Arc::clone(&service));
        Ok(Arc::clone(&entry))
    }

    /// Whether a connection for this database is already cached
    pub fn is_connected(&self, database: &str) -> bool {
        self.cache.contains_key(database)
    }
}
