//! Per-database connection configuration
//!
//! A deployment names its logical vector databases and gives each a host
//! and port. The registry resolves database names against this block when
//! establishing connections.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use annbridge_core::{BridgeError, BridgeResult};

/// Address of one logical vector database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Service host
    pub host: String,
    /// Service port
    pub port: u16,
}

/// The full configuration surface of the bridge
///
/// Keyed by logical database name; entity bindings refer to databases by
/// these names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Logical database name to address
    pub databases: HashMap<String, DatabaseConfig>,
}

impl BridgeConfig {
    /// Empty configuration
    pub fn new() -> Self {
        BridgeConfig::default()
    }

    /// Add or replace one database entry
    pub fn with_database(mut self, name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        self.databases.insert(
            name.into(),
            DatabaseConfig {
                host: host.into(),
                port,
            },
        );
        self
    }

    /// Look up a database entry
    ///
    /// # Errors
    /// `Configuration` if the name is not declared.
    pub fn database(&self, name: &str) -> BridgeResult<&DatabaseConfig> {
        self.databases.get(name).ok_or_else(|| BridgeError::Configuration {
            detail: format!("database '{name}' is not configured"),
        })
    }

    /// Parse a configuration from its JSON representation
    pub fn from_json_str(json: &str) -> BridgeResult<Self> {
        serde_json::from_str(json).map_err(|e| BridgeError::Configuration {
            detail: format!("invalid bridge configuration: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let config = BridgeConfig::new().with_database("default", "localhost", 19530);
        let db = config.database("default").unwrap();
        assert_eq!(db.host, "localhost");
        assert_eq!(db.port, 19530);
    }

    #[test]
    fn test_missing_database_is_configuration_error() {
        let config = BridgeConfig::new();
        let err = config.database("default").unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_from_json() {
        let config = BridgeConfig::from_json_str(
            r#"{"databases": {"default": {"host": "milvus.internal", "port": 19530}}}"#,
        )
        .unwrap();
        assert_eq!(config.database("default").unwrap().port, 19530);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(BridgeConfig::from_json_str("not json").is_err());
    }
}
