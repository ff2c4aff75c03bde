//! Error types for annbridge
//!
//! One taxonomy shared by every layer. We use `thiserror` for automatic
//! `Display` and `Error` trait implementations.
//!
//! Propagation policy: nothing here is swallowed or retried internally.
//! Every failure surfaces to the immediate caller unchanged; the single
//! tolerated failure is `NotFound` during the drop step of a rebuild.

use thiserror::Error;

/// Result type alias for annbridge operations
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Error taxonomy for the bridge layer
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Identifier does not fit the key-part bit widths.
    ///
    /// Unreachable for identifiers of 128 bits or fewer, but checked
    /// rather than assumed.
    #[error("Encoding error: {detail}")]
    Encoding {
        /// What failed to fit where
        detail: String,
    },

    /// Invalid or duplicate vector field declarations
    #[error("Configuration error: {detail}")]
    Configuration {
        /// Reason the declaration was rejected
        detail: String,
    },

    /// Live collection schema disagrees with the declared schema.
    ///
    /// The write is aborted, never auto-migrated; rebuild is the only
    /// supported migration path.
    #[error("Schema mismatch for '{collection}': expected {expected:?}, got {actual:?}")]
    SchemaMismatch {
        /// Collection whose schema was checked
        collection: String,
        /// Field names derived from the declared specs
        expected: Vec<String>,
        /// Field names reported by the live collection
        actual: Vec<String>,
    },

    /// Vector service cannot be reached
    #[error("Service unavailable: {detail}")]
    ServiceUnavailable {
        /// Connectivity failure detail
        detail: String,
    },

    /// Collection with this name already exists
    #[error("Collection already exists: {name}")]
    AlreadyExists {
        /// Collection name
        name: String,
    },

    /// Collection with this name does not exist
    #[error("Collection not found: {name}")]
    NotFound {
        /// Collection name
        name: String,
    },

    /// Bad search or lookup parameters
    #[error("Invalid argument: {detail}")]
    InvalidArgument {
        /// Why the argument was rejected
        detail: String,
    },
}

impl BridgeError {
    /// Check if this error means the collection was absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, BridgeError::NotFound { .. })
    }

    /// Check if this error is a caller-side validation failure
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            BridgeError::Configuration { .. } | BridgeError::InvalidArgument { .. }
        )
    }
}
