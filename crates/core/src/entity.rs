//! Entity identifiers and the relational-store boundary
//!
//! The relational store owns the authoritative identifier and attribute
//! values; this layer only ever sees them through the traits below. An
//! entity type declares its vector fields explicitly at setup time (see
//! [`crate::binding::EntityBinding`]) instead of being reflected over at
//! runtime.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BridgeError, BridgeResult};

/// Kind of primary key an entity type is declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdKind {
    /// Unsigned integer key, at most 64 bits
    Int,
    /// 128-bit key (UUID)
    Uuid,
}

/// Primary key of one entity row
///
/// Either an unsigned integer or a 128-bit UUID. Widened to `u128` for
/// encoding; narrowed back per the entity type's declared [`IdKind`]
/// after decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityId {
    /// Integer primary key
    Int(u64),
    /// UUID primary key
    Uuid(Uuid),
}

impl EntityId {
    /// The full 128-bit value of this identifier
    pub fn as_u128(&self) -> u128 {
        match self {
            EntityId::Int(v) => *v as u128,
            EntityId::Uuid(u) => u.as_u128(),
        }
    }

    /// Which kind of identifier this is
    pub fn kind(&self) -> IdKind {
        match self {
            EntityId::Int(_) => IdKind::Int,
            EntityId::Uuid(_) => IdKind::Uuid,
        }
    }

    /// Narrow a decoded 128-bit value back to the declared identifier kind
    ///
    /// # Errors
    /// `Encoding` if an `Int` entity type yields a value wider than 64
    /// bits. Rows written by this layer always narrow cleanly; the check
    /// guards against a binding declared with the wrong kind.
    pub fn from_u128(kind: IdKind, value: u128) -> BridgeResult<Self> {
        match kind {
            IdKind::Int => {
                let v = u64::try_from(value).map_err(|_| BridgeError::Encoding {
                    detail: format!("decoded id {value:#x} does not fit an integer key"),
                })?;
                Ok(EntityId::Int(v))
            }
            IdKind::Uuid => Ok(EntityId::Uuid(Uuid::from_u128(value))),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(v) => write!(f, "{v}"),
            EntityId::Uuid(u) => write!(f, "{u}"),
        }
    }
}

impl From<u64> for EntityId {
    fn from(v: u64) -> Self {
        EntityId::Int(v)
    }
}

impl From<Uuid> for EntityId {
    fn from(u: Uuid) -> Self {
        EntityId::Uuid(u)
    }
}

/// One vector-bearing entity row as seen by the synchronizer
pub trait VectorEntity {
    /// Primary key of this row
    fn entity_id(&self) -> EntityId;

    /// Value of the named vector attribute, if the entity carries it
    fn vector(&self, field: &str) -> Option<&[f32]>;
}

/// Full-scan access to an entity type's rows, used by rebuild
///
/// The minimal contract is one unbounded scan; the synchronizer re-chunks
/// the result by its configured batch size before handing rows to the
/// vector service.
pub trait EntitySource {
    /// Entity row type produced by this source
    type Entity: VectorEntity;

    /// Read every row of the entity type from the relational store
    fn scan(&self) -> BridgeResult<Vec<Self::Entity>>;
}
