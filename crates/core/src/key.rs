//! Reversible key encoding for 128-bit entity identifiers
//!
//! The vector service stores only signed 64-bit scalars, so a 128-bit
//! primary key cannot live in a single field. We split it into three
//! non-negative parts:
//!
//! ```text
//! id = (high << 126) | (mid << 63) | low
//!        2 bits         63 bits      63 bits
//! ```
//!
//! ## Contract
//!
//! - `decode(encode(id)) == id` for every id in `[0, 2^128)`. This
//!   round-trip is the central correctness property of the whole layer.
//! - 64-bit identifiers are the special case where `high == 0`.
//! - The synthetic row key derived from the parts is deterministic but
//!   not collision-free; identity is always re-derived from the parts.

use crate::error::{BridgeError, BridgeResult};

/// Bit width of the `high` part
pub const HIGH_BITS: u32 = 2;

/// Bit width of the `mid` and `low` parts
pub const PART_BITS: u32 = 63;

/// Mask for the `high` part (`0b11`)
pub const HIGH_MASK: u64 = (1 << HIGH_BITS) - 1;

/// Mask for the `mid` and `low` parts (`2^63 - 1`)
pub const PART_MASK: u64 = (1 << PART_BITS) - 1;

/// The three-integer decomposition of a 128-bit identifier
///
/// Each part fits a non-negative signed 64-bit scalar, which is all the
/// vector service can store. Derived purely at encode time; never
/// persisted outside the vector-service row itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyParts {
    /// Top 2 bits of the identifier
    pub high: u64,
    /// Middle 63 bits of the identifier
    pub mid: u64,
    /// Bottom 63 bits of the identifier
    pub low: u64,
}

impl KeyParts {
    /// Assemble parts read back from a vector-service row
    ///
    /// # Errors
    /// `Encoding` if any part exceeds its bit width. Rows written by
    /// this layer always pass; the check guards against foreign rows.
    pub fn new(high: u64, mid: u64, low: u64) -> BridgeResult<Self> {
        let parts = KeyParts { high, mid, low };
        parts.validate()?;
        Ok(parts)
    }

    /// Split a 128-bit identifier into its three parts
    ///
    /// # Errors
    /// `Encoding` if a part exceeds its width. Unreachable for any
    /// `u128` input, but checked rather than assumed.
    pub fn encode(id: u128) -> BridgeResult<Self> {
        let parts = KeyParts {
            high: ((id >> (2 * PART_BITS)) & HIGH_MASK as u128) as u64,
            mid: ((id >> PART_BITS) & PART_MASK as u128) as u64,
            low: (id & PART_MASK as u128) as u64,
        };
        parts.validate()?;
        Ok(parts)
    }

    /// Reassemble the original 128-bit identifier
    ///
    /// Exact left inverse of [`KeyParts::encode`] for all valid inputs.
    pub fn decode(&self) -> u128 {
        ((self.high as u128) << (2 * PART_BITS)) | ((self.mid as u128) << PART_BITS) | self.low as u128
    }

    /// Derive the scalar row key the vector service uses as its primary key
    ///
    /// A bitwise fold of the three parts, masked to 63 bits so the value
    /// stays non-negative in signed 64-bit storage. Deterministic but not
    /// collision-free: downstream identity resolution reads the parts,
    /// never this value.
    pub fn synthetic_key(&self) -> u64 {
        ((self.high << 61) ^ self.mid ^ self.low.rotate_left(31)) & PART_MASK
    }

    fn validate(&self) -> BridgeResult<()> {
        if self.high & !HIGH_MASK != 0 {
            return Err(BridgeError::Encoding {
                detail: format!("high part {} exceeds {} bits", self.high, HIGH_BITS),
            });
        }
        if self.mid & !PART_MASK != 0 {
            return Err(BridgeError::Encoding {
                detail: format!("mid part {} exceeds {} bits", self.mid, PART_BITS),
            });
        }
        if self.low & !PART_MASK != 0 {
            return Err(BridgeError::Encoding {
                detail: format!("low part {} exceeds {} bits", self.low, PART_BITS),
            });
        }
        Ok(())
    }
}
