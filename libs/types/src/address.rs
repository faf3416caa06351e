//! Asset and party identifiers
//!
//! Full 20-byte addresses are kept everywhere; nothing is truncated for
//! indexing. Pools are keyed by [`PoolKey`], whose constructor applies the
//! canonical byte-lexicographic ordering.

use crate::errors::DexError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 20-byte identifier for an asset or an acting party
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Address([u8; 20]);

/// Failure parsing an [`Address`] from its hex form
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("address must be 40 hex characters, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex in address: {0}")]
    InvalidHex(String),
}

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Deterministic address whose last eight bytes carry `n`; handy for fixtures
    pub const fn from_low_u64(n: u64) -> Self {
        let b = n.to_be_bytes();
        Self([
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ])
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_clean = s.strip_prefix("0x").unwrap_or(s);
        if hex_clean.len() != 40 {
            return Err(AddressParseError::InvalidLength(hex_clean.len()));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_clean, &mut bytes)
            .map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(self.0))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Canonical, order-independent identity of a two-asset pool
///
/// Invariant: `x < y`. The only way to build one is [`PoolKey::new`], which
/// sorts its arguments, so `(A, B)` and `(B, A)` always produce equal keys.
/// Deserialization goes through the same constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "PoolKeyFields")]
pub struct PoolKey {
    x: Address,
    y: Address,
}

impl PoolKey {
    pub fn new(asset_a: Address, asset_b: Address) -> Result<Self, DexError> {
        if asset_a == asset_b {
            return Err(DexError::IdenticalAssets { asset: asset_a });
        }
        let (x, y) = if asset_a < asset_b {
            (asset_a, asset_b)
        } else {
            (asset_b, asset_a)
        };
        Ok(Self { x, y })
    }

    /// Lower-ordered asset
    pub fn x(&self) -> Address {
        self.x
    }

    /// Higher-ordered asset
    pub fn y(&self) -> Address {
        self.y
    }

    pub fn contains(&self, asset: Address) -> bool {
        self.x == asset || self.y == asset
    }

    /// True when `asset` is the canonical `x` side of this pair
    pub fn is_x(&self, asset: Address) -> bool {
        self.x == asset
    }
}

#[derive(Deserialize)]
struct PoolKeyFields {
    x: Address,
    y: Address,
}

impl TryFrom<PoolKeyFields> for PoolKey {
    type Error = DexError;

    fn try_from(fields: PoolKeyFields) -> Result<Self, Self::Error> {
        PoolKey::new(fields.x, fields.y)
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.x, self.y)
    }
}
