//! Opaque asset and account identifiers.
//!
//! Both identifier kinds are 20-byte values, displayed as `0x`-prefixed hex.
//! They are external references: Sluice orders, hashes, and prints them but
//! never interprets their contents.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length in bytes of asset and account identifiers.
pub const ID_LEN: usize = 20;

/// Errors from parsing an identifier out of a hex string.
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("identifier must be {len} bytes, got {0}", len = ID_LEN)]
    BadLength(usize),

    #[error("invalid hex: {0}")]
    BadHex(#[from] hex::FromHexError),
}

/// Identifies one fungible asset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct AssetId([u8; ID_LEN]);

impl AssetId {
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Parses from hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, IdParseError> {
        let bytes = decode_id(s)?;
        Ok(Self(bytes))
    }

    /// First four bytes as hex, for compact log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Identifies an external account: a liquidity provider, a swap initiator,
/// or the market's own custody account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct AccountId([u8; ID_LEN]);

impl AccountId {
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Parses from hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, IdParseError> {
        let bytes = decode_id(s)?;
        Ok(Self(bytes))
    }

    /// First four bytes as hex, for compact log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

fn decode_id(s: &str) -> Result<[u8; ID_LEN], IdParseError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let raw = hex::decode(s)?;
    let len = raw.len();
    raw.try_into().map_err(|_| IdParseError::BadLength(len))
}
