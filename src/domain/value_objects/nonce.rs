//! # Nonce
//!
//! The per-quote nonce and its BSON element encoding.
//!
//! Quotes store the nonce as a BSON string so values beyond the 53-bit
//! integer range of some drivers survive. Older documents hold a BSON
//! int64, which is still accepted on read.

use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// BSON element types a nonce can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BsonType {
    /// 64-bit floating point (`0x01`).
    Double,
    /// UTF-8 string (`0x02`).
    String,
    /// Binary data (`0x05`).
    Binary,
    /// 32-bit integer (`0x10`).
    Int32,
    /// 64-bit integer (`0x12`).
    Int64,
}

impl BsonType {
    /// Returns the BSON element type tag.
    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Double => 0x01,
            Self::String => 0x02,
            Self::Binary => 0x05,
            Self::Int32 => 0x10,
            Self::Int64 => 0x12,
        }
    }
}

/// A quote nonce.
///
/// The default nonce is zero and displays as `"0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(i64);

impl Nonce {
    /// Creates a nonce.
    #[inline]
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the nonce value.
    #[inline]
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Encodes the nonce as the value part of a BSON string element.
    ///
    /// Layout: little-endian `i32` byte length (digits plus the trailing
    /// NUL), the decimal digits, then NUL.
    #[must_use]
    pub fn to_bson_value(&self) -> (BsonType, Vec<u8>) {
        let digits = self.0.to_string();
        // at most 20 digits, the length always fits
        let length = (digits.len() + 1) as i32;
        let mut bytes = Vec::with_capacity(digits.len() + 5);
        bytes.extend_from_slice(&length.to_le_bytes());
        bytes.extend_from_slice(digits.as_bytes());
        bytes.push(0);
        (BsonType::String, bytes)
    }

    /// Decodes a nonce from a BSON string or int64 element value.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Deserialization`] for any other element type
    /// or a malformed payload.
    pub fn from_bson_value(bson_type: BsonType, bytes: &[u8]) -> DomainResult<Self> {
        match bson_type {
            BsonType::Int64 => {
                let raw = <[u8; 8]>::try_from(bytes)
                    .map_err(|_| DomainError::deserialization("nonce int64 must be 8 bytes"))?;
                Ok(Self(i64::from_le_bytes(raw)))
            }
            BsonType::String => Self::decode_bson_string(bytes),
            other => Err(DomainError::deserialization(format!(
                "unsupported bson type 0x{:02x} for nonce",
                other.tag()
            ))),
        }
    }

    fn decode_bson_string(bytes: &[u8]) -> DomainResult<Self> {
        let (length, rest) = bytes
            .split_first_chunk::<4>()
            .ok_or_else(|| DomainError::deserialization("nonce string is truncated"))?;
        let length = usize::try_from(i32::from_le_bytes(*length))
            .map_err(|_| DomainError::deserialization("negative nonce string length"))?;
        let (digits, terminator) = match (length.checked_sub(1), rest.len() == length) {
            (Some(n), true) => rest.split_at(n),
            _ => return Err(DomainError::deserialization("nonce string length mismatch")),
        };
        if terminator.first() != Some(&0) {
            return Err(DomainError::deserialization("nonce string is not terminated"));
        }
        std::str::from_utf8(digits)
            .ok()
            .and_then(|text| text.parse::<i64>().ok())
            .map(Self)
            .ok_or_else(|| DomainError::deserialization("nonce string is not an integer"))
    }
}

impl From<i64> for Nonce {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
