//! # Quote Hash
//!
//! The 32-byte identifier of a quote, written as 64 hex characters.

use crate::domain::errors::{DomainError, DomainResult};
use ethers::utils::hex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a quote hash in hex characters.
pub const QUOTE_HASH_LENGTH: usize = 64;

/// Validates that a string is a well formed quote hash.
///
/// # Errors
///
/// Returns [`DomainError::InvalidQuoteHash`] if the string is not exactly
/// 64 hex characters.
///
/// # Examples
///
/// ```
/// use liquidity_provider::domain::value_objects::quote_hash::validate_quote_hash;
///
/// assert!(validate_quote_hash(&"ab".repeat(32)).is_ok());
/// assert!(validate_quote_hash("0x1234").is_err());
/// ```
pub fn validate_quote_hash(hash: &str) -> DomainResult<()> {
    if hash.len() != QUOTE_HASH_LENGTH {
        return Err(DomainError::invalid_quote_hash(hash, "length must be 64"));
    }
    if !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DomainError::invalid_quote_hash(hash, "not a hex string"));
    }
    Ok(())
}

/// A validated quote hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuoteHash(String);

impl QuoteHash {
    /// Parses and validates a quote hash.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidQuoteHash`] if the format is wrong.
    pub fn parse(hash: impl Into<String>) -> DomainResult<Self> {
        let hash = hash.into();
        validate_quote_hash(&hash)?;
        Ok(Self(hash))
    }

    /// Returns the hash as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decodes the hash into its fixed-size byte form.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidQuoteHash`] if decoding fails.
    pub fn to_bytes(&self) -> DomainResult<[u8; 32]> {
        let decoded =
            hex::decode(&self.0).map_err(|e| DomainError::invalid_quote_hash(&self.0, e))?;
        <[u8; 32]>::try_from(decoded.as_slice())
            .map_err(|_| DomainError::invalid_quote_hash(&self.0, "hash is not 32 bytes"))
    }
}

impl fmt::Display for QuoteHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for QuoteHash {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<QuoteHash> for String {
    fn from(hash: QuoteHash) -> Self {
        hash.0
    }
}

impl AsRef<str> for QuoteHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
