//! # Trusted Accounts
//!
//! Accounts allowed to accept quotes beyond the public flow, each capped by
//! how much liquidity it may keep locked at once.
//!
//! Records are stored as [`Signed`] values so tampering with the store is
//! detected on read.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::Wei;
use ethers::utils::{hex, keccak256};
use serde::{Deserialize, Serialize};

/// Limits of one trusted account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedAccountDetails {
    /// RSK address of the account, lowercase hex with `0x` prefix.
    pub address: String,
    /// Human readable name.
    pub name: String,
    /// Maximum RBTC value locked in active pegout quotes.
    pub btc_locking_cap: Wei,
    /// Maximum RBTC value locked in active pegin quotes.
    pub rbtc_locking_cap: Wei,
}

impl TrustedAccountDetails {
    /// Returns the address normalized for lookups.
    #[must_use]
    pub fn normalized_address(&self) -> String {
        normalize_address(&self.address)
    }
}

/// Lowercases an RSK address for use as a lookup key.
#[must_use]
pub fn normalize_address(address: &str) -> String {
    address.to_ascii_lowercase()
}

/// A value stored together with the LP signature over its hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signed<T> {
    /// The signed value.
    pub value: T,
    /// LP signature over `hash`, hex encoded.
    pub signature: String,
    /// Keccak256 of the JSON encoding of `value`, hex encoded.
    pub hash: String,
}

impl<T: Serialize> Signed<T> {
    /// Computes the hash a signature over `value` must cover.
    ///
    /// # Errors
    ///
    /// Returns a deserialization error if the value cannot be encoded.
    pub fn hash_of(value: &T) -> DomainResult<String> {
        let encoded = serde_json::to_vec(value)
            .map_err(|e| DomainError::deserialization(format!("cannot encode value: {e}")))?;
        Ok(hex::encode(keccak256(encoded)))
    }

    /// Returns true if `hash` matches the current contents of `value`.
    #[must_use]
    pub fn check_integrity(&self) -> bool {
        Self::hash_of(&self.value).is_ok_and(|hash| hash.eq_ignore_ascii_case(&self.hash))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn details() -> TrustedAccountDetails {
        TrustedAccountDetails {
            address: "0xAbC0000000000000000000000000000000000001".to_string(),
            name: "desk".to_string(),
            btc_locking_cap: Wei::from(1000u64),
            rbtc_locking_cap: Wei::from(2000u64),
        }
    }

    #[test]
    fn hash_is_keccak_of_json() {
        let hash = Signed::hash_of(&details()).unwrap();
        let expected = hex::encode(keccak256(serde_json::to_vec(&details()).unwrap()));
        assert_eq!(hash, expected);
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn modified_value_fails_integrity() {
        let hash = Signed::hash_of(&details()).unwrap();
        let mut signed = Signed {
            value: details(),
            signature: "00".repeat(65),
            hash,
        };
        assert!(signed.check_integrity());

        signed.value.btc_locking_cap = Wei::from(1_000_000u64);
        assert!(!signed.check_integrity());
    }

    #[test]
    fn normalized_address_is_lowercase() {
        assert_eq!(
            details().normalized_address(),
            "0xabc0000000000000000000000000000000000001"
        );
    }
}
