//! # Liquidity Provider
//!
//! The LP capability consumed by the use cases: its identity, its signer,
//! its fee and amount configuration and the liquidity it can still commit.
//!
//! # Examples
//!
//! ```
//! use liquidity_provider::domain::services::liquidity_provider::PegoutConfiguration;
//! use liquidity_provider::domain::value_objects::Wei;
//!
//! let config = PegoutConfiguration {
//!     min_value: Wei::from(10u64),
//!     max_value: Wei::from(100u64),
//!     ..PegoutConfiguration::default()
//! };
//! assert!(config.validate_amount(Wei::from(50u64)).is_ok());
//! assert!(config.validate_amount(Wei::from(101u64)).is_err());
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::services::signature::recover_signer_address;
use crate::domain::value_objects::Wei;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for LP capability operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The signer could not sign.
    #[error("signing error: {0}")]
    Signing(String),

    /// Balances or reserved amounts could not be read.
    #[error("liquidity check error: {0}")]
    Liquidity(String),
}

impl ProviderError {
    /// Creates a signing error.
    #[must_use]
    pub fn signing(msg: impl fmt::Display) -> Self {
        Self::Signing(msg.to_string())
    }

    /// Creates a liquidity check error.
    #[must_use]
    pub fn liquidity(msg: impl fmt::Display) -> Self {
        Self::Liquidity(msg.to_string())
    }
}

/// Result type for LP capability operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

fn validate_bounds(amount: Wei, min: Wei, max: Wei) -> DomainResult<()> {
    if amount < min || amount > max {
        return Err(DomainError::amount_out_of_range(amount, min, max));
    }
    Ok(())
}

/// Pegout limits and fees.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PegoutConfiguration {
    /// Smallest quote value accepted.
    pub min_value: Wei,
    /// Largest quote value accepted.
    pub max_value: Wei,
    /// Fixed part of the call fee.
    pub fixed_fee: Wei,
    /// Percentage part of the call fee, e.g. `1.5` for 1.5%.
    pub fee_percentage: Decimal,
    /// Smallest amount worth sending to the bridge.
    pub bridge_transaction_min: Wei,
    /// Blocks a quote stays valid for.
    pub expire_blocks: u64,
}

impl PegoutConfiguration {
    /// Checks that `amount` lies within `[min_value, max_value]`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::AmountOutOfRange`] otherwise.
    pub fn validate_amount(&self, amount: Wei) -> DomainResult<()> {
        validate_bounds(amount, self.min_value, self.max_value)
    }
}

/// Pegin limits and fees.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeginConfiguration {
    /// Smallest quote value accepted.
    pub min_value: Wei,
    /// Largest quote value accepted.
    pub max_value: Wei,
    /// Fixed part of the call fee.
    pub fixed_fee: Wei,
    /// Percentage part of the call fee.
    pub fee_percentage: Decimal,
    /// Gas added on top of the quote gas limit for `callForUser`.
    pub call_for_user_extra_gas: u64,
}

impl PeginConfiguration {
    /// Checks that `amount` lies within `[min_value, max_value]`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::AmountOutOfRange`] otherwise.
    pub fn validate_amount(&self, amount: Wei) -> DomainResult<()> {
        validate_bounds(amount, self.min_value, self.max_value)
    }
}

/// Identity and signer of the LP.
#[async_trait]
pub trait LiquidityProvider: Send + Sync + fmt::Debug {
    /// Returns the LP address on RSK.
    fn rsk_address(&self) -> String;

    /// Returns the LP address on Bitcoin.
    fn btc_address(&self) -> String;

    /// Signs a hex encoded hash and returns the hex signature.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Signing`] if the hash is malformed or the
    /// signer fails.
    async fn sign_quote(&self, hash: &str) -> ProviderResult<String>;

    /// Returns true if `signature` over `hash` was produced by this LP.
    fn validate_signature(&self, hash: &str, signature: &str) -> bool {
        recover_signer_address(hash, signature)
            .is_ok_and(|signer| signer.eq_ignore_ascii_case(&self.rsk_address()))
    }
}

/// Pegout side of the LP.
#[async_trait]
pub trait PegoutLiquidityProvider: LiquidityProvider {
    /// Returns true if the LP can commit `required` more BTC.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Liquidity`] if balances cannot be read.
    async fn has_pegout_liquidity(&self, required: Wei) -> ProviderResult<bool>;

    /// Returns the pegout configuration.
    fn pegout_configuration(&self) -> PegoutConfiguration;
}

/// Pegin side of the LP.
#[async_trait]
pub trait PeginLiquidityProvider: LiquidityProvider {
    /// Returns true if the LP can commit `required` more RBTC.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Liquidity`] if balances cannot be read.
    async fn has_pegin_liquidity(&self, required: Wei) -> ProviderResult<bool>;

    /// Returns the pegin configuration.
    fn pegin_configuration(&self) -> PeginConfiguration;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let config = PeginConfiguration {
            min_value: Wei::from(10u64),
            max_value: Wei::from(20u64),
            ..PeginConfiguration::default()
        };
        assert!(config.validate_amount(Wei::from(10u64)).is_ok());
        assert!(config.validate_amount(Wei::from(20u64)).is_ok());
        assert_eq!(
            config.validate_amount(Wei::from(9u64)),
            Err(DomainError::amount_out_of_range(
                Wei::from(9u64),
                Wei::from(10u64),
                Wei::from(20u64)
            ))
        );
    }

    #[test]
    fn provider_error_display() {
        assert_eq!(
            ProviderError::liquidity("wallet offline").to_string(),
            "liquidity check error: wallet offline"
        );
    }
}
