//! # Pegout Quote
//!
//! Terms of an RBTC to BTC transfer and the lifecycle record created once
//! the LP accepts it.
//!
//! # Examples
//!
//! ```
//! use liquidity_provider::domain::entities::pegout_quote::PegoutQuote;
//! use liquidity_provider::domain::value_objects::Wei;
//!
//! let quote = PegoutQuote {
//!     value: Wei::from(12u64),
//!     call_fee: Wei::from(5u64),
//!     gas_fee: Wei::from(6u64),
//!     product_fee_amount: Wei::from(2u64),
//!     ..PegoutQuote::default()
//! };
//! assert_eq!(quote.total().unwrap(), Wei::from(25u64));
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::arithmetic::{ArithmeticResult, CheckedArithmetic};
use crate::domain::value_objects::{Nonce, PegoutState, Timestamp, Wei};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Agreed terms of a pegout.
///
/// Never mutated after creation; fee fields default to zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PegoutQuote {
    /// Liquidity bridge contract address.
    pub lbc_address: String,
    /// LP address on RSK.
    pub lp_rsk_address: String,
    /// User BTC address to refund if the LP fails.
    pub btc_refund_address: String,
    /// User RSK address to refund if the LP fails.
    pub rsk_refund_address: String,
    /// LP BTC address.
    pub lp_btc_address: String,
    /// Fee charged by the LP.
    pub call_fee: Wei,
    /// Penalty paid by the LP if it fails to deliver.
    pub penalty_fee: Wei,
    /// Quote nonce.
    pub nonce: Nonce,
    /// BTC address the LP pays to.
    pub deposit_address: String,
    /// Amount the user receives.
    pub value: Wei,
    /// Unix seconds when the quote was agreed.
    pub agreement_timestamp: u32,
    /// Unix seconds until which the user may deposit.
    pub deposit_date_limit: u32,
    /// RSK confirmations required on the user deposit.
    pub deposit_confirmations: u16,
    /// BTC confirmations required on the LP payment before refunding.
    pub transfer_confirmations: u16,
    /// Seconds the LP has to send the BTC.
    pub transfer_time: u32,
    /// Unix seconds after which the quote is expired.
    pub expire_date: u32,
    /// RSK block after which the quote is expired.
    pub expire_block: u32,
    /// Estimated BTC network fee.
    pub gas_fee: Wei,
    /// Protocol product fee.
    pub product_fee_amount: Wei,
}

impl PegoutQuote {
    /// Returns the moment the quote expires.
    #[must_use]
    pub fn expire_time(&self) -> Timestamp {
        Timestamp::from_unix_u32(self.expire_date)
    }

    /// Returns true if the quote has expired by time.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expire_time().is_expired()
    }

    /// Returns `value + call fee + product fee + gas fee`.
    ///
    /// # Errors
    ///
    /// Returns an arithmetic error if the sum overflows.
    pub fn total(&self) -> ArithmeticResult<Wei> {
        Wei::checked_sum([
            self.value,
            self.call_fee,
            self.product_fee_amount,
            self.gas_fee,
        ])
    }

    /// Returns `value + call fee + gas fee`, the amount the LP recovers
    /// from the contract and forwards to the bridge.
    ///
    /// # Errors
    ///
    /// Returns an arithmetic error if the sum overflows.
    pub fn refundable_amount(&self) -> ArithmeticResult<Wei> {
        Wei::checked_sum([self.value, self.call_fee, self.gas_fee])
    }

    /// Returns `value + gas fee`, the liquidity reserved on acceptance.
    ///
    /// # Errors
    ///
    /// Returns an arithmetic error if the sum overflows.
    pub fn required_liquidity(&self) -> ArithmeticResult<Wei> {
        self.value.safe_add(self.gas_fee)
    }

    /// Returns the block the quote was created at, given the configured
    /// number of blocks a quote stays valid.
    #[must_use]
    pub fn creation_block(&self, expire_blocks: u64) -> u64 {
        u64::from(self.expire_block).saturating_sub(expire_blocks)
    }
}

/// Fee snapshot taken when a pegout quote is created.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PegoutCreationData {
    /// BTC fee rate in sat/vbyte.
    pub fee_rate: Decimal,
    /// Percentage call fee.
    pub fee_percentage: Decimal,
    /// RSK gas price at creation.
    pub gas_price: Wei,
    /// Fixed call fee.
    pub fixed_fee: Wei,
}

impl PegoutCreationData {
    /// Returns the all-zero snapshot used when none was stored.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Lifecycle record of an accepted pegout quote.
///
/// Fields absent from older stored documents deserialize to zero or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetainedPegoutQuote {
    /// Hash of the quote.
    pub quote_hash: String,
    /// Address the user deposits RBTC to.
    pub deposit_address: String,
    /// LP signature over the quote hash.
    pub signature: String,
    /// Liquidity reserved at acceptance.
    pub required_liquidity: Wei,
    /// Current lifecycle state.
    pub state: PegoutState,
    /// User deposit transaction on RSK.
    #[serde(default)]
    pub user_rsk_tx_hash: String,
    /// LP payment transaction on Bitcoin.
    #[serde(default)]
    pub lp_btc_tx_hash: String,
    /// Refund claim transaction on RSK.
    #[serde(default)]
    pub refund_pegout_tx_hash: String,
    /// Transaction forwarding the refunded RBTC to the bridge.
    #[serde(default)]
    pub bridge_refund_tx_hash: String,
    /// Gas used by the bridge transaction.
    #[serde(default)]
    pub bridge_refund_gas_used: u64,
    /// Gas price paid by the bridge transaction.
    #[serde(default)]
    pub bridge_refund_gas_price: Wei,
    /// Fee paid by the LP for the BTC payment.
    #[serde(default)]
    pub send_pegout_btc_fee: Wei,
    /// Bridge transaction that released BTC back to the LP.
    #[serde(default)]
    pub btc_release_tx_hash: String,
    /// Trusted account that accepted the quote, if any.
    #[serde(default)]
    pub owner_account_address: String,
}

impl RetainedPegoutQuote {
    /// Creates a retained quote in [`PegoutState::WaitingForDeposit`].
    #[must_use]
    pub fn new(
        quote_hash: impl Into<String>,
        deposit_address: impl Into<String>,
        signature: impl Into<String>,
        required_liquidity: Wei,
    ) -> Self {
        Self {
            quote_hash: quote_hash.into(),
            deposit_address: deposit_address.into(),
            signature: signature.into(),
            required_liquidity,
            state: PegoutState::WaitingForDeposit,
            user_rsk_tx_hash: String::new(),
            lp_btc_tx_hash: String::new(),
            refund_pegout_tx_hash: String::new(),
            bridge_refund_tx_hash: String::new(),
            bridge_refund_gas_used: 0,
            bridge_refund_gas_price: Wei::zero(),
            send_pegout_btc_fee: Wei::zero(),
            btc_release_tx_hash: String::new(),
            owner_account_address: String::new(),
        }
    }

    /// Checks the fields every persisted record must carry.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::RequiredField`] naming the first empty field.
    pub fn validate(&self) -> DomainResult<()> {
        const ENTITY: &str = "RetainedPegoutQuote";
        if self.quote_hash.is_empty() {
            return Err(DomainError::required_field(ENTITY, "quote_hash"));
        }
        if self.deposit_address.is_empty() {
            return Err(DomainError::required_field(ENTITY, "deposit_address"));
        }
        if self.signature.is_empty() {
            return Err(DomainError::required_field(ENTITY, "signature"));
        }
        Ok(())
    }
}

/// A pegout quote together with its lifecycle record and fee snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedPegoutQuote {
    /// Quote terms.
    pub pegout_quote: PegoutQuote,
    /// Lifecycle record.
    pub retained_quote: RetainedPegoutQuote,
    /// Fee snapshot.
    pub creation_data: PegoutCreationData,
}

impl WatchedPegoutQuote {
    /// Bundles a quote with its record and snapshot.
    #[must_use]
    pub fn new(
        pegout_quote: PegoutQuote,
        retained_quote: RetainedPegoutQuote,
        creation_data: PegoutCreationData,
    ) -> Self {
        Self {
            pegout_quote,
            retained_quote,
            creation_data,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn quote() -> PegoutQuote {
        PegoutQuote {
            value: Wei::from(12u64),
            call_fee: Wei::from(5u64),
            gas_fee: Wei::from(6u64),
            product_fee_amount: Wei::from(2u64),
            expire_block: 500,
            ..PegoutQuote::default()
        }
    }

    mod amounts {
        use super::*;

        #[test]
        fn total_sums_every_fee() {
            assert_eq!(quote().total().unwrap(), Wei::from(25u64));
        }

        #[test]
        fn total_of_empty_quote_is_zero() {
            assert_eq!(PegoutQuote::default().total().unwrap(), Wei::zero());
        }

        #[test]
        fn refundable_amount_excludes_product_fee() {
            assert_eq!(quote().refundable_amount().unwrap(), Wei::from(23u64));
        }

        #[test]
        fn required_liquidity_is_value_plus_gas() {
            assert_eq!(quote().required_liquidity().unwrap(), Wei::from(18u64));
        }

        #[test]
        fn creation_block_saturates() {
            assert_eq!(quote().creation_block(100), 400);
            assert_eq!(quote().creation_block(1000), 0);
        }
    }

    mod expiry {
        use super::*;

        #[test]
        fn past_expire_date_is_expired() {
            let mut q = quote();
            q.expire_date = 1;
            assert!(q.is_expired());
        }

        #[test]
        fn future_expire_date_is_not_expired() {
            let mut q = quote();
            q.expire_date = u32::MAX;
            assert!(!q.is_expired());
        }
    }

    mod retained {
        use super::*;
        use proptest::prelude::*;

        #[test]
        fn new_starts_waiting_for_deposit() {
            let retained = RetainedPegoutQuote::new("hash", "0xabcd", "sig", Wei::from(18u64));
            assert_eq!(retained.state, PegoutState::WaitingForDeposit);
            assert!(retained.validate().is_ok());
        }

        #[test]
        fn validate_reports_missing_signature() {
            let retained = RetainedPegoutQuote::new("hash", "0xabcd", "", Wei::from(18u64));
            let err = retained.validate().unwrap_err();
            assert_eq!(err, DomainError::required_field("RetainedPegoutQuote", "signature"));
        }

        #[test]
        fn missing_gas_fields_normalize_to_zero() {
            let json = r#"{
                "quoteHash": "hash",
                "depositAddress": "0xabcd",
                "signature": "sig",
                "requiredLiquidity": "18",
                "state": "BridgeTxSucceeded"
            }"#;
            let once: RetainedPegoutQuote = serde_json::from_str(json).unwrap();
            assert_eq!(once.bridge_refund_gas_price, Wei::zero());
            assert_eq!(once.bridge_refund_gas_used, 0);

            let twice: RetainedPegoutQuote =
                serde_json::from_str(&serde_json::to_string(&once).unwrap()).unwrap();
            assert_eq!(once, twice);
        }

        proptest! {
            #[test]
            fn bridge_gas_normalization_is_idempotent(
                gas_used in proptest::option::of(any::<u64>()),
                gas_price in proptest::option::of(any::<u64>()),
            ) {
                let mut document = serde_json::json!({
                    "quoteHash": "hash",
                    "depositAddress": "0xabcd",
                    "signature": "sig",
                    "requiredLiquidity": "18",
                    "state": "BridgeTxSucceeded",
                });
                if let Some(used) = gas_used {
                    document["bridgeRefundGasUsed"] = serde_json::json!(used);
                }
                if let Some(price) = gas_price {
                    document["bridgeRefundGasPrice"] = serde_json::json!(price.to_string());
                }
                let once: RetainedPegoutQuote = serde_json::from_value(document).unwrap();
                prop_assert_eq!(once.bridge_refund_gas_used, gas_used.unwrap_or(0));
                prop_assert_eq!(once.bridge_refund_gas_price, Wei::from(gas_price.unwrap_or(0)));
                let twice: RetainedPegoutQuote =
                    serde_json::from_value(serde_json::to_value(&once).unwrap()).unwrap();
                prop_assert_eq!(once, twice);
            }
        }
    }

    mod serde {
        use super::*;

        #[test]
        fn quote_roundtrip_uses_camel_case() {
            let json = serde_json::to_value(quote()).unwrap();
            assert_eq!(json["callFee"], "5");
            assert_eq!(json["expireBlock"], 500);
            let back: PegoutQuote = serde_json::from_value(json).unwrap();
            assert_eq!(back, quote());
        }

        #[test]
        fn creation_data_zero() {
            let zero = PegoutCreationData::zero();
            assert_eq!(zero.gas_price, Wei::zero());
            assert_eq!(zero.fee_percentage, Decimal::ZERO);
        }
    }
}
