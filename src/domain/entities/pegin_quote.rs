//! # Pegin Quote
//!
//! Terms of a BTC to RBTC transfer and its lifecycle record.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::arithmetic::{ArithmeticResult, CheckedArithmetic};
use crate::domain::value_objects::{Nonce, PeginState, Timestamp, Wei};
use serde::{Deserialize, Serialize};

/// Agreed terms of a pegin.
///
/// Never mutated after creation; fee fields default to zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeginQuote {
    /// Federation BTC address.
    pub fed_btc_address: String,
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
    /// Destination of the call on behalf of the user.
    pub contract_address: String,
    /// Calldata of the call on behalf of the user, hex encoded.
    pub data: String,
    /// Gas limit of the call on behalf of the user.
    pub gas_limit: u32,
    /// Quote nonce.
    pub nonce: Nonce,
    /// Amount delivered to the destination.
    pub value: Wei,
    /// Unix seconds when the quote was agreed.
    pub agreement_timestamp: u32,
    /// Seconds the user has to deposit.
    pub time_for_deposit: u32,
    /// Seconds the LP has to perform the call.
    pub lp_call_time: u32,
    /// BTC confirmations required on the user deposit.
    pub confirmations: u16,
    /// Whether the call happens on registration instead.
    pub call_on_register: bool,
    /// Estimated RSK gas cost.
    pub gas_fee: Wei,
    /// Protocol product fee.
    pub product_fee_amount: Wei,
}

impl PeginQuote {
    /// Returns the moment the deposit window closes.
    #[must_use]
    pub fn expire_time(&self) -> Timestamp {
        Timestamp::from_unix_u32(self.agreement_timestamp)
            .add_secs(i64::from(self.time_for_deposit))
    }

    /// Returns true if the deposit window has closed.
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

    /// Returns the gas limit of the call plus the extra gas the LP adds.
    #[must_use]
    pub fn call_gas_limit(&self, extra_gas: u64) -> u64 {
        u64::from(self.gas_limit).saturating_add(extra_gas)
    }

    /// Returns `(gas limit + extra gas) * gas price + value`, the RBTC the
    /// LP reserves on acceptance.
    ///
    /// # Errors
    ///
    /// Returns an arithmetic error on overflow.
    pub fn required_liquidity(&self, extra_gas: u64, gas_price: Wei) -> ArithmeticResult<Wei> {
        Wei::from(self.call_gas_limit(extra_gas))
            .safe_mul(gas_price)?
            .safe_add(self.value)
    }
}

/// Lifecycle record of an accepted pegin quote.
///
/// Fields absent from older stored documents deserialize to zero or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetainedPeginQuote {
    /// Hash of the quote.
    pub quote_hash: String,
    /// BTC address the user deposits to.
    pub deposit_address: String,
    /// LP signature over the quote hash.
    pub signature: String,
    /// Liquidity reserved at acceptance.
    pub required_liquidity: Wei,
    /// Current lifecycle state.
    pub state: PeginState,
    /// User deposit transaction on Bitcoin.
    #[serde(default)]
    pub user_btc_tx_hash: String,
    /// Call-for-user transaction on RSK.
    #[serde(default)]
    pub call_for_user_tx_hash: String,
    /// Register-pegin transaction on RSK.
    #[serde(default)]
    pub register_pegin_tx_hash: String,
    /// Gas used by the call-for-user transaction.
    #[serde(default)]
    pub call_for_user_gas_used: u64,
    /// Gas price paid by the call-for-user transaction.
    #[serde(default)]
    pub call_for_user_gas_price: Wei,
    /// Gas used by the register-pegin transaction.
    #[serde(default)]
    pub register_pegin_gas_used: u64,
    /// Gas price paid by the register-pegin transaction.
    #[serde(default)]
    pub register_pegin_gas_price: Wei,
    /// Trusted account that accepted the quote, if any.
    #[serde(default)]
    pub owner_account_address: String,
}

impl RetainedPeginQuote {
    /// Creates a retained quote in [`PeginState::WaitingForDeposit`].
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
            state: PeginState::WaitingForDeposit,
            user_btc_tx_hash: String::new(),
            call_for_user_tx_hash: String::new(),
            register_pegin_tx_hash: String::new(),
            call_for_user_gas_used: 0,
            call_for_user_gas_price: Wei::zero(),
            register_pegin_gas_used: 0,
            register_pegin_gas_price: Wei::zero(),
            owner_account_address: String::new(),
        }
    }

    /// Checks the fields every persisted record must carry.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::RequiredField`] naming the first empty field.
    pub fn validate(&self) -> DomainResult<()> {
        const ENTITY: &str = "RetainedPeginQuote";
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

/// A pegin quote together with its lifecycle record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedPeginQuote {
    /// Quote terms.
    pub pegin_quote: PeginQuote,
    /// Lifecycle record.
    pub retained_quote: RetainedPeginQuote,
}
