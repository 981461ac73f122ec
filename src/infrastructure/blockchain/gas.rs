//! # Gas Budgets
//!
//! Fixed gas limits and prices of the contract calls the LP makes.
//!
//! RSK uses legacy gas pricing only. Calls whose cost is set by the
//! protocol use the constants below instead of a live estimate.

use crate::domain::value_objects::Wei;
use crate::domain::value_objects::arithmetic::{ArithmeticResult, CheckedArithmetic};

/// Gas limit of a transfer to the bridge for conversion to BTC.
///
/// See <https://dev.rootstock.io/rsk/rbtc/conversion/networks/>.
pub const BRIDGE_CONVERSION_GAS_LIMIT: u64 = 100_000;

/// Gas price of a transfer to the bridge for conversion to BTC.
pub const BRIDGE_CONVERSION_GAS_PRICE: u64 = 60_000_000;

/// Gas limit of `refundPegOut`.
pub const REFUND_PEGOUT_GAS_LIMIT: u64 = 2_500_000;

/// Gas limit and price of one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasBudget {
    /// Gas limit.
    pub gas_limit: u64,
    /// Legacy gas price in wei.
    pub gas_price: Wei,
}

impl GasBudget {
    /// Creates a budget.
    #[must_use]
    pub fn new(gas_limit: u64, gas_price: impl Into<Wei>) -> Self {
        Self {
            gas_limit,
            gas_price: gas_price.into(),
        }
    }

    /// Budget of a transfer to the bridge.
    #[must_use]
    pub fn bridge_conversion() -> Self {
        Self::new(BRIDGE_CONVERSION_GAS_LIMIT, BRIDGE_CONVERSION_GAS_PRICE)
    }

    /// Returns the maximum cost of the transaction.
    ///
    /// # Errors
    ///
    /// Returns an arithmetic error on overflow.
    pub fn cost(&self) -> ArithmeticResult<Wei> {
        Wei::from(self.gas_limit).safe_mul(self.gas_price)
    }

    /// Returns `value` plus the maximum cost, the balance a wallet needs to
    /// send `value` under this budget.
    ///
    /// # Errors
    ///
    /// Returns an arithmetic error on overflow.
    pub fn required_balance(&self, value: Wei) -> ArithmeticResult<Wei> {
        value.safe_add(self.cost()?)
    }
}
