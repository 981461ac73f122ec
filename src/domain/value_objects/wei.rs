//! # Wei Value Object
//!
//! Exact-precision monetary amount used for every value, fee and balance.
//!
//! One RBTC is `10^18` wei and one satoshi is `10^10` wei, so BTC amounts
//! convert without loss.
//!
//! # Examples
//!
//! ```
//! use liquidity_provider::domain::value_objects::Wei;
//!
//! let fee = Wei::from_satoshis(5);
//! assert_eq!(fee, Wei::from(50_000_000_000u64));
//! assert_eq!(Wei::parse("1500000000000000000").unwrap().to_rbtc(), "1.5");
//! ```

use super::arithmetic::{ArithmeticError, ArithmeticResult, CheckedArithmetic};
use ethers::types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Wei per satoshi.
pub const WEI_PER_SATOSHI: u64 = 10_000_000_000;

const RBTC_DECIMALS: usize = 18;

/// A non-negative amount of wei.
///
/// # Invariants
///
/// - Never negative; subtraction below zero is an [`ArithmeticError::Underflow`]
/// - Defaults to zero, there is no "missing" amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Wei(U256);

impl Wei {
    /// Zero wei.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(U256::zero())
    }

    /// Wraps a raw 256-bit amount.
    #[inline]
    #[must_use]
    pub const fn from_u256(value: U256) -> Self {
        Self(value)
    }

    /// Converts an amount of satoshis to wei.
    #[must_use]
    pub fn from_satoshis(satoshis: u64) -> Self {
        Self(U256::from(satoshis) * U256::from(WEI_PER_SATOSHI))
    }

    /// Parses a decimal string of wei.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::InvalidValue` if the string is not a
    /// non-negative base-10 integer that fits in 256 bits.
    pub fn parse(value: &str) -> ArithmeticResult<Self> {
        U256::from_dec_str(value.trim())
            .map(Self)
            .map_err(|_| ArithmeticError::InvalidValue("not a decimal wei amount"))
    }

    /// Returns the raw 256-bit value.
    #[inline]
    #[must_use]
    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Returns true if the amount is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns the whole number of satoshis, truncating the remainder.
    #[must_use]
    pub fn to_satoshis(&self) -> U256 {
        self.0 / U256::from(WEI_PER_SATOSHI)
    }

    /// Formats the amount in RBTC without trailing zeros.
    #[must_use]
    pub fn to_rbtc(&self) -> String {
        let unit = U256::exp10(RBTC_DECIMALS);
        let (whole, fraction) = self.0.div_mod(unit);
        if fraction.is_zero() {
            return whole.to_string();
        }
        let fraction = format!("{:0>width$}", fraction.to_string(), width = RBTC_DECIMALS);
        format!("{whole}.{}", fraction.trim_end_matches('0'))
    }

    /// Adds, clamping at the maximum.
    #[must_use]
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Subtracts, clamping at zero.
    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Adds every amount in the iterator.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the sum exceeds 256 bits.
    pub fn checked_sum<I>(values: I) -> ArithmeticResult<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        values
            .into_iter()
            .try_fold(Self::zero(), |acc, value| acc.safe_add(value))
    }
}

impl CheckedArithmetic for Wei {
    #[inline]
    fn safe_add(self, rhs: Self) -> ArithmeticResult<Self> {
        self.0.safe_add(rhs.0).map(Self)
    }

    #[inline]
    fn safe_sub(self, rhs: Self) -> ArithmeticResult<Self> {
        self.0.safe_sub(rhs.0).map(Self)
    }

    #[inline]
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self> {
        self.0.safe_mul(rhs.0).map(Self)
    }

    #[inline]
    fn safe_div(self, rhs: Self) -> ArithmeticResult<Self> {
        self.0.safe_div(rhs.0).map(Self)
    }
}

impl From<u64> for Wei {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<u128> for Wei {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for Wei {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Wei {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WeiRepr {
    Text(String),
    Number(u64),
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match WeiRepr::deserialize(deserializer)? {
            WeiRepr::Text(text) => Self::parse(&text).map_err(serde::de::Error::custom),
            WeiRepr::Number(number) => Ok(Self::from(number)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_is_zero() {
        assert_eq!(Wei::default(), Wei::zero());
        assert!(Wei::default().is_zero());
    }

    #[test]
    fn satoshi_conversion() {
        assert_eq!(Wei::from_satoshis(1), Wei::from(10_000_000_000u64));
        assert_eq!(Wei::from_satoshis(150).to_satoshis(), U256::from(150));
    }

    #[test]
    fn to_rbtc_formats_fraction() {
        assert_eq!(Wei::zero().to_rbtc(), "0");
        assert_eq!(Wei::parse("1000000000000000000").unwrap().to_rbtc(), "1");
        assert_eq!(Wei::parse("1500000000000000000").unwrap().to_rbtc(), "1.5");
        assert_eq!(Wei::from(1u64).to_rbtc(), "0.000000000000000001");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Wei::parse("abc").is_err());
        assert!(Wei::parse("-1").is_err());
        assert_eq!(Wei::parse(" 42 ").unwrap(), Wei::from(42u64));
    }

    #[test]
    fn sub_below_zero_underflows() {
        let result = Wei::from(5u64).safe_sub(Wei::from(6u64));
        assert_eq!(result, Err(ArithmeticError::Underflow));
        assert_eq!(Wei::from(5u64).saturating_sub(Wei::from(6u64)), Wei::zero());
    }

    #[test]
    fn checked_sum_adds_all() {
        let total = Wei::checked_sum([164u64, 134, 260].map(Wei::from)).unwrap();
        assert_eq!(total, Wei::from(558u64));
        assert_eq!(Wei::checked_sum(Vec::new()).unwrap(), Wei::zero());
    }

    #[test]
    fn serializes_as_decimal_string() {
        let json = serde_json::to_string(&Wei::from(1234u64)).unwrap();
        assert_eq!(json, "\"1234\"");
    }

    #[test]
    fn deserializes_from_string_or_number() {
        let from_text: Wei = serde_json::from_str("\"99999999999999999999999\"").unwrap();
        assert_eq!(from_text, Wei::parse("99999999999999999999999").unwrap());
        let from_number: Wei = serde_json::from_str("77").unwrap();
        assert_eq!(from_number, Wei::from(77u64));
        assert!(serde_json::from_str::<Wei>("\"-3\"").is_err());
    }

    proptest! {
        #[test]
        fn add_then_sub_is_identity(a in any::<u128>(), b in any::<u128>()) {
            let sum = Wei::from(a).safe_add(Wei::from(b)).unwrap();
            prop_assert_eq!(sum.safe_sub(Wei::from(b)).unwrap(), Wei::from(a));
        }

        #[test]
        fn display_parse_round_trip(a in any::<u128>()) {
            let wei = Wei::from(a);
            prop_assert_eq!(Wei::parse(&wei.to_string()).unwrap(), wei);
        }
    }
}
