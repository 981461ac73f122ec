//! # Recommended Amounts
//!
//! Fixed-point algebra that finds the largest quote value a user can pay
//! for with a given balance once every fee is deducted.
//!
//! Percentages are carried as integers scaled by [`FEE_SCALE`], so
//! `1.5%` becomes `1_500_000`. Solving
//! `value + fixed + value * (call% + product%) + network = balance` gives
//!
//! ```text
//! value = scale * (balance - network - fixed) / (scale + call% + product%)
//! ```

use crate::domain::value_objects::arithmetic::{ArithmeticError, ArithmeticResult, CheckedArithmetic};
use crate::domain::value_objects::Wei;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Scale of fixed-point percentages.
pub const FEE_SCALE: u64 = 100_000_000;

/// Converts a percentage such as `1.5` into its scaled integer form.
///
/// # Errors
///
/// Returns `ArithmeticError::InvalidValue` for negative or oversized
/// percentages.
pub fn scaled_percentage(percentage: Decimal) -> ArithmeticResult<Wei> {
    let scaled = percentage
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|ratio| ratio.checked_mul(Decimal::from(FEE_SCALE)))
        .ok_or(ArithmeticError::Overflow)?;
    scaled
        .trunc()
        .to_u64()
        .map(Wei::from)
        .ok_or(ArithmeticError::InvalidValue("percentage must be non-negative"))
}

/// Returns `amount * scaled_percentage / scale`, truncated.
///
/// # Errors
///
/// Returns an arithmetic error on overflow.
pub fn apply_scaled_percentage(amount: Wei, scaled_percentage: Wei) -> ArithmeticResult<Wei> {
    amount
        .safe_mul(scaled_percentage)?
        .safe_div(Wei::from(FEE_SCALE))
}

/// Fees applied to a recommended value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeSchedule {
    /// Fixed part of the call fee.
    pub fixed_fee: Wei,
    /// Call fee percentage, scaled.
    pub scaled_call_fee: Wei,
    /// Product fee percentage, scaled.
    pub scaled_product_fee: Wei,
}

/// Outcome of a recommended-amount calculation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedOperation {
    /// Largest quote value payable with the balance.
    pub recommended_value: Wei,
    /// Network fee estimate used in the calculation.
    pub estimated_gas_fee: Wei,
    /// Call fee the quote would carry.
    pub estimated_call_fee: Wei,
    /// Product fee the quote would carry.
    pub estimated_product_fee: Wei,
}

/// Computes the recommended value for `balance`.
///
/// # Errors
///
/// Returns `ArithmeticError::Underflow` if the fees exceed the balance and
/// `ArithmeticError::Overflow` if an intermediate product overflows.
pub fn recommend(
    balance: Wei,
    network_fee: Wei,
    fees: FeeSchedule,
) -> ArithmeticResult<RecommendedOperation> {
    let scale = Wei::from(FEE_SCALE);
    let remaining = balance.safe_sub(network_fee)?.safe_sub(fees.fixed_fee)?;
    let denominator = Wei::checked_sum([scale, fees.scaled_call_fee, fees.scaled_product_fee])?;
    let value = scale.safe_mul(remaining)?.safe_div(denominator)?;
    if value.is_zero() {
        return Err(ArithmeticError::Underflow);
    }

    Ok(RecommendedOperation {
        recommended_value: value,
        estimated_gas_fee: network_fee,
        estimated_call_fee: fees
            .fixed_fee
            .safe_add(apply_scaled_percentage(value, fees.scaled_call_fee)?)?,
        estimated_product_fee: apply_scaled_percentage(value, fees.scaled_product_fee)?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    #[test]
    fn scales_percentages() {
        assert_eq!(
            scaled_percentage(Decimal::from_str("1.5").unwrap()).unwrap(),
            Wei::from(1_500_000u64)
        );
        assert_eq!(scaled_percentage(Decimal::ZERO).unwrap(), Wei::zero());
        assert!(scaled_percentage(Decimal::from(-1)).is_err());
    }

    #[test]
    fn without_percentages_only_fixed_fees_are_deducted() {
        let result = recommend(
            Wei::from(1_000u64),
            Wei::from(100u64),
            FeeSchedule {
                fixed_fee: Wei::from(50u64),
                ..FeeSchedule::default()
            },
        )
        .unwrap();
        assert_eq!(result.recommended_value, Wei::from(850u64));
        assert_eq!(result.estimated_call_fee, Wei::from(50u64));
        assert_eq!(result.estimated_product_fee, Wei::zero());
    }

    #[test]
    fn fees_above_balance_underflow() {
        let result = recommend(
            Wei::from(10u64),
            Wei::from(100u64),
            FeeSchedule::default(),
        );
        assert_eq!(result, Err(ArithmeticError::Underflow));
    }

    proptest! {
        #[test]
        fn recommendation_never_exceeds_balance(
            balance in 1_000_000u64..1_000_000_000_000u64,
            network in 0u64..1_000u64,
            fixed in 0u64..1_000u64,
            call in 0u64..5_000_000u64,
            product in 0u64..5_000_000u64,
        ) {
            let fees = FeeSchedule {
                fixed_fee: Wei::from(fixed),
                scaled_call_fee: Wei::from(call),
                scaled_product_fee: Wei::from(product),
            };
            let result = recommend(Wei::from(balance), Wei::from(network), fees).unwrap();
            let total = Wei::checked_sum([
                result.recommended_value,
                result.estimated_call_fee,
                result.estimated_product_fee,
                result.estimated_gas_fee,
            ]).unwrap();
            prop_assert!(total <= Wei::from(balance));
        }
    }
}
