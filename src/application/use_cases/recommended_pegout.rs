//! # Recommended Pegout Use Case
//!
//! Finds the largest pegout a user can request with a given RBTC balance.
//!
//! The network fee is the BTC transaction fee of the payout plus the gas of
//! the product fee transfer to the fee collector. The recommended value is
//! then checked with the same amount, liquidity and bridge minimum checks
//! an ordinary quote goes through.

use crate::application::error::{ErrorKind, UseCaseError, UseCaseId, UseCaseResult};
use crate::domain::services::liquidity_provider::PegoutLiquidityProvider;
use crate::domain::services::recommended::{
    FeeSchedule, RecommendedOperation, apply_scaled_percentage, recommend, scaled_percentage,
};
use crate::domain::value_objects::Wei;
use crate::domain::value_objects::arithmetic::{ArithmeticError, CheckedArithmetic};
use crate::infrastructure::blockchain::{
    BitcoinNetwork, BitcoinWallet, Bridge, BtcAddressType, LiquidityBridgeContract, RootstockRpc,
};
use rust_decimal::Decimal;
use std::sync::Arc;

const ID: UseCaseId = UseCaseId::RecommendedPegout;

pub(crate) fn invalid_amount(use_case: UseCaseId, err: ArithmeticError) -> UseCaseError {
    UseCaseError::new(use_case, ErrorKind::InvalidInput).caused_by(err)
}

/// Reads the product fee from the contract and builds the fee schedule.
pub(crate) async fn fee_schedule(
    use_case: UseCaseId,
    lbc: &dyn LiquidityBridgeContract,
    fixed_fee: Wei,
    fee_percentage: Decimal,
) -> UseCaseResult<FeeSchedule> {
    let scaled_product_fee = lbc
        .product_fee_percentage()
        .await
        .map_err(|e| UseCaseError::infrastructure(use_case, e))?;
    Ok(FeeSchedule {
        fixed_fee,
        scaled_call_fee: scaled_percentage(fee_percentage)
            .map_err(|e| invalid_amount(use_case, e))?,
        scaled_product_fee: Wei::from(scaled_product_fee),
    })
}

/// Gas units of sending the product fee of `balance` to the fee collector.
pub(crate) async fn product_fee_gas(
    use_case: UseCaseId,
    rsk_rpc: &dyn RootstockRpc,
    fee_collector_address: &str,
    balance: Wei,
    fees: &FeeSchedule,
) -> UseCaseResult<u64> {
    let product_fee = apply_scaled_percentage(balance, fees.scaled_product_fee)
        .map_err(|e| invalid_amount(use_case, e))?;
    rsk_rpc
        .estimate_gas(fee_collector_address, product_fee, &[])
        .await
        .map_err(|e| UseCaseError::infrastructure(use_case, e))
}

/// Fails with [`ErrorKind::TxBelowMinimum`] below the bridge minimum lock
/// value.
pub(crate) async fn check_minimum_lock(
    use_case: UseCaseId,
    bridge: &dyn Bridge,
    value: Wei,
) -> UseCaseResult<()> {
    let minimum = bridge
        .get_minimum_lock_tx_value()
        .await
        .map_err(|e| UseCaseError::infrastructure(use_case, e))?;
    if value < minimum {
        return Err(UseCaseError::new(use_case, ErrorKind::TxBelowMinimum)
            .with_amount(value)
            .with_required(minimum));
    }
    Ok(())
}

/// Use case for recommending pegout values.
#[derive(Debug)]
pub struct RecommendedPegoutUseCase {
    provider: Arc<dyn PegoutLiquidityProvider>,
    lbc: Arc<dyn LiquidityBridgeContract>,
    bridge: Arc<dyn Bridge>,
    rsk_rpc: Arc<dyn RootstockRpc>,
    btc_network: Arc<dyn BitcoinNetwork>,
    btc_wallet: Arc<dyn BitcoinWallet>,
    fee_collector_address: String,
}

impl RecommendedPegoutUseCase {
    /// Creates a new RecommendedPegoutUseCase with all dependencies.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        provider: Arc<dyn PegoutLiquidityProvider>,
        lbc: Arc<dyn LiquidityBridgeContract>,
        bridge: Arc<dyn Bridge>,
        rsk_rpc: Arc<dyn RootstockRpc>,
        btc_network: Arc<dyn BitcoinNetwork>,
        btc_wallet: Arc<dyn BitcoinWallet>,
        fee_collector_address: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            lbc,
            bridge,
            rsk_rpc,
            btc_network,
            btc_wallet,
            fee_collector_address: fee_collector_address.into(),
        }
    }

    /// Executes the recommended pegout use case.
    ///
    /// # Arguments
    ///
    /// * `balance` - What the user is willing to spend, fees included
    /// * `address_type` - Type of the BTC payout address, P2PKH if `None`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The fees exceed the balance ([`ErrorKind::InvalidInput`])
    /// - The value is out of the configured bounds
    /// - The LP lacks liquidity for it
    /// - It is below the bridge minimum lock value
    /// - A fee estimation fails
    pub async fn execute(
        &self,
        balance: Wei,
        address_type: Option<BtcAddressType>,
    ) -> UseCaseResult<RecommendedOperation> {
        let address_type = address_type.unwrap_or_default();
        let config = self.provider.pegout_configuration();
        let fees =
            fee_schedule(ID, self.lbc.as_ref(), config.fixed_fee, config.fee_percentage).await?;

        let network_fee = self.network_fee(balance, address_type, &fees).await?;
        let recommended = recommend(balance, network_fee, fees).map_err(|e| {
            UseCaseError::new(ID, ErrorKind::InvalidInput)
                .caused_by(e)
                .with_amount(balance)
        })?;
        let value = recommended.recommended_value;

        config.validate_amount(value).map_err(|e| {
            UseCaseError::new(ID, ErrorKind::ValidationFailed)
                .caused_by(e)
                .with_amount(value)
        })?;
        let has_liquidity = self
            .provider
            .has_pegout_liquidity(value)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        if !has_liquidity {
            return Err(UseCaseError::new(ID, ErrorKind::NoLiquidity).with_required(value));
        }
        check_minimum_lock(ID, self.bridge.as_ref(), value).await?;

        tracing::debug!(%balance, %value, %network_fee, "pegout value recommended");
        Ok(recommended)
    }

    async fn network_fee(
        &self,
        balance: Wei,
        address_type: BtcAddressType,
        fees: &FeeSchedule,
    ) -> UseCaseResult<Wei> {
        let gas = product_fee_gas(
            ID,
            self.rsk_rpc.as_ref(),
            &self.fee_collector_address,
            balance,
            fees,
        )
        .await?;
        let gas_price = self
            .rsk_rpc
            .gas_price()
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        let product_fee_gas = Wei::from(gas)
            .safe_mul(gas_price)
            .map_err(|e| invalid_amount(ID, e))?;

        let zero_address = self
            .btc_network
            .get_zero_address(address_type)
            .map_err(|e| UseCaseError::new(ID, ErrorKind::InvalidInput).caused_by(e))?;
        let btc_fee = self
            .btc_wallet
            .estimate_tx_fees(&zero_address, balance)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;

        btc_fee
            .safe_add(product_fee_gas)
            .map_err(|e| invalid_amount(ID, e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::use_cases::tests::Harness;
    use crate::domain::services::liquidity_provider::PegoutConfiguration;

    const FEE_COLLECTOR: &str = "0x86b6534687a176a476c16083a373fb9fe4f1e5e6";

    fn use_case(h: &Harness) -> RecommendedPegoutUseCase {
        RecommendedPegoutUseCase::new(
            h.provider.clone(),
            h.lbc.clone(),
            h.bridge.clone(),
            h.rsk_rpc.clone(),
            h.btc_network.clone(),
            h.btc_wallet.clone(),
            FEE_COLLECTOR,
        )
    }

    /// 1% call fee plus 100 fixed, 0.5% product fee, a 1000 BTC fee and 50
    /// gas at price 2 for the product fee transfer.
    fn priced() -> Harness {
        let h = Harness::new();
        h.provider.set_pegout_configuration(PegoutConfiguration {
            fixed_fee: Wei::from(100u64),
            fee_percentage: Decimal::ONE,
            ..h.provider.pegout_configuration()
        });
        h.lbc.set_product_fee(500_000);
        h.btc_wallet.set_fee_estimate(Wei::from(1_000u64));
        h.rsk_rpc.set_gas_estimate(50);
        h.rsk_rpc.set_gas_price(Wei::from(2u64));
        h
    }

    #[tokio::test]
    async fn recommends_largest_payable_value() {
        let h = priced();

        let result = use_case(&h)
            .execute(Wei::from(1_000_000u64), None)
            .await
            .unwrap();

        assert_eq!(result.recommended_value, Wei::from(984_039u64));
        assert_eq!(result.estimated_gas_fee, Wei::from(1_100u64));
        assert_eq!(result.estimated_call_fee, Wei::from(9_940u64));
        assert_eq!(result.estimated_product_fee, Wei::from(4_920u64));

        assert_eq!(
            h.btc_wallet.estimates(),
            vec![("zero-p2pkh".to_string(), Wei::from(1_000_000u64))]
        );
        assert_eq!(
            h.rsk_rpc.estimates(),
            vec![(FEE_COLLECTOR.to_string(), Wei::from(5_000u64))]
        );
        assert_eq!(h.provider.checked(), vec![Wei::from(984_039u64)]);
    }

    #[tokio::test]
    async fn uses_requested_address_type() {
        let h = priced();

        use_case(&h)
            .execute(Wei::from(1_000_000u64), Some(BtcAddressType::P2wpkh))
            .await
            .unwrap();

        assert_eq!(h.btc_wallet.estimates()[0].0, "zero-p2wpkh");
    }

    #[tokio::test]
    async fn fees_above_balance_are_invalid() {
        let h = priced();

        let err = use_case(&h)
            .execute(Wei::from(1_000u64), None)
            .await
            .unwrap_err();

        assert!(err.is(ErrorKind::InvalidInput));
        assert!(h.provider.checked().is_empty());
    }

    #[tokio::test]
    async fn value_above_maximum_fails_validation() {
        let h = priced();
        h.provider.set_pegout_configuration(PegoutConfiguration {
            max_value: Wei::from(900_000u64),
            ..h.provider.pegout_configuration()
        });

        let err = use_case(&h)
            .execute(Wei::from(1_000_000u64), None)
            .await
            .unwrap_err();

        assert!(err.is(ErrorKind::ValidationFailed));
    }

    #[tokio::test]
    async fn value_without_liquidity_is_rejected() {
        let h = priced();
        h.provider.set_has_liquidity(false);

        let err = use_case(&h)
            .execute(Wei::from(1_000_000u64), None)
            .await
            .unwrap_err();

        assert!(err.is(ErrorKind::NoLiquidity));
    }

    #[tokio::test]
    async fn value_below_bridge_minimum_is_rejected() {
        let h = priced();
        h.bridge.set_minimum_lock(Wei::from(984_040u64));

        let err = use_case(&h)
            .execute(Wei::from(1_000_000u64), None)
            .await
            .unwrap_err();

        assert!(err.is(ErrorKind::TxBelowMinimum));
        assert_eq!(err.context().amount, Some(Wei::from(984_039u64)));
    }

    #[tokio::test]
    async fn estimation_failure_is_infrastructure() {
        let h = priced();
        h.btc_wallet.set_fail_estimate(true);

        let err = use_case(&h)
            .execute(Wei::from(1_000_000u64), None)
            .await
            .unwrap_err();

        assert!(err.is(ErrorKind::Infrastructure));
    }
}
