//! # Recommended Pegin Use Case
//!
//! Finds the largest pegin a user can request with a given BTC balance.
//!
//! The network fee is the gas of the call to the destination plus the gas
//! of the product fee transfer, both at the current RSK gas price.

use crate::application::error::{ErrorKind, UseCaseError, UseCaseId, UseCaseResult};
use crate::application::use_cases::recommended_pegout::{
    check_minimum_lock, fee_schedule, invalid_amount, product_fee_gas,
};
use crate::domain::services::liquidity_provider::PeginLiquidityProvider;
use crate::domain::services::recommended::{RecommendedOperation, recommend};
use crate::domain::value_objects::Wei;
use crate::domain::value_objects::arithmetic::CheckedArithmetic;
use crate::infrastructure::blockchain::{
    Bridge, LiquidityBridgeContract, RSK_ZERO_ADDRESS, RootstockRpc, is_rsk_address,
};
use std::sync::Arc;

const ID: UseCaseId = UseCaseId::RecommendedPegin;

/// Use case for recommending pegin values.
#[derive(Debug)]
pub struct RecommendedPeginUseCase {
    provider: Arc<dyn PeginLiquidityProvider>,
    lbc: Arc<dyn LiquidityBridgeContract>,
    bridge: Arc<dyn Bridge>,
    rsk_rpc: Arc<dyn RootstockRpc>,
    fee_collector_address: String,
}

impl RecommendedPeginUseCase {
    /// Creates a new RecommendedPeginUseCase with all dependencies.
    #[must_use]
    pub fn new(
        provider: Arc<dyn PeginLiquidityProvider>,
        lbc: Arc<dyn LiquidityBridgeContract>,
        bridge: Arc<dyn Bridge>,
        rsk_rpc: Arc<dyn RootstockRpc>,
        fee_collector_address: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            lbc,
            bridge,
            rsk_rpc,
            fee_collector_address: fee_collector_address.into(),
        }
    }

    /// Executes the recommended pegin use case.
    ///
    /// A destination that is not an RSK address is estimated as a transfer
    /// to the zero address.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The fees exceed the balance ([`ErrorKind::InvalidInput`])
    /// - The value is out of the configured bounds
    /// - The LP lacks liquidity for it
    /// - It is below the bridge minimum lock value
    /// - A gas estimation fails
    pub async fn execute(
        &self,
        balance: Wei,
        destination: &str,
        data: &[u8],
    ) -> UseCaseResult<RecommendedOperation> {
        let destination = if is_rsk_address(destination) {
            destination
        } else {
            RSK_ZERO_ADDRESS
        };
        let config = self.provider.pegin_configuration();
        let fees =
            fee_schedule(ID, self.lbc.as_ref(), config.fixed_fee, config.fee_percentage).await?;

        let product_gas = product_fee_gas(
            ID,
            self.rsk_rpc.as_ref(),
            &self.fee_collector_address,
            balance,
            &fees,
        )
        .await?;
        let call_gas = self
            .rsk_rpc
            .estimate_gas(destination, balance, data)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        let gas_price = self
            .rsk_rpc
            .gas_price()
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        let network_fee = Wei::from(product_gas)
            .safe_add(Wei::from(call_gas))
            .and_then(|gas| gas.safe_mul(gas_price))
            .map_err(|e| invalid_amount(ID, e))?;

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
            .has_pegin_liquidity(value)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        if !has_liquidity {
            return Err(UseCaseError::new(ID, ErrorKind::NoLiquidity).with_required(value));
        }
        check_minimum_lock(ID, self.bridge.as_ref(), value).await?;

        tracing::debug!(%balance, %value, %network_fee, destination, "pegin value recommended");
        Ok(recommended)
    }
}
