//! # Bridge Pegout Use Case
//!
//! Sends the refunded RBTC of several pegouts to the bridge in one
//! transaction, for refunds that were too small to forward on their own.

use crate::application::error::{ErrorKind, UseCaseError, UseCaseId, UseCaseResult};
use crate::application::guard::{GuardedResource, LiquidityGuards};
use crate::domain::entities::{RetainedPegoutQuote, WatchedPegoutQuote};
use crate::domain::events::{BridgePegoutCompleted, EventMetadata, QuoteEvent};
use crate::domain::services::liquidity_provider::PegoutLiquidityProvider;
use crate::domain::value_objects::{PegoutState, Wei};
use crate::infrastructure::blockchain::{
    BRIDGE_CONVERSION_GAS_LIMIT, BRIDGE_CONVERSION_GAS_PRICE, Bridge, GasBudget, RootstockWallet,
    TransactionConfig,
};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::persistence::PegoutQuoteRepository;
use std::sync::Arc;

const ID: UseCaseId = UseCaseId::BridgePegout;

/// Use case for batching refunded pegouts into one bridge transaction.
#[derive(Debug)]
pub struct BridgePegoutUseCase {
    pegout_repository: Arc<dyn PegoutQuoteRepository>,
    provider: Arc<dyn PegoutLiquidityProvider>,
    rsk_wallet: Arc<dyn RootstockWallet>,
    bridge: Arc<dyn Bridge>,
    event_bus: Arc<dyn EventBus>,
    guards: LiquidityGuards,
}

impl BridgePegoutUseCase {
    /// Creates a new BridgePegoutUseCase with all dependencies.
    #[must_use]
    pub fn new(
        pegout_repository: Arc<dyn PegoutQuoteRepository>,
        provider: Arc<dyn PegoutLiquidityProvider>,
        rsk_wallet: Arc<dyn RootstockWallet>,
        bridge: Arc<dyn Bridge>,
        event_bus: Arc<dyn EventBus>,
        guards: LiquidityGuards,
    ) -> Self {
        Self {
            pegout_repository,
            provider,
            rsk_wallet,
            bridge,
            event_bus,
            guards,
        }
    }

    /// Executes the bridge pegout use case.
    ///
    /// Every quote must be in [`PegoutState::RefundPegOutSucceeded`]. The
    /// records are updated together and one [`BridgePegoutCompleted`] event
    /// covers all of them.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A quote is in another state
    /// - The total is below the bridge transaction minimum
    /// - The RSK wallet cannot cover the total plus gas
    /// - The transfer or the batch update fails
    pub async fn execute(&self, watched_quotes: Vec<WatchedPegoutQuote>) -> UseCaseResult<()> {
        if let Some(watched) = watched_quotes
            .iter()
            .find(|w| w.retained_quote.state != PegoutState::RefundPegOutSucceeded)
        {
            return Err(UseCaseError::new(ID, ErrorKind::WrongState)
                .with_quote_hash(watched.retained_quote.quote_hash.clone())
                .with_state(watched.retained_quote.state));
        }

        let amounts = watched_quotes
            .iter()
            .map(|w| w.pegout_quote.refundable_amount())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| UseCaseError::new(ID, ErrorKind::InvalidInput).caused_by(e))?;
        let total = Wei::checked_sum(amounts)
            .map_err(|e| UseCaseError::new(ID, ErrorKind::InvalidInput).caused_by(e))?;

        let minimum = self.provider.pegout_configuration().bridge_transaction_min;
        if total < minimum {
            return Err(UseCaseError::new(ID, ErrorKind::TxBelowMinimum)
                .with_amount(total)
                .with_required(minimum));
        }

        let _guard = self.guards.acquire(GuardedResource::RskWallet).await;

        let required = GasBudget::bridge_conversion()
            .required_balance(total)
            .map_err(|e| UseCaseError::new(ID, ErrorKind::InvalidInput).caused_by(e))?;
        let balance = self
            .rsk_wallet
            .get_balance()
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        if balance < required {
            return Err(UseCaseError::new(ID, ErrorKind::InsufficientAmount)
                .with_amount(balance)
                .with_required(required));
        }

        let config = TransactionConfig::new(
            total,
            Some(BRIDGE_CONVERSION_GAS_LIMIT),
            Some(Wei::from(BRIDGE_CONVERSION_GAS_PRICE)),
        );
        let sent = self.rsk_wallet.send_rbtc(config, &self.bridge.address()).await;

        let mut retained: Vec<RetainedPegoutQuote> = watched_quotes
            .into_iter()
            .map(|w| w.retained_quote)
            .collect();
        let (state, mut failure) = match &sent {
            Ok(_) => (PegoutState::BridgeTxSucceeded, None),
            Err(e) => {
                tracing::error!(error = %e, quotes = retained.len(), "bridge transfer failed");
                (
                    PegoutState::BridgeTxFailed,
                    Some(UseCaseError::infrastructure(ID, e)),
                )
            }
        };
        for quote in &mut retained {
            quote.state = state;
            if let Ok(receipt) = &sent {
                if !receipt.transaction_hash.is_empty() {
                    quote.bridge_refund_tx_hash = receipt.transaction_hash.to_string();
                    quote.bridge_refund_gas_used = receipt.gas_used;
                    quote.bridge_refund_gas_price = receipt.gas_price;
                }
            }
        }
        if let Ok(receipt) = &sent {
            tracing::info!(
                tx = %receipt.transaction_hash,
                %total,
                quotes = retained.len(),
                "refunds sent to bridge"
            );
        }

        if let Err(update_err) = self
            .pegout_repository
            .update_retained_quotes(retained.clone())
            .await
        {
            failure
                .get_or_insert_with(|| UseCaseError::new(ID, ErrorKind::Infrastructure))
                .join(update_err);
        }
        self.event_bus
            .publish(QuoteEvent::BridgePegoutCompleted(BridgePegoutCompleted {
                metadata: EventMetadata::new(),
                quotes: retained,
                error: failure.as_ref().map(ToString::to_string),
            }));
        failure.map_or(Ok(()), Err)
    }
}
