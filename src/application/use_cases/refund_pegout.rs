//! # Refund Pegout Use Case
//!
//! Claims the user's RBTC deposit from the liquidity bridge contract once
//! the LP's BTC payment is confirmed, then forwards the refunded amount to
//! the bridge so the BTC comes back to the LP.
//!
//! The refund proves the payment with its raw transaction, the header hash
//! of its block and a merkle branch. A bridge that has not seen the payment
//! yet is a retryable condition; every other refund error marks the record
//! [`PegoutState::RefundPegOutFailed`].
//!
//! Once the refund is recorded the refundable amount is always forwarded to
//! the bridge, whatever the refund outcome. Errors of both steps are joined
//! into the returned error.

use crate::application::error::{ErrorKind, UseCaseError, UseCaseId, UseCaseResult};
use crate::application::guard::{GuardedResource, LiquidityGuards};
use crate::application::outcome::{Failure, Outcome};
use crate::domain::entities::{PegoutQuote, RetainedPegoutQuote};
use crate::domain::events::{BridgePegoutCompleted, EventMetadata, PegoutQuoteCompleted, QuoteEvent};
use crate::domain::value_objects::{PegoutState, QuoteHash, Wei};
use crate::infrastructure::blockchain::{
    BRIDGE_CONVERSION_GAS_LIMIT, BRIDGE_CONVERSION_GAS_PRICE, BitcoinNetwork, Bridge,
    LiquidityBridgeContract, REFUND_PEGOUT_GAS_LIMIT, RefundPegoutParams, RootstockWallet,
    TransactionConfig,
};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::persistence::PegoutQuoteRepository;
use std::sync::Arc;

const ID: UseCaseId = UseCaseId::RefundPegout;

/// Use case for claiming pegout deposits.
#[derive(Debug)]
pub struct RefundPegoutUseCase {
    pegout_repository: Arc<dyn PegoutQuoteRepository>,
    lbc: Arc<dyn LiquidityBridgeContract>,
    event_bus: Arc<dyn EventBus>,
    btc_network: Arc<dyn BitcoinNetwork>,
    rsk_wallet: Arc<dyn RootstockWallet>,
    bridge: Arc<dyn Bridge>,
    guards: LiquidityGuards,
}

impl RefundPegoutUseCase {
    /// Creates a new RefundPegoutUseCase with all dependencies.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        pegout_repository: Arc<dyn PegoutQuoteRepository>,
        lbc: Arc<dyn LiquidityBridgeContract>,
        event_bus: Arc<dyn EventBus>,
        btc_network: Arc<dyn BitcoinNetwork>,
        rsk_wallet: Arc<dyn RootstockWallet>,
        bridge: Arc<dyn Bridge>,
        guards: LiquidityGuards,
    ) -> Self {
        Self {
            pegout_repository,
            lbc,
            event_bus,
            btc_network,
            rsk_wallet,
            bridge,
            guards,
        }
    }

    /// Executes the refund pegout use case for a paid pegout.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The record is not in [`PegoutState::SendPegoutSucceeded`]
    /// - The BTC payment lacks confirmations or its proof cannot be built
    /// - The bridge has not seen the payment yet
    /// - The refund or the bridge transfer fails
    /// - The record cannot be persisted
    pub async fn execute(&self, retained: RetainedPegoutQuote) -> UseCaseResult<()> {
        let quote_hash = retained.quote_hash.clone();
        if retained.state != PegoutState::SendPegoutSucceeded {
            return Err(UseCaseError::new(ID, ErrorKind::WrongState)
                .with_quote_hash(quote_hash)
                .with_state(retained.state));
        }

        let quote = match self.pegout_repository.get_quote(&quote_hash).await {
            Ok(Some(quote)) => quote,
            Ok(None) => {
                let err = UseCaseError::new(ID, ErrorKind::NotFound).with_quote_hash(&quote_hash);
                return self.fail(retained, err).await;
            }
            Err(e) => {
                return Err(UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash));
            }
        };

        match self.refund(retained.clone(), &quote).await {
            Ok(recorded) => recorded,
            Err(Failure::Retryable(err)) => {
                tracing::debug!(%quote_hash, error = %err, "pegout refund deferred");
                Err(err.with_quote_hash(quote_hash))
            }
            Err(Failure::Terminal(err)) => {
                self.fail(retained, err.with_quote_hash(quote_hash)).await
            }
        }
    }

    /// Builds the payment proof.
    async fn refund_params(
        &self,
        retained: &RetainedPegoutQuote,
        quote: &PegoutQuote,
    ) -> Outcome<RefundPegoutParams> {
        let tx_hash = retained.lp_btc_tx_hash.as_str();
        let info = self
            .btc_network
            .get_transaction_info(tx_hash)
            .await
            .map_err(|e| Failure::transient(ID, e))?;
        if info.confirmations < u64::from(quote.transfer_confirmations) {
            return Err(Failure::retryable(ID, ErrorKind::NoEnoughConfirmations));
        }

        let (merkle_branch, block, raw_tx) = futures::try_join!(
            self.btc_network.build_merkle_branch(tx_hash),
            self.btc_network.get_transaction_block_info(tx_hash),
            self.btc_network.get_raw_transaction(tx_hash),
        )
        .map_err(|e| Failure::transient(ID, e))?;

        let quote_hash = QuoteHash::parse(retained.quote_hash.as_str())
            .and_then(|hash| hash.to_bytes())
            .map_err(|e| {
                Failure::Terminal(UseCaseError::new(ID, ErrorKind::InvalidInput).caused_by(e))
            })?;

        Ok(RefundPegoutParams {
            quote_hash,
            btc_raw_tx: raw_tx,
            btc_block_header_hash: block.hash,
            merkle_branch_path: merkle_branch.path,
            merkle_branch_hashes: merkle_branch.hashes,
        })
    }

    /// Claims the deposit and forwards the refundable amount to the bridge,
    /// both under the RSK wallet guard.
    ///
    /// Once the refund is attempted its outcome is recorded and returned as
    /// the inner result, joined with any forwarding error.
    async fn refund(
        &self,
        mut retained: RetainedPegoutQuote,
        quote: &PegoutQuote,
    ) -> Outcome<UseCaseResult<()>> {
        let params = self.refund_params(&retained, quote).await?;

        let _guard = self.guards.acquire(GuardedResource::RskWallet).await;
        let config = TransactionConfig::new(Wei::zero(), Some(REFUND_PEGOUT_GAS_LIMIT), None);
        let mut failure = match self.lbc.refund_pegout(config, params).await {
            Ok(tx_hash) => {
                tracing::info!(quote_hash = %retained.quote_hash, %tx_hash, "pegout refunded");
                retained.refund_pegout_tx_hash = tx_hash.into();
                retained.state = PegoutState::RefundPegOutSucceeded;
                None
            }
            Err(e) if e.is_waiting_for_bridge() => {
                return Err(Failure::transient(ID, e));
            }
            Err(e) => {
                tracing::error!(quote_hash = %retained.quote_hash, error = %e, "pegout refund failed");
                retained.state = PegoutState::RefundPegOutFailed;
                Some(UseCaseError::infrastructure(ID, e).with_quote_hash(&retained.quote_hash))
            }
        };

        self.event_bus
            .publish(QuoteEvent::PegoutQuoteCompleted(PegoutQuoteCompleted {
                metadata: EventMetadata::new(),
                retained_quote: retained.clone(),
                error: failure.as_ref().map(ToString::to_string),
            }));
        if let Err(update_err) = self
            .pegout_repository
            .update_retained_quote(retained.clone())
            .await
        {
            failure
                .get_or_insert_with(|| {
                    UseCaseError::new(ID, ErrorKind::Infrastructure)
                        .with_quote_hash(&retained.quote_hash)
                })
                .join(update_err);
        }

        if let Err(forward_err) = self.forward_to_bridge(retained, quote).await {
            failure = Some(match failure {
                Some(mut err) => {
                    err.join(forward_err);
                    err
                }
                None => forward_err,
            });
        }
        Ok(failure.map_or(Ok(()), Err))
    }

    /// Sends `value + callFee + gasFee` of the quote to the bridge.
    ///
    /// The record only moves to a bridge state when its refund succeeded; a
    /// failed refund keeps [`PegoutState::RefundPegOutFailed`] but still
    /// records the transfer receipt. Must be called with the RSK wallet
    /// guard held.
    async fn forward_to_bridge(
        &self,
        mut retained: RetainedPegoutQuote,
        quote: &PegoutQuote,
    ) -> UseCaseResult<()> {
        let quote_hash = retained.quote_hash.clone();
        let refunded = retained.state == PegoutState::RefundPegOutSucceeded;
        let amount = quote.refundable_amount().map_err(|e| {
            UseCaseError::new(ID, ErrorKind::InvalidInput)
                .caused_by(e)
                .with_quote_hash(&quote_hash)
        })?;

        let config = TransactionConfig::new(
            amount,
            Some(BRIDGE_CONVERSION_GAS_LIMIT),
            Some(Wei::from(BRIDGE_CONVERSION_GAS_PRICE)),
        );
        let mut failure = match self.rsk_wallet.send_rbtc(config, &self.bridge.address()).await {
            Ok(receipt) => {
                retained.bridge_refund_tx_hash = receipt.transaction_hash.into();
                retained.bridge_refund_gas_used = receipt.gas_used;
                retained.bridge_refund_gas_price = receipt.gas_price;
                if refunded {
                    retained.state = PegoutState::BridgeTxSucceeded;
                }
                tracing::info!(%quote_hash, %amount, tx = %retained.bridge_refund_tx_hash, "refund forwarded to bridge");
                None
            }
            Err(e) => {
                tracing::error!(%quote_hash, error = %e, "bridge transfer failed");
                if refunded {
                    retained.state = PegoutState::BridgeTxFailed;
                }
                Some(UseCaseError::infrastructure(ID, e).with_quote_hash(&quote_hash))
            }
        };

        if let Err(update_err) = self
            .pegout_repository
            .update_retained_quote(retained.clone())
            .await
        {
            failure
                .get_or_insert_with(|| {
                    UseCaseError::new(ID, ErrorKind::Infrastructure).with_quote_hash(&quote_hash)
                })
                .join(update_err);
        }
        self.event_bus
            .publish(QuoteEvent::BridgePegoutCompleted(BridgePegoutCompleted {
                metadata: EventMetadata::new(),
                quotes: vec![retained],
                error: failure.as_ref().map(ToString::to_string),
            }));
        failure.map_or(Ok(()), Err)
    }

    async fn fail(
        &self,
        mut retained: RetainedPegoutQuote,
        mut err: UseCaseError,
    ) -> UseCaseResult<()> {
        tracing::warn!(quote_hash = %retained.quote_hash, error = %err, "pegout refund failed");
        retained.state = PegoutState::RefundPegOutFailed;
        if let Err(update_err) = self
            .pegout_repository
            .update_retained_quote(retained.clone())
            .await
        {
            err.join(update_err);
        }
        self.event_bus
            .publish(QuoteEvent::PegoutQuoteCompleted(PegoutQuoteCompleted {
                metadata: EventMetadata::new(),
                retained_quote: retained,
                error: Some(err.to_string()),
            }));
        Err(err)
    }
}
