//! # Call For User Use Case
//!
//! Advances the RBTC of a pegin once the user's BTC deposit is confirmed,
//! by having the liquidity bridge contract call the quote destination.
//!
//! This use case orchestrates:
//! - Confirmation and amount checks of the BTC deposit
//! - Topping up the LP's contract balance from the RSK wallet
//! - The `callForUser` transaction under the RSK wallet guard
//!
//! Missing confirmations, RPC errors and a short RSK wallet leave the record
//! untouched. A missing or expired quote and a short deposit mark it
//! [`PeginState::CallForUserFailed`].

use crate::application::error::{ErrorKind, UseCaseError, UseCaseId, UseCaseResult};
use crate::application::guard::{GuardedResource, LiquidityGuards};
use crate::application::outcome::{Failure, Outcome};
use crate::domain::entities::{PeginQuote, RetainedPeginQuote};
use crate::domain::events::{CallForUserCompleted, EventMetadata, QuoteEvent};
use crate::domain::services::liquidity_provider::PeginLiquidityProvider;
use crate::domain::value_objects::{PeginState, Wei};
use crate::infrastructure::blockchain::{
    BitcoinNetwork, LiquidityBridgeContract, RootstockRpc, TransactionConfig,
};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::persistence::PeginQuoteRepository;
use std::sync::Arc;

const ID: UseCaseId = UseCaseId::CallForUser;

/// Use case for executing pegin calls.
#[derive(Debug)]
pub struct CallForUserUseCase {
    pegin_repository: Arc<dyn PeginQuoteRepository>,
    lbc: Arc<dyn LiquidityBridgeContract>,
    btc_network: Arc<dyn BitcoinNetwork>,
    rsk_rpc: Arc<dyn RootstockRpc>,
    provider: Arc<dyn PeginLiquidityProvider>,
    event_bus: Arc<dyn EventBus>,
    guards: LiquidityGuards,
}

impl CallForUserUseCase {
    /// Creates a new CallForUserUseCase with all dependencies.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        pegin_repository: Arc<dyn PeginQuoteRepository>,
        lbc: Arc<dyn LiquidityBridgeContract>,
        btc_network: Arc<dyn BitcoinNetwork>,
        rsk_rpc: Arc<dyn RootstockRpc>,
        provider: Arc<dyn PeginLiquidityProvider>,
        event_bus: Arc<dyn EventBus>,
        guards: LiquidityGuards,
    ) -> Self {
        Self {
            pegin_repository,
            lbc,
            btc_network,
            rsk_rpc,
            provider,
            event_bus,
            guards,
        }
    }

    /// Executes the call for user use case.
    ///
    /// # Arguments
    ///
    /// * `bitcoin_tx` - Hash of the user's BTC deposit
    /// * `retained` - Record of the accepted quote
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The record is not waiting for a deposit or the tx hash is empty
    /// - The quote is missing or expired
    /// - The deposit lacks confirmations or is short
    /// - The LP cannot fund the call
    /// - The call or the update fails
    pub async fn execute(
        &self,
        bitcoin_tx: &str,
        retained: RetainedPeginQuote,
    ) -> UseCaseResult<()> {
        let quote_hash = retained.quote_hash.clone();
        if retained.state != PeginState::WaitingForDeposit {
            return Err(UseCaseError::new(ID, ErrorKind::WrongState)
                .with_quote_hash(quote_hash)
                .with_state(retained.state));
        }
        if bitcoin_tx.is_empty() {
            return Err(UseCaseError::new(ID, ErrorKind::InvalidInput)
                .caused_by("bitcoin transaction hash is empty")
                .with_quote_hash(quote_hash));
        }

        let quote = match self.pegin_repository.get_quote(&quote_hash).await {
            Ok(Some(quote)) => quote,
            Ok(None) => {
                let err = UseCaseError::new(ID, ErrorKind::NotFound).with_quote_hash(&quote_hash);
                return self.fail(retained, PeginQuote::default(), err).await;
            }
            Err(e) => {
                return Err(UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash));
            }
        };
        if quote.is_expired() {
            let err = UseCaseError::new(ID, ErrorKind::Expired).with_quote_hash(&quote_hash);
            return self.fail(retained, quote, err).await;
        }

        let mut retained = retained;
        let call = match self.validate_deposit(&mut retained, bitcoin_tx, &quote).await {
            Ok(()) => self.call(retained.clone(), bitcoin_tx, quote.clone()).await,
            Err(failure) => Err(failure),
        };

        match call {
            Ok(recorded) => recorded,
            Err(Failure::Retryable(err)) => {
                tracing::debug!(%quote_hash, error = %err, "call for user deferred");
                Err(err.with_quote_hash(quote_hash))
            }
            Err(Failure::Terminal(err)) => {
                self.fail(retained, quote, err.with_quote_hash(quote_hash))
                    .await
            }
        }
    }

    async fn validate_deposit(
        &self,
        retained: &mut RetainedPeginQuote,
        bitcoin_tx: &str,
        quote: &PeginQuote,
    ) -> Outcome<()> {
        let info = self
            .btc_network
            .get_transaction_info(bitcoin_tx)
            .await
            .map_err(|e| Failure::transient(ID, e))?;
        if info.confirmations < u64::from(quote.confirmations) {
            return Err(Failure::retryable(ID, ErrorKind::NoEnoughConfirmations));
        }

        let total = quote.total().map_err(|e| {
            Failure::Terminal(UseCaseError::new(ID, ErrorKind::InvalidInput).caused_by(e))
        })?;
        let sent = info.amount_to_address(&retained.deposit_address);
        if sent < total {
            retained.user_btc_tx_hash = bitcoin_tx.to_string();
            return Err(Failure::Terminal(
                UseCaseError::new(ID, ErrorKind::InsufficientAmount)
                    .with_amount(sent)
                    .with_required(total),
            ));
        }
        Ok(())
    }

    /// What the RSK wallet must add to the LP's contract balance to cover
    /// the quote value.
    async fn value_to_send(&self, quote: &PeginQuote) -> Outcome<Wei> {
        let lp_address = self.provider.rsk_address();
        let contract_balance = self
            .lbc
            .get_balance(&lp_address)
            .await
            .map_err(|e| Failure::transient(ID, e))?;
        if contract_balance >= quote.value {
            return Ok(Wei::zero());
        }

        let value_to_send = quote.value.saturating_sub(contract_balance);
        let wallet_balance = self
            .rsk_rpc
            .get_balance(&lp_address)
            .await
            .map_err(|e| Failure::transient(ID, e))?;
        if wallet_balance < value_to_send {
            return Err(Failure::Retryable(
                UseCaseError::new(ID, ErrorKind::NoLiquidity)
                    .with_amount(wallet_balance)
                    .with_required(value_to_send),
            ));
        }
        Ok(value_to_send)
    }

    /// Executes the call under the RSK wallet guard and records its outcome.
    async fn call(
        &self,
        mut retained: RetainedPeginQuote,
        bitcoin_tx: &str,
        quote: PeginQuote,
    ) -> Outcome<UseCaseResult<()>> {
        let _guard = self.guards.acquire(GuardedResource::RskWallet).await;
        let value_to_send = self.value_to_send(&quote).await?;

        let extra_gas = self.provider.pegin_configuration().call_for_user_extra_gas;
        let config =
            TransactionConfig::new(value_to_send, Some(quote.call_gas_limit(extra_gas)), None);
        let mut failure = match self.lbc.call_for_user(config, quote.clone()).await {
            Ok(tx_hash) => {
                tracing::info!(
                    quote_hash = %retained.quote_hash,
                    %tx_hash,
                    value_sent = %value_to_send,
                    "call for user executed"
                );
                retained.call_for_user_tx_hash = tx_hash.into();
                retained.state = PeginState::CallForUserSucceeded;
                None
            }
            Err(e) => {
                tracing::error!(quote_hash = %retained.quote_hash, error = %e, "call for user failed");
                retained.state = PeginState::CallForUserFailed;
                Some(UseCaseError::infrastructure(ID, e).with_quote_hash(&retained.quote_hash))
            }
        };
        retained.user_btc_tx_hash = bitcoin_tx.to_string();

        self.event_bus
            .publish(QuoteEvent::CallForUserCompleted(CallForUserCompleted {
                metadata: EventMetadata::new(),
                quote,
                retained_quote: retained.clone(),
                error: failure.as_ref().map(ToString::to_string),
            }));
        let quote_hash = retained.quote_hash.clone();
        if let Err(update_err) = self.pegin_repository.update_retained_quote(retained).await {
            failure
                .get_or_insert_with(|| {
                    UseCaseError::new(ID, ErrorKind::Infrastructure).with_quote_hash(&quote_hash)
                })
                .join(update_err);
        }
        Ok(failure.map_or(Ok(()), Err))
    }

    async fn fail(
        &self,
        mut retained: RetainedPeginQuote,
        quote: PeginQuote,
        mut err: UseCaseError,
    ) -> UseCaseResult<()> {
        tracing::warn!(quote_hash = %retained.quote_hash, error = %err, "call for user failed");
        retained.state = PeginState::CallForUserFailed;
        if let Err(update_err) = self
            .pegin_repository
            .update_retained_quote(retained.clone())
            .await
        {
            err.join(update_err);
        }
        self.event_bus
            .publish(QuoteEvent::CallForUserCompleted(CallForUserCompleted {
                metadata: EventMetadata::new(),
                quote,
                retained_quote: retained,
                error: Some(err.to_string()),
            }));
        Err(err)
    }
}
