//! # Register Pegin Use Case
//!
//! Registers the user's BTC deposit of a called pegin with the bridge
//! through the liquidity bridge contract, which pays the LP back.
//!
//! The registration proves the deposit with its raw transaction, a partial
//! merkle tree and the height of its block. Until the bridge sees enough
//! confirmations the contract answers "waiting for bridge" and the record
//! is left untouched for a later retry.

use crate::application::error::{ErrorKind, UseCaseError, UseCaseId, UseCaseResult};
use crate::application::guard::{GuardedResource, LiquidityGuards};
use crate::application::outcome::{Failure, Outcome};
use crate::domain::entities::{PeginQuote, RetainedPeginQuote};
use crate::domain::events::{EventMetadata, QuoteEvent, RegisterPeginCompleted};
use crate::domain::value_objects::PeginState;
use crate::infrastructure::blockchain::{
    BitcoinNetwork, Bridge, LiquidityBridgeContract, RegisterPeginParams,
};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::persistence::PeginQuoteRepository;
use ethers::utils::hex;
use std::sync::Arc;

const ID: UseCaseId = UseCaseId::RegisterPegin;

/// Use case for registering pegins.
#[derive(Debug)]
pub struct RegisterPeginUseCase {
    pegin_repository: Arc<dyn PeginQuoteRepository>,
    lbc: Arc<dyn LiquidityBridgeContract>,
    bridge: Arc<dyn Bridge>,
    btc_network: Arc<dyn BitcoinNetwork>,
    event_bus: Arc<dyn EventBus>,
    guards: LiquidityGuards,
}

impl RegisterPeginUseCase {
    /// Creates a new RegisterPeginUseCase with all dependencies.
    #[must_use]
    pub fn new(
        pegin_repository: Arc<dyn PeginQuoteRepository>,
        lbc: Arc<dyn LiquidityBridgeContract>,
        bridge: Arc<dyn Bridge>,
        btc_network: Arc<dyn BitcoinNetwork>,
        event_bus: Arc<dyn EventBus>,
        guards: LiquidityGuards,
    ) -> Self {
        Self {
            pegin_repository,
            lbc,
            bridge,
            btc_network,
            event_bus,
            guards,
        }
    }

    /// Executes the register pegin use case for a called pegin.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The record is not in [`PeginState::CallForUserSucceeded`]
    /// - The quote is missing
    /// - The deposit lacks bridge confirmations or its proof cannot be built
    /// - The bridge has not seen the deposit yet
    /// - The registration or the update fails
    pub async fn execute(&self, retained: RetainedPeginQuote) -> UseCaseResult<()> {
        let quote_hash = retained.quote_hash.clone();
        if retained.state != PeginState::CallForUserSucceeded {
            return Err(UseCaseError::new(ID, ErrorKind::WrongState)
                .with_quote_hash(quote_hash)
                .with_state(retained.state));
        }

        let quote = match self.pegin_repository.get_quote(&quote_hash).await {
            Ok(Some(quote)) => quote,
            Ok(None) => {
                let err = UseCaseError::new(ID, ErrorKind::NotFound).with_quote_hash(&quote_hash);
                return self.fail(retained, err).await;
            }
            Err(e) => {
                return Err(UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash));
            }
        };

        match self.register(retained.clone(), quote).await {
            Ok(recorded) => recorded,
            Err(Failure::Retryable(err)) => {
                tracing::debug!(%quote_hash, error = %err, "pegin registration deferred");
                Err(err.with_quote_hash(quote_hash))
            }
            Err(Failure::Terminal(err)) => {
                self.fail(retained, err.with_quote_hash(quote_hash)).await
            }
        }
    }

    async fn register_params(
        &self,
        retained: &RetainedPeginQuote,
        quote: PeginQuote,
    ) -> Outcome<RegisterPeginParams> {
        let tx_hash = retained.user_btc_tx_hash.as_str();
        let info = self
            .btc_network
            .get_transaction_info(tx_hash)
            .await
            .map_err(|e| Failure::transient(ID, e))?;
        let required = self.bridge.required_tx_confirmations();
        if info.confirmations < required {
            return Err(Failure::retryable(ID, ErrorKind::NoEnoughConfirmations));
        }

        let quote_signature = hex::decode(retained.signature.trim_start_matches("0x")).map_err(|e| {
            Failure::Retryable(UseCaseError::new(ID, ErrorKind::InvalidInput).caused_by(e))
        })?;
        let (raw_tx, pmt, block) = futures::try_join!(
            self.btc_network.get_raw_transaction(tx_hash),
            self.btc_network.get_partial_merkle_tree(tx_hash),
            self.btc_network.get_transaction_block_info(tx_hash),
        )
        .map_err(|e| Failure::transient(ID, e))?;

        Ok(RegisterPeginParams {
            quote_signature,
            bitcoin_raw_transaction: raw_tx,
            partial_merkle_tree: pmt,
            block_height: block.height,
            quote,
        })
    }

    /// Registers the deposit under the RSK wallet guard and records the
    /// outcome.
    async fn register(
        &self,
        mut retained: RetainedPeginQuote,
        quote: PeginQuote,
    ) -> Outcome<UseCaseResult<()>> {
        let params = self.register_params(&retained, quote).await?;

        let _guard = self.guards.acquire(GuardedResource::RskWallet).await;
        let mut failure = match self.lbc.register_pegin(params).await {
            Ok(tx_hash) => {
                tracing::info!(quote_hash = %retained.quote_hash, %tx_hash, "pegin registered");
                retained.register_pegin_tx_hash = tx_hash.into();
                retained.state = PeginState::RegisterPegInSucceeded;
                None
            }
            Err(e) if e.is_waiting_for_bridge() => {
                return Err(Failure::transient(ID, e));
            }
            Err(e) => {
                tracing::error!(quote_hash = %retained.quote_hash, error = %e, "pegin registration failed");
                retained.state = PeginState::RegisterPegInFailed;
                Some(UseCaseError::infrastructure(ID, e).with_quote_hash(&retained.quote_hash))
            }
        };

        self.event_bus
            .publish(QuoteEvent::RegisterPeginCompleted(RegisterPeginCompleted {
                metadata: EventMetadata::new(),
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
        mut err: UseCaseError,
    ) -> UseCaseResult<()> {
        tracing::warn!(quote_hash = %retained.quote_hash, error = %err, "pegin registration failed");
        retained.state = PeginState::RegisterPegInFailed;
        if let Err(update_err) = self
            .pegin_repository
            .update_retained_quote(retained.clone())
            .await
        {
            err.join(update_err);
        }
        self.event_bus
            .publish(QuoteEvent::RegisterPeginCompleted(RegisterPeginCompleted {
                metadata: EventMetadata::new(),
                retained_quote: retained,
                error: Some(err.to_string()),
            }));
        Err(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::application::use_cases::tests::Harness;
    use crate::domain::entities::fixtures;
    use crate::infrastructure::blockchain::BlockchainError;

    const USER_TX: &str = "3f1c0a0b2e6f4f3b8a3d1c5e7f9a2b4c6d8e0f1a3b5c7d9e1f2a4b6c8d0e2f4b";

    fn use_case(h: &Harness) -> RegisterPeginUseCase {
        RegisterPeginUseCase::new(
            h.pegin_repository.clone(),
            h.lbc.clone(),
            h.bridge.clone(),
            h.btc_network.clone(),
            h.event_bus.clone(),
            h.guards.clone(),
        )
    }

    /// A called pegin whose deposit has `confirmations` of the 6 the bridge
    /// requires.
    async fn called(confirmations: u64) -> (Harness, RetainedPeginQuote) {
        let h = Harness::new();
        let mut retained =
            fixtures::retained_pegin(&fixtures::quote_hash(8), PeginState::CallForUserSucceeded);
        retained.signature = "0xabcdef".to_string();
        retained.user_btc_tx_hash = USER_TX.to_string();
        h.pegin_repository
            .seed(fixtures::pegin_quote(1_000, 10, 5), retained.clone())
            .await;
        h.bridge.set_confirmations(6);
        h.btc_network.add_transaction(USER_TX, confirmations, &[]);
        (h, retained)
    }

    #[tokio::test]
    async fn registers_the_deposit() {
        let (h, retained) = called(6).await;

        use_case(&h).execute(retained.clone()).await.unwrap();

        let registrations = h.lbc.registrations();
        assert_eq!(registrations.len(), 1);
        assert_eq!(registrations[0].quote_signature, vec![0xab, 0xcd, 0xef]);
        assert_eq!(registrations[0].bitcoin_raw_transaction, vec![2, 0, 0, 0]);
        assert_eq!(registrations[0].partial_merkle_tree, vec![1, 15]);
        assert_eq!(registrations[0].block_height, 820_000);

        let stored = h.pegin_repository.stored(&retained.quote_hash).await.unwrap();
        assert_eq!(stored.state, PeginState::RegisterPegInSucceeded);
        assert_eq!(stored.register_pegin_tx_hash, "0xregister");
        match h.event_bus.last() {
            QuoteEvent::RegisterPeginCompleted(event) => assert!(event.error.is_none()),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn bridge_confirmations_are_required() {
        let (h, retained) = called(5).await;

        let err = use_case(&h).execute(retained).await.unwrap_err();

        assert!(err.is(ErrorKind::NoEnoughConfirmations));
        assert!(h.lbc.registrations().is_empty());
        assert_eq!(h.pegin_repository.update_count(), 0);
    }

    #[tokio::test]
    async fn waiting_for_bridge_leaves_no_trace() {
        let (h, retained) = called(6).await;
        h.lbc
            .set_register_error(Some(BlockchainError::waiting_for_bridge("not yet")));

        let err = use_case(&h).execute(retained).await.unwrap_err();

        assert!(err.is(ErrorKind::Infrastructure));
        assert_eq!(h.pegin_repository.update_count(), 0);
        assert_eq!(h.event_bus.publish_count(), 0);
    }

    #[tokio::test]
    async fn proof_failure_is_retried() {
        let (h, retained) = called(6).await;
        h.btc_network.set_fail_pmt(true);

        let err = use_case(&h).execute(retained).await.unwrap_err();

        assert!(err.is(ErrorKind::Infrastructure));
        assert_eq!(h.pegin_repository.update_count(), 0);
        assert_eq!(h.event_bus.publish_count(), 0);
    }

    #[tokio::test]
    async fn reverted_registration_fails_the_quote() {
        let (h, retained) = called(6).await;
        h.lbc
            .set_register_error(Some(BlockchainError::reverted("already registered")));

        let err = use_case(&h).execute(retained.clone()).await.unwrap_err();

        assert!(err.is(ErrorKind::Infrastructure));
        let stored = h.pegin_repository.stored(&retained.quote_hash).await.unwrap();
        assert_eq!(stored.state, PeginState::RegisterPegInFailed);
        assert!(h.event_bus.last().error().is_some());
    }

    #[tokio::test]
    async fn wrong_state_writes_nothing() {
        let (h, mut retained) = called(6).await;
        retained.state = PeginState::WaitingForDeposit;

        let err = use_case(&h).execute(retained).await.unwrap_err();

        assert!(err.is(ErrorKind::WrongState));
        assert_eq!(h.event_bus.publish_count(), 0);
    }

    #[tokio::test]
    async fn missing_quote_fails_the_record() {
        let h = Harness::new();
        let retained =
            fixtures::retained_pegin(&fixtures::quote_hash(9), PeginState::CallForUserSucceeded);

        let err = use_case(&h).execute(retained).await.unwrap_err();

        assert!(err.is(ErrorKind::NotFound));
        assert_eq!(h.event_bus.publish_count(), 1);
        assert!(h.event_bus.last().error().is_some());
    }
}
