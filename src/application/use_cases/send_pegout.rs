//! # Send Pegout Use Case
//!
//! Pays the BTC of a pegout once the user deposit is confirmed.
//!
//! This use case orchestrates:
//! - Deposit confirmation and validation against the quote
//! - Expiry and double-spend checks on the contract
//! - The BTC payment, tagged with the quote hash in an `OP_RETURN` output
//!
//! Transient failures (missing confirmations, RPC errors, a short BTC
//! balance) leave the record untouched so the watcher retries. Any other
//! failure marks the record [`PegoutState::SendPegoutFailed`].

use crate::application::error::{ErrorKind, UseCaseError, UseCaseId, UseCaseResult};
use crate::application::guard::{GuardedResource, LiquidityGuards};
use crate::application::outcome::{Failure, Outcome};
use crate::domain::entities::{PegoutQuote, RetainedPegoutQuote};
use crate::domain::events::{EventMetadata, PegoutBtcSent, QuoteEvent};
use crate::domain::value_objects::{CheckedArithmetic, PegoutState, QuoteHash};
use crate::infrastructure::blockchain::{BitcoinWallet, LiquidityBridgeContract, RootstockRpc};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::persistence::PegoutQuoteRepository;
use std::sync::Arc;

const ID: UseCaseId = UseCaseId::SendPegout;

fn same_hash(a: &str, b: &str) -> bool {
    a.trim_start_matches("0x")
        .eq_ignore_ascii_case(b.trim_start_matches("0x"))
}

/// Use case for paying pegouts.
#[derive(Debug)]
pub struct SendPegoutUseCase {
    btc_wallet: Arc<dyn BitcoinWallet>,
    pegout_repository: Arc<dyn PegoutQuoteRepository>,
    rsk_rpc: Arc<dyn RootstockRpc>,
    lbc: Arc<dyn LiquidityBridgeContract>,
    event_bus: Arc<dyn EventBus>,
    guards: LiquidityGuards,
}

impl SendPegoutUseCase {
    /// Creates a new SendPegoutUseCase with all dependencies.
    #[must_use]
    pub fn new(
        btc_wallet: Arc<dyn BitcoinWallet>,
        pegout_repository: Arc<dyn PegoutQuoteRepository>,
        rsk_rpc: Arc<dyn RootstockRpc>,
        lbc: Arc<dyn LiquidityBridgeContract>,
        event_bus: Arc<dyn EventBus>,
        guards: LiquidityGuards,
    ) -> Self {
        Self {
            btc_wallet,
            pegout_repository,
            rsk_rpc,
            lbc,
            event_bus,
            guards,
        }
    }

    /// Executes the send pegout use case for a record waiting for deposit
    /// confirmations.
    ///
    /// # Errors
    ///
    /// Returns the failure that stopped the payment. Whether the record was
    /// marked failed can be read from the stored state.
    pub async fn execute(&self, retained: RetainedPegoutQuote) -> UseCaseResult<()> {
        let quote_hash = retained.quote_hash.clone();
        if retained.state != PegoutState::WaitingForDepositConfirmations {
            return Err(UseCaseError::new(ID, ErrorKind::WrongState)
                .with_quote_hash(quote_hash)
                .with_state(retained.state));
        }
        if retained.user_rsk_tx_hash.is_empty() {
            return Err(UseCaseError::new(ID, ErrorKind::InvalidInput)
                .caused_by("user rsk transaction hash is empty")
                .with_quote_hash(quote_hash));
        }

        let quote = match self.pegout_repository.get_quote(&quote_hash).await {
            Ok(Some(quote)) => quote,
            Ok(None) => {
                let err = UseCaseError::new(ID, ErrorKind::NotFound).with_quote_hash(&quote_hash);
                return self.fail(retained, PegoutQuote::default(), err).await;
            }
            Err(e) => {
                return Err(UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash));
            }
        };

        let mut retained = retained;
        let payment = match self.validate_deposit(&mut retained, &quote).await {
            Ok(()) => self.pay(retained.clone(), quote.clone()).await,
            Err(failure) => Err(failure),
        };

        match payment {
            Ok(recorded) => recorded,
            Err(Failure::Retryable(err)) => {
                tracing::debug!(%quote_hash, error = %err, "pegout payment deferred");
                Err(err.with_quote_hash(quote_hash))
            }
            Err(Failure::Terminal(err)) => {
                self.fail(retained, quote, err.with_quote_hash(quote_hash))
                    .await
            }
        }
    }

    /// Checks confirmations, the deposit log and expiry.
    async fn validate_deposit(
        &self,
        retained: &mut RetainedPegoutQuote,
        quote: &PegoutQuote,
    ) -> Outcome<()> {
        let (height, receipt) = futures::try_join!(
            self.rsk_rpc.get_height(),
            self.rsk_rpc
                .get_transaction_receipt(&retained.user_rsk_tx_hash),
        )
        .map_err(|e| Failure::transient(ID, e))?;
        let block = self
            .rsk_rpc
            .get_block_by_hash(&receipt.block_hash)
            .await
            .map_err(|e| Failure::transient(ID, e))?;

        let confirmations = height.saturating_sub(receipt.block_number);
        if confirmations < u64::from(quote.deposit_confirmations) {
            return Err(Failure::retryable(ID, ErrorKind::NoEnoughConfirmations));
        }

        let parsed = self
            .lbc
            .parse_pegout_deposit(&receipt)
            .map_err(|e| Failure::Terminal(UseCaseError::infrastructure(ID, e)))?;
        if !parsed.contract_address.eq_ignore_ascii_case(&quote.lbc_address) {
            return Err(Failure::Terminal(
                UseCaseError::new(ID, ErrorKind::ValidationFailed)
                    .caused_by("deposit emitted by another contract")
                    .with_address(parsed.contract_address),
            ));
        }
        if !same_hash(&parsed.deposit.quote_hash, &retained.quote_hash) {
            return Err(Failure::Terminal(
                UseCaseError::new(ID, ErrorKind::ValidationFailed)
                    .caused_by("deposit made for another quote"),
            ));
        }

        let total = quote.total().map_err(|e| {
            Failure::Terminal(UseCaseError::new(ID, ErrorKind::InvalidInput).caused_by(e))
        })?;
        if parsed.deposit.amount < total {
            retained.user_rsk_tx_hash = receipt.transaction_hash.to_string();
            return Err(Failure::Terminal(
                UseCaseError::new(ID, ErrorKind::InsufficientAmount)
                    .with_amount(parsed.deposit.amount)
                    .with_required(total),
            ));
        }

        if quote.expire_time().is_before(&block.timestamp)
            || u64::from(quote.expire_block) <= block.number
        {
            return Err(Failure::terminal(ID, ErrorKind::Expired));
        }

        let completed = self
            .lbc
            .is_pegout_quote_completed(&retained.quote_hash)
            .await
            .map_err(|e| Failure::transient(ID, e))?;
        if completed {
            return Err(Failure::Terminal(
                UseCaseError::new(ID, ErrorKind::NonRecoverable)
                    .caused_by("quote already completed on the contract"),
            ));
        }
        Ok(())
    }

    /// Pays the user under the BTC wallet guard.
    ///
    /// Once the payment is attempted its outcome is recorded and returned
    /// as the inner result; the outer failure covers what stopped the
    /// attempt.
    async fn pay(
        &self,
        mut retained: RetainedPegoutQuote,
        quote: PegoutQuote,
    ) -> Outcome<UseCaseResult<()>> {
        let _guard = self.guards.acquire(GuardedResource::BtcWallet).await;

        let required = quote.value.safe_add(quote.gas_fee).map_err(|e| {
            Failure::Terminal(UseCaseError::new(ID, ErrorKind::InvalidInput).caused_by(e))
        })?;
        let balance = self
            .btc_wallet
            .get_balance()
            .await
            .map_err(|e| Failure::transient(ID, e))?;
        if balance < required {
            return Err(Failure::Retryable(
                UseCaseError::new(ID, ErrorKind::NoLiquidity)
                    .with_amount(balance)
                    .with_required(required),
            ));
        }

        let hash_bytes = QuoteHash::parse(retained.quote_hash.as_str())
            .and_then(|hash| hash.to_bytes())
            .map_err(|e| {
                Failure::Terminal(UseCaseError::new(ID, ErrorKind::InvalidInput).caused_by(e))
            })?;

        let sent = self
            .btc_wallet
            .send_with_op_return(&quote.deposit_address, quote.value, &hash_bytes)
            .await;
        let mut failure = None;
        match sent {
            Ok(tx) => {
                retained.lp_btc_tx_hash = tx.hash;
                retained.send_pegout_btc_fee = tx.fee;
                retained.state = PegoutState::SendPegoutSucceeded;
                tracing::info!(
                    quote_hash = %retained.quote_hash,
                    btc_tx = %retained.lp_btc_tx_hash,
                    "pegout btc sent"
                );
            }
            Err(e) => {
                tracing::error!(quote_hash = %retained.quote_hash, error = %e, "pegout btc payment failed");
                retained.state = PegoutState::SendPegoutFailed;
                failure = Some(
                    UseCaseError::infrastructure(ID, e).with_quote_hash(&retained.quote_hash),
                );
            }
        }

        let creation_data = self
            .pegout_repository
            .get_pegout_creation_data(&retained.quote_hash)
            .await;
        self.event_bus.publish(QuoteEvent::PegoutBtcSent(PegoutBtcSent {
            metadata: EventMetadata::new(),
            quote,
            retained_quote: retained.clone(),
            creation_data,
            error: failure.as_ref().map(ToString::to_string),
        }));

        let quote_hash = retained.quote_hash.clone();
        if let Err(update_err) = self.pegout_repository.update_retained_quote(retained).await {
            let mut err = failure.unwrap_or_else(|| {
                UseCaseError::new(ID, ErrorKind::Infrastructure).with_quote_hash(&quote_hash)
            });
            err.join(update_err);
            return Ok(Err(err));
        }
        Ok(failure.map_or(Ok(()), Err))
    }

    /// Marks the record failed, persists it and reports the failure.
    async fn fail(
        &self,
        mut retained: RetainedPegoutQuote,
        quote: PegoutQuote,
        mut err: UseCaseError,
    ) -> UseCaseResult<()> {
        tracing::warn!(quote_hash = %retained.quote_hash, error = %err, "pegout failed");
        retained.state = PegoutState::SendPegoutFailed;
        let creation_data = self
            .pegout_repository
            .get_pegout_creation_data(&retained.quote_hash)
            .await;
        if let Err(update_err) = self
            .pegout_repository
            .update_retained_quote(retained.clone())
            .await
        {
            err.join(update_err);
        }
        self.event_bus.publish(QuoteEvent::PegoutBtcSent(PegoutBtcSent {
            metadata: EventMetadata::new(),
            quote,
            retained_quote: retained,
            creation_data,
            error: Some(err.to_string()),
        }));
        Err(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::application::use_cases::tests::{Harness, LBC_ADDRESS, LP_BTC_TX};
    use crate::domain::entities::{PegoutDeposit, WatchedPegoutQuote, fixtures};
    use crate::domain::value_objects::{Timestamp, Wei};
    use crate::infrastructure::blockchain::{BlockInfo, ParsedDeposit, TransactionReceipt, TxHash};

    const DEPOSIT_TX: &str = "0xdeposit";
    const DEPOSIT_BLOCK: &str = "0xblock";

    fn use_case(h: &Harness) -> SendPegoutUseCase {
        SendPegoutUseCase::new(
            h.btc_wallet.clone(),
            h.pegout_repository.clone(),
            h.rsk_rpc.clone(),
            h.lbc.clone(),
            h.event_bus.clone(),
            h.guards.clone(),
        )
    }

    fn parsed(hash: &str, amount: u64) -> ParsedDeposit {
        ParsedDeposit {
            contract_address: LBC_ADDRESS.to_uppercase().replace("0X", "0x"),
            deposit: PegoutDeposit {
                tx_hash: DEPOSIT_TX.to_string(),
                quote_hash: format!("0x{hash}"),
                amount: Wei::from(amount),
                timestamp: Timestamp::now(),
                block_number: 100,
                from: "0x79568c2989232dcb1e2a4b7e6c1d7bc8d9a4a6f3".to_string(),
            },
        }
    }

    /// A confirmed deposit of exactly the quote total (1060) and enough BTC.
    async fn ready() -> (Harness, WatchedPegoutQuote) {
        let h = Harness::new();
        let mut watched =
            fixtures::watched_pegout(1, PegoutState::WaitingForDepositConfirmations, 1_000, 10, 50);
        watched.retained_quote.user_rsk_tx_hash = DEPOSIT_TX.to_string();
        h.pegout_repository.seed(&watched).await;

        h.rsk_rpc.set_height(120);
        h.rsk_rpc.add_receipt(TransactionReceipt {
            transaction_hash: TxHash::new(DEPOSIT_TX),
            block_hash: DEPOSIT_BLOCK.to_string(),
            block_number: 100,
            ..TransactionReceipt::default()
        });
        h.rsk_rpc.add_block(BlockInfo {
            hash: DEPOSIT_BLOCK.to_string(),
            number: 100,
            timestamp: Timestamp::now(),
        });
        h.lbc
            .set_deposit(Some(parsed(&watched.retained_quote.quote_hash, 1_060)));
        h.btc_wallet.set_balance(Wei::from(5_000u64));
        (h, watched)
    }

    #[tokio::test]
    async fn pays_the_user_and_records_the_transaction() {
        let (h, watched) = ready().await;
        let hash = watched.retained_quote.quote_hash.clone();

        use_case(&h).execute(watched.retained_quote).await.unwrap();

        let payments = h.btc_wallet.payments();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].0, watched.pegout_quote.deposit_address);
        assert_eq!(payments[0].1, Wei::from(1_000u64));
        assert_eq!(payments[0].2, vec![0x01; 32]);

        let stored = h.pegout_repository.stored(&hash).await.unwrap();
        assert_eq!(stored.state, PegoutState::SendPegoutSucceeded);
        assert_eq!(stored.lp_btc_tx_hash, LP_BTC_TX);
        assert_eq!(stored.send_pegout_btc_fee, Wei::from(1_500u64));
        match h.event_bus.last() {
            QuoteEvent::PegoutBtcSent(event) => assert!(event.error.is_none()),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(!h.guards.is_held(GuardedResource::BtcWallet));
    }

    #[tokio::test]
    async fn missing_confirmations_leave_record_untouched() {
        let (h, watched) = ready().await;
        h.rsk_rpc.set_height(105);

        let err = use_case(&h).execute(watched.retained_quote).await.unwrap_err();

        assert!(err.is(ErrorKind::NoEnoughConfirmations));
        assert_eq!(h.pegout_repository.update_count(), 0);
        assert_eq!(h.event_bus.publish_count(), 0);
        assert!(h.btc_wallet.payments().is_empty());
    }

    #[tokio::test]
    async fn rpc_failure_is_retried() {
        let (h, watched) = ready().await;
        h.rsk_rpc.set_fail_receipt(true);
        let err = use_case(&h).execute(watched.retained_quote).await.unwrap_err();
        assert!(err.is(ErrorKind::Infrastructure));
        assert_eq!(h.pegout_repository.update_count(), 0);
        assert_eq!(h.event_bus.publish_count(), 0);
    }

    #[tokio::test]
    async fn height_failure_is_retried_without_writes() {
        let (h, watched) = ready().await;
        h.rsk_rpc.set_fail_height(true);

        let err = use_case(&h).execute(watched.retained_quote).await.unwrap_err();

        assert!(err.is(ErrorKind::Infrastructure));
        assert_eq!(h.pegout_repository.update_count(), 0);
        assert_eq!(h.event_bus.publish_count(), 0);
        assert!(h.btc_wallet.payments().is_empty());
    }

    #[tokio::test]
    async fn wrong_state_is_rejected_without_writes() {
        let (h, mut watched) = ready().await;
        watched.retained_quote.state = PegoutState::WaitingForDeposit;
        let err = use_case(&h).execute(watched.retained_quote).await.unwrap_err();
        assert!(err.is(ErrorKind::WrongState));
        assert_eq!(h.pegout_repository.update_count(), 0);
        assert_eq!(h.event_bus.publish_count(), 0);
    }

    #[tokio::test]
    async fn short_deposit_fails_the_quote() {
        let (h, watched) = ready().await;
        let hash = watched.retained_quote.quote_hash.clone();
        h.lbc.set_deposit(Some(parsed(&hash, 1_059)));

        let err = use_case(&h).execute(watched.retained_quote).await.unwrap_err();

        assert!(err.is(ErrorKind::InsufficientAmount));
        let stored = h.pegout_repository.stored(&hash).await.unwrap();
        assert_eq!(stored.state, PegoutState::SendPegoutFailed);
        assert_eq!(stored.user_rsk_tx_hash, DEPOSIT_TX);
        assert!(h.event_bus.last().error().is_some());
        assert!(h.btc_wallet.payments().is_empty());
    }

    #[tokio::test]
    async fn deposit_to_another_contract_fails_the_quote() {
        let (h, watched) = ready().await;
        let hash = watched.retained_quote.quote_hash.clone();
        let mut deposit = parsed(&hash, 1_060);
        deposit.contract_address = "0x0000000000000000000000000000000000000001".to_string();
        h.lbc.set_deposit(Some(deposit));

        let err = use_case(&h).execute(watched.retained_quote).await.unwrap_err();

        assert!(err.is(ErrorKind::ValidationFailed));
        let stored = h.pegout_repository.stored(&hash).await.unwrap();
        assert_eq!(stored.state, PegoutState::SendPegoutFailed);
    }

    #[tokio::test]
    async fn deposit_for_another_quote_fails_the_quote() {
        let (h, watched) = ready().await;
        h.lbc.set_deposit(Some(parsed(&fixtures::quote_hash(2), 1_060)));
        let err = use_case(&h).execute(watched.retained_quote).await.unwrap_err();
        assert!(err.is(ErrorKind::ValidationFailed));
    }

    #[tokio::test]
    async fn deposit_after_expire_block_fails_the_quote() {
        let (h, watched) = ready().await;
        h.rsk_rpc.add_block(BlockInfo {
            hash: DEPOSIT_BLOCK.to_string(),
            number: 5_000,
            timestamp: Timestamp::now(),
        });
        h.rsk_rpc.set_height(5_100);

        let err = use_case(&h).execute(watched.retained_quote).await.unwrap_err();

        assert!(err.is(ErrorKind::Expired));
        assert_eq!(h.pegout_repository.update_count(), 1);
    }

    #[tokio::test]
    async fn completed_quote_is_not_paid_twice() {
        let (h, watched) = ready().await;
        h.lbc.set_completed(true);
        let err = use_case(&h).execute(watched.retained_quote).await.unwrap_err();
        assert!(err.is(ErrorKind::NonRecoverable));
        assert!(h.btc_wallet.payments().is_empty());
    }

    #[tokio::test]
    async fn missing_quote_fails_with_empty_terms() {
        let h = Harness::new();
        let mut retained = fixtures::retained_pegout(
            &fixtures::quote_hash(3),
            PegoutState::WaitingForDepositConfirmations,
        );
        retained.user_rsk_tx_hash = DEPOSIT_TX.to_string();

        let err = use_case(&h).execute(retained).await.unwrap_err();

        assert!(err.is(ErrorKind::NotFound));
        match h.event_bus.last() {
            QuoteEvent::PegoutBtcSent(event) => {
                assert_eq!(event.quote, PegoutQuote::default());
                assert!(event.error.is_some());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn low_btc_balance_is_retried() {
        let (h, watched) = ready().await;
        h.btc_wallet.set_balance(Wei::from(1_049u64));

        let err = use_case(&h).execute(watched.retained_quote).await.unwrap_err();

        assert!(err.is(ErrorKind::NoLiquidity));
        assert_eq!(h.pegout_repository.update_count(), 0);
        assert_eq!(h.event_bus.publish_count(), 0);
    }

    #[tokio::test]
    async fn failed_payment_is_recorded_and_published() {
        let (h, watched) = ready().await;
        let hash = watched.retained_quote.quote_hash.clone();
        h.btc_wallet.set_fail_send(true);

        let err = use_case(&h).execute(watched.retained_quote).await.unwrap_err();

        assert!(err.is(ErrorKind::Infrastructure));
        let stored = h.pegout_repository.stored(&hash).await.unwrap();
        assert_eq!(stored.state, PegoutState::SendPegoutFailed);
        assert!(stored.lp_btc_tx_hash.is_empty());
        assert_eq!(h.event_bus.publish_count(), 1);
        assert!(h.event_bus.last().error().is_some());
    }

    #[tokio::test]
    async fn update_failure_after_payment_is_reported() {
        let (h, watched) = ready().await;
        h.pegout_repository.set_fail_update(true);

        let err = use_case(&h).execute(watched.retained_quote).await.unwrap_err();

        assert_eq!(h.btc_wallet.payments().len(), 1);
        assert_eq!(h.event_bus.publish_count(), 1);
        assert_eq!(err.causes().len(), 1);
    }
}
