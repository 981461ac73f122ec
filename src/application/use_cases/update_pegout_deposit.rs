//! # Update Pegout Deposit Use Case
//!
//! Records the user's RBTC deposit for an accepted pegout, moving the quote
//! to [`PegoutState::WaitingForDepositConfirmations`].

use crate::application::error::{ErrorKind, UseCaseError, UseCaseId, UseCaseResult};
use crate::domain::entities::{PegoutDeposit, WatchedPegoutQuote};
use crate::domain::value_objects::PegoutState;
use crate::infrastructure::persistence::PegoutQuoteRepository;
use std::sync::Arc;

const ID: UseCaseId = UseCaseId::UpdatePegoutDeposit;

/// Use case for recording pegout deposits.
#[derive(Debug)]
pub struct UpdatePegoutDepositUseCase {
    pegout_repository: Arc<dyn PegoutQuoteRepository>,
}

impl UpdatePegoutDepositUseCase {
    /// Creates a new UpdatePegoutDepositUseCase.
    #[must_use]
    pub fn new(pegout_repository: Arc<dyn PegoutQuoteRepository>) -> Self {
        Self { pegout_repository }
    }

    /// Attaches `deposit` to the watched quote and returns it updated.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The record is not waiting for a deposit ([`ErrorKind::IllegalState`])
    /// - The deposit is short, late or past the expire block
    ///   ([`ErrorKind::InsufficientAmount`])
    /// - The record or the deposit cannot be stored
    pub async fn execute(
        &self,
        mut watched: WatchedPegoutQuote,
        deposit: PegoutDeposit,
    ) -> UseCaseResult<WatchedPegoutQuote> {
        let quote_hash = watched.retained_quote.quote_hash.clone();
        if watched.retained_quote.state != PegoutState::WaitingForDeposit {
            return Err(UseCaseError::new(ID, ErrorKind::IllegalState)
                .with_quote_hash(quote_hash)
                .with_state(watched.retained_quote.state));
        }
        if !deposit.is_valid_for_quote(&watched.pegout_quote) {
            return Err(UseCaseError::new(ID, ErrorKind::InsufficientAmount)
                .caused_by("deposit not valid for quote")
                .with_quote_hash(quote_hash)
                .with_amount(deposit.amount));
        }

        watched.retained_quote.user_rsk_tx_hash = deposit.tx_hash.clone();
        watched.retained_quote.state = PegoutState::WaitingForDepositConfirmations;
        self.pegout_repository
            .update_retained_quote(watched.retained_quote.clone())
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e).with_quote_hash(&quote_hash))?;
        self.pegout_repository
            .upsert_pegout_deposit(deposit.clone())
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e).with_quote_hash(&quote_hash))?;

        tracing::info!(
            %quote_hash,
            tx = %deposit.tx_hash,
            amount = %deposit.amount,
            "pegout deposit received"
        );
        Ok(watched)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::use_cases::tests::Harness;
    use crate::domain::entities::fixtures;
    use crate::domain::value_objects::{Timestamp, Wei};

    fn use_case(h: &Harness) -> UpdatePegoutDepositUseCase {
        UpdatePegoutDepositUseCase::new(h.pegout_repository.clone())
    }

    fn deposit(hash: &str, amount: u64, block_number: u64) -> PegoutDeposit {
        PegoutDeposit {
            tx_hash: "0xdeposit".to_string(),
            quote_hash: hash.to_string(),
            amount: Wei::from(amount),
            timestamp: Timestamp::now(),
            block_number,
            from: "0x79568c2989232dcb1e2a4b7e6c1d7bc8d9a4a6f3".to_string(),
        }
    }

    async fn waiting(h: &Harness) -> WatchedPegoutQuote {
        let watched = fixtures::watched_pegout(1, PegoutState::WaitingForDeposit, 1_000, 10, 50);
        h.pegout_repository.seed(&watched).await;
        watched
    }

    #[tokio::test]
    async fn records_valid_deposit() {
        let h = Harness::new();
        let watched = waiting(&h).await;
        let hash = watched.retained_quote.quote_hash.clone();

        let updated = use_case(&h)
            .execute(watched, deposit(&hash, 1_060, 4_000))
            .await
            .unwrap();

        assert_eq!(
            updated.retained_quote.state,
            PegoutState::WaitingForDepositConfirmations
        );
        assert_eq!(updated.retained_quote.user_rsk_tx_hash, "0xdeposit");
        let stored = h.pegout_repository.stored(&hash).await.unwrap();
        assert_eq!(stored.state, PegoutState::WaitingForDepositConfirmations);
        let from = "0x79568c2989232dcb1e2a4b7e6c1d7bc8d9a4a6f3";
        assert_eq!(h.pegout_repository.deposits(from).await.len(), 1);
    }

    #[tokio::test]
    async fn short_deposit_is_rejected() {
        let h = Harness::new();
        let watched = waiting(&h).await;
        let hash = watched.retained_quote.quote_hash.clone();

        let err = use_case(&h)
            .execute(watched, deposit(&hash, 1_059, 4_000))
            .await
            .unwrap_err();

        assert!(err.is(ErrorKind::InsufficientAmount));
        assert_eq!(h.pegout_repository.update_count(), 0);
    }

    #[tokio::test]
    async fn deposit_after_expire_block_is_rejected() {
        let h = Harness::new();
        let watched = waiting(&h).await;
        let hash = watched.retained_quote.quote_hash.clone();

        let err = use_case(&h)
            .execute(watched, deposit(&hash, 2_000, 5_001))
            .await
            .unwrap_err();

        assert!(err.is(ErrorKind::InsufficientAmount));
    }

    #[tokio::test]
    async fn only_quotes_waiting_for_deposit_accept_one() {
        let h = Harness::new();
        let mut watched = waiting(&h).await;
        watched.retained_quote.state = PegoutState::SendPegoutSucceeded;
        let hash = watched.retained_quote.quote_hash.clone();

        let err = use_case(&h)
            .execute(watched, deposit(&hash, 1_060, 4_000))
            .await
            .unwrap_err();

        assert!(err.is(ErrorKind::IllegalState));
        assert_eq!(h.pegout_repository.update_count(), 0);
    }

    #[tokio::test]
    async fn deposit_store_failure_is_reported() {
        let h = Harness::new();
        let watched = waiting(&h).await;
        let hash = watched.retained_quote.quote_hash.clone();
        h.pegout_repository.set_fail_upsert(true);

        let err = use_case(&h)
            .execute(watched, deposit(&hash, 1_060, 4_000))
            .await
            .unwrap_err();

        assert!(err.is(ErrorKind::Infrastructure));
    }
}
