//! # Accept Pegout Quote Use Case
//!
//! Commits the LP to a pegout quote.
//!
//! This use case orchestrates:
//! - Pause, existence and expiry checks
//! - Trusted account signature recovery and locking cap enforcement
//! - Liquidity reservation under the pegout liquidity guard
//! - Signing, persistence and the acceptance event
//!
//! Accepting an already accepted quote returns the stored signature and
//! deposit address without reserving liquidity again.

use crate::application::error::{ErrorKind, UseCaseError, UseCaseId, UseCaseResult};
use crate::application::guard::{GuardedResource, LiquidityGuards};
use crate::application::use_cases::trusted_accounts::{check_locking_cap, signing_account};
use crate::domain::entities::{RetainedPegoutQuote, TrustedAccountDetails};
use crate::domain::events::{AcceptedPegoutQuote, EventMetadata, QuoteEvent};
use crate::domain::services::liquidity_provider::PegoutLiquidityProvider;
use crate::domain::value_objects::{PegoutState, Wei, validate_quote_hash};
use crate::infrastructure::blockchain::LiquidityBridgeContract;
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::persistence::{PegoutQuoteRepository, TrustedAccountRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ID: UseCaseId = UseCaseId::AcceptPegoutQuote;

/// What the user needs to act on an accepted quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedQuote {
    /// LP signature over the quote hash.
    pub signature: String,
    /// Where the user deposits.
    pub deposit_address: String,
}

/// Use case for accepting pegout quotes.
#[derive(Debug)]
pub struct AcceptPegoutQuoteUseCase {
    pegout_repository: Arc<dyn PegoutQuoteRepository>,
    trusted_accounts: Arc<dyn TrustedAccountRepository>,
    lbc: Arc<dyn LiquidityBridgeContract>,
    provider: Arc<dyn PegoutLiquidityProvider>,
    event_bus: Arc<dyn EventBus>,
    guards: LiquidityGuards,
}

impl AcceptPegoutQuoteUseCase {
    /// Creates a new AcceptPegoutQuoteUseCase with all dependencies.
    #[must_use]
    pub fn new(
        pegout_repository: Arc<dyn PegoutQuoteRepository>,
        trusted_accounts: Arc<dyn TrustedAccountRepository>,
        lbc: Arc<dyn LiquidityBridgeContract>,
        provider: Arc<dyn PegoutLiquidityProvider>,
        event_bus: Arc<dyn EventBus>,
        guards: LiquidityGuards,
    ) -> Self {
        Self {
            pegout_repository,
            trusted_accounts,
            lbc,
            provider,
            event_bus,
            guards,
        }
    }

    /// Executes the accept pegout quote use case.
    ///
    /// # Arguments
    ///
    /// * `quote_hash` - Hash of a quote previously stored by the LP
    /// * `signature` - Signature of a trusted account over the quote hash,
    ///   if the quote is accepted on its behalf
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The hash is malformed or the contract is paused
    /// - The quote does not exist or has expired
    /// - The signer is not a valid trusted account or exceeds its cap
    /// - The LP lacks liquidity
    /// - Signing or persistence fails
    pub async fn execute(
        &self,
        quote_hash: &str,
        signature: Option<&str>,
    ) -> UseCaseResult<AcceptedQuote> {
        validate_quote_hash(quote_hash).map_err(|e| {
            UseCaseError::new(ID, ErrorKind::InvalidInput)
                .caused_by(e)
                .with_quote_hash(quote_hash)
        })?;

        let status = self
            .lbc
            .paused_status()
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        if status.is_paused {
            return Err(UseCaseError::new(ID, ErrorKind::Paused).caused_by(status.reason));
        }

        let quote = self
            .pegout_repository
            .get_quote(quote_hash)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash))?
            .ok_or_else(|| UseCaseError::new(ID, ErrorKind::NotFound).with_quote_hash(quote_hash))?;
        let creation_data = self
            .pegout_repository
            .get_pegout_creation_data(quote_hash)
            .await;

        if quote.is_expired() {
            return Err(UseCaseError::new(ID, ErrorKind::Expired).with_quote_hash(quote_hash));
        }

        let trusted_account = match signature {
            Some(signature) => Some(
                signing_account(
                    self.trusted_accounts.as_ref(),
                    self.provider.as_ref(),
                    ID,
                    quote_hash,
                    signature,
                )
                .await?,
            ),
            None => None,
        };

        let _guard = self.guards.acquire(GuardedResource::PegoutLiquidity).await;

        if let Some(retained) = self
            .pegout_repository
            .get_retained_quote(quote_hash)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash))?
        {
            tracing::debug!(quote_hash, "pegout quote already accepted");
            return Ok(AcceptedQuote {
                signature: retained.signature,
                deposit_address: retained.deposit_address,
            });
        }

        let required_liquidity = quote.required_liquidity().map_err(|e| {
            UseCaseError::new(ID, ErrorKind::InvalidInput)
                .caused_by(e)
                .with_quote_hash(quote_hash)
        })?;

        if let Some(account) = &trusted_account {
            self.check_cap(account, required_liquidity).await?;
        }

        let has_liquidity = self
            .provider
            .has_pegout_liquidity(required_liquidity)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash))?;
        if !has_liquidity {
            return Err(UseCaseError::new(ID, ErrorKind::NoLiquidity)
                .with_quote_hash(quote_hash)
                .with_required(required_liquidity));
        }

        let lp_signature = self
            .provider
            .sign_quote(quote_hash)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash))?;

        let mut retained = RetainedPegoutQuote::new(
            quote_hash,
            self.lbc.address(),
            lp_signature,
            required_liquidity,
        );
        if let Some(account) = &trusted_account {
            retained.owner_account_address = account.address.clone();
        }
        retained.validate().map_err(|e| {
            UseCaseError::new(ID, ErrorKind::ValidationFailed)
                .caused_by(e)
                .with_quote_hash(quote_hash)
        })?;

        self.pegout_repository
            .insert_retained_quote(retained.clone())
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash))?;

        tracing::info!(
            quote_hash,
            required_liquidity = %required_liquidity,
            owner = %retained.owner_account_address,
            "pegout quote accepted"
        );

        let accepted = AcceptedQuote {
            signature: retained.signature.clone(),
            deposit_address: retained.deposit_address.clone(),
        };
        self.event_bus
            .publish(QuoteEvent::AcceptedPegoutQuote(AcceptedPegoutQuote {
                metadata: EventMetadata::new(),
                quote,
                retained_quote: retained,
                creation_data,
            }));
        Ok(accepted)
    }

    async fn check_cap(
        &self,
        account: &TrustedAccountDetails,
        required: Wei,
    ) -> UseCaseResult<()> {
        let active = self
            .pegout_repository
            .get_retained_quotes_for_address(&account.address, &PegoutState::active())
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        check_locking_cap(
            ID,
            account,
            active.iter().map(|q| q.required_liquidity),
            required,
            account.btc_locking_cap,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::use_cases::tests::{Harness, LBC_ADDRESS, TRUSTED_KEY, sign_with};
    use crate::domain::entities::fixtures;

    fn use_case(h: &Harness) -> AcceptPegoutQuoteUseCase {
        AcceptPegoutQuoteUseCase::new(
            h.pegout_repository.clone(),
            h.trusted_accounts.clone(),
            h.lbc.clone(),
            h.provider.clone(),
            h.event_bus.clone(),
            h.guards.clone(),
        )
    }

    async fn seeded(value: u64, gas_fee: u64) -> (Harness, String) {
        let h = Harness::new();
        let hash = fixtures::quote_hash(1);
        h.pegout_repository
            .seed_quote(&hash, fixtures::pegout_quote(value, 10, gas_fee))
            .await;
        (h, hash)
    }

    #[tokio::test]
    async fn accepts_and_reserves_value_plus_gas_fee() {
        let (h, hash) = seeded(1_000, 50).await;
        let accepted = use_case(&h).execute(&hash, None).await.unwrap();

        assert_eq!(accepted.deposit_address, LBC_ADDRESS);
        assert_eq!(h.provider.checked(), vec![Wei::from(1_050u64)]);
        let stored = h.pegout_repository.stored(&hash).await.unwrap();
        assert_eq!(stored.state, PegoutState::WaitingForDeposit);
        assert_eq!(stored.required_liquidity, Wei::from(1_050u64));
        assert_eq!(stored.signature, accepted.signature);
        assert!(matches!(h.event_bus.last(), QuoteEvent::AcceptedPegoutQuote(_)));
    }

    #[tokio::test]
    async fn second_accept_is_idempotent() {
        let (h, hash) = seeded(1_000, 50).await;
        let uc = use_case(&h);
        let first = uc.execute(&hash, None).await.unwrap();
        let second = uc.execute(&hash, None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(h.provider.checked().len(), 1);
        assert_eq!(h.pegout_repository.insert_retained_count(), 1);
        assert_eq!(h.event_bus.publish_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_accepts_reserve_once() {
        let (h, hash) = seeded(1_000, 50).await;
        let uc = Arc::new(use_case(&h));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let uc = Arc::clone(&uc);
                let hash = hash.clone();
                tokio::spawn(async move { uc.execute(&hash, None).await.unwrap() })
            })
            .collect();
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(h.provider.checked().len(), 1);
        assert_eq!(h.pegout_repository.insert_retained_count(), 1);
        assert_eq!(h.event_bus.publish_count(), 1);
    }

    #[tokio::test]
    async fn paused_contract_rejects() {
        let (h, hash) = seeded(1_000, 50).await;
        h.lbc.set_paused(true);
        let err = use_case(&h).execute(&hash, None).await.unwrap_err();
        assert!(err.is(ErrorKind::Paused));
        assert_eq!(h.event_bus.publish_count(), 0);
    }

    #[tokio::test]
    async fn unknown_quote_is_not_found() {
        let h = Harness::new();
        let err = use_case(&h)
            .execute(&fixtures::quote_hash(9), None)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn malformed_hash_is_invalid_input() {
        let h = Harness::new();
        let err = use_case(&h).execute("abc", None).await.unwrap_err();
        assert!(err.is(ErrorKind::InvalidInput));
    }

    #[tokio::test]
    async fn expired_quote_is_rejected() {
        let h = Harness::new();
        let hash = fixtures::quote_hash(2);
        let mut quote = fixtures::pegout_quote(1_000, 10, 50);
        quote.expire_date = fixtures::unix_from_now(-10);
        h.pegout_repository.seed_quote(&hash, quote).await;

        let err = use_case(&h).execute(&hash, None).await.unwrap_err();
        assert!(err.is(ErrorKind::Expired));
        assert_eq!(h.pegout_repository.insert_retained_count(), 0);
    }

    #[tokio::test]
    async fn missing_liquidity_is_reported() {
        let (h, hash) = seeded(1_000, 50).await;
        h.provider.set_has_liquidity(false);
        let err = use_case(&h).execute(&hash, None).await.unwrap_err();
        assert!(err.is(ErrorKind::NoLiquidity));
        assert!(h.pegout_repository.stored(&hash).await.is_none());
    }

    #[tokio::test]
    async fn trusted_account_owns_the_quote() {
        let (h, hash) = seeded(1_000, 50).await;
        h.add_trusted_account(Harness::trusted_account(5_000, 0)).await;
        let signature = sign_with(TRUSTED_KEY, &hash).await;

        use_case(&h).execute(&hash, Some(&signature)).await.unwrap();

        let stored = h.pegout_repository.stored(&hash).await.unwrap();
        assert_eq!(
            stored.owner_account_address,
            Harness::trusted_account(0, 0).address
        );
    }

    #[tokio::test]
    async fn locking_cap_counts_active_quotes_of_the_account() {
        let h = Harness::new();
        h.add_trusted_account(Harness::trusted_account(2_000, 0)).await;
        let uc = use_case(&h);
        let first = fixtures::quote_hash(1);
        let second = fixtures::quote_hash(2);
        h.pegout_repository
            .seed_quote(&first, fixtures::pegout_quote(1_000, 10, 0))
            .await;
        h.pegout_repository
            .seed_quote(&second, fixtures::pegout_quote(1_001, 10, 0))
            .await;

        let signature = sign_with(TRUSTED_KEY, &first).await;
        uc.execute(&first, Some(&signature)).await.unwrap();
        let signature = sign_with(TRUSTED_KEY, &second).await;
        let err = uc.execute(&second, Some(&signature)).await.unwrap_err();

        assert!(err.is(ErrorKind::LockingCapExceeded));
        assert_eq!(err.context().amount, Some(Wei::from(2_001u64)));
        assert!(h.pegout_repository.stored(&second).await.is_none());
    }

    #[tokio::test]
    async fn unregistered_signer_is_rejected() {
        let (h, hash) = seeded(1_000, 50).await;
        let signature = sign_with(TRUSTED_KEY, &hash).await;
        let err = use_case(&h)
            .execute(&hash, Some(&signature))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::TrustedAccountNotFound));
        assert!(h.provider.checked().is_empty());
    }

    #[tokio::test]
    async fn insert_failure_publishes_nothing() {
        let (h, hash) = seeded(1_000, 50).await;
        h.pegout_repository.set_fail_insert(true);
        let err = use_case(&h).execute(&hash, None).await.unwrap_err();
        assert!(err.is(ErrorKind::Infrastructure));
        assert_eq!(h.event_bus.publish_count(), 0);
        assert!(!h.guards.is_held(GuardedResource::PegoutLiquidity));
    }
}
