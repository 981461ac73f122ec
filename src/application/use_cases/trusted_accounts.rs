//! # Trusted Accounts Use Case
//!
//! Management of the signed trusted account registry and the checks the
//! accept use cases run against it.
//!
//! Every record is stored together with the LP signature over the keccak
//! hash of its JSON encoding. A record whose hash no longer matches its
//! contents, or whose signature was not produced by the LP, is reported as
//! tampered.

use crate::application::error::{ErrorKind, UseCaseError, UseCaseId, UseCaseResult};
use crate::domain::entities::{Signed, TrustedAccountDetails};
use crate::domain::services::liquidity_provider::LiquidityProvider;
use crate::domain::services::signature::recover_signer_address;
use crate::domain::value_objects::Wei;
use crate::infrastructure::persistence::{RepositoryError, TrustedAccountRepository};
use std::sync::Arc;

const ID: UseCaseId = UseCaseId::TrustedAccounts;

/// Checks that a stored record was signed by the LP and not altered since.
fn verify<P: LiquidityProvider + ?Sized>(
    provider: &P,
    use_case: UseCaseId,
    account: &Signed<TrustedAccountDetails>,
) -> UseCaseResult<()> {
    if account.check_integrity() && provider.validate_signature(&account.hash, &account.signature) {
        return Ok(());
    }
    Err(UseCaseError::new(use_case, ErrorKind::TamperedTrustedAccount)
        .with_address(account.value.address.clone()))
}

/// Recovers the account that signed `quote_hash` and loads its verified
/// registry entry.
///
/// # Errors
///
/// - [`ErrorKind::InvalidInput`] if no signer can be recovered
/// - [`ErrorKind::TrustedAccountNotFound`] if the signer is not registered
/// - [`ErrorKind::TamperedTrustedAccount`] if the entry fails verification
/// - [`ErrorKind::Infrastructure`] if the registry cannot be read
pub(crate) async fn signing_account<P: LiquidityProvider + ?Sized>(
    repository: &dyn TrustedAccountRepository,
    provider: &P,
    use_case: UseCaseId,
    quote_hash: &str,
    signature: &str,
) -> UseCaseResult<TrustedAccountDetails> {
    let signer = recover_signer_address(quote_hash, signature).map_err(|e| {
        UseCaseError::new(use_case, ErrorKind::InvalidInput)
            .caused_by(e)
            .with_quote_hash(quote_hash)
    })?;
    let account = repository
        .get_trusted_account(&signer)
        .await
        .map_err(|e| UseCaseError::infrastructure(use_case, e))?
        .ok_or_else(|| {
            UseCaseError::new(use_case, ErrorKind::TrustedAccountNotFound)
                .with_address(signer.clone())
        })?;
    verify(provider, use_case, &account)?;
    Ok(account.value)
}

/// Fails with [`ErrorKind::LockingCapExceeded`] if `required` on top of
/// what the account already holds goes over `cap`.
pub(crate) fn check_locking_cap(
    use_case: UseCaseId,
    account: &TrustedAccountDetails,
    committed: impl IntoIterator<Item = Wei>,
    required: Wei,
    cap: Wei,
) -> UseCaseResult<()> {
    let locked = Wei::checked_sum(committed.into_iter().chain([required]))
        .map_err(|e| UseCaseError::new(use_case, ErrorKind::InvalidInput).caused_by(e))?;
    if locked > cap {
        tracing::warn!(
            address = %account.address,
            %locked,
            %cap,
            "trusted account locking cap exceeded"
        );
        return Err(UseCaseError::new(use_case, ErrorKind::LockingCapExceeded)
            .with_address(account.address.clone())
            .with_amount(locked)
            .with_required(cap));
    }
    Ok(())
}

/// Use case for reading and changing the trusted account registry.
#[derive(Debug)]
pub struct TrustedAccountsUseCase {
    repository: Arc<dyn TrustedAccountRepository>,
    provider: Arc<dyn LiquidityProvider>,
}

impl TrustedAccountsUseCase {
    /// Creates a new TrustedAccountsUseCase.
    #[must_use]
    pub fn new(
        repository: Arc<dyn TrustedAccountRepository>,
        provider: Arc<dyn LiquidityProvider>,
    ) -> Self {
        Self {
            repository,
            provider,
        }
    }

    /// Returns the verified account stored under `address`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::TrustedAccountNotFound`] if there is none and
    /// [`ErrorKind::TamperedTrustedAccount`] if it fails verification.
    pub async fn get(&self, address: &str) -> UseCaseResult<TrustedAccountDetails> {
        let account = self
            .repository
            .get_trusted_account(address)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?
            .ok_or_else(|| {
                UseCaseError::new(ID, ErrorKind::TrustedAccountNotFound).with_address(address)
            })?;
        verify(self.provider.as_ref(), ID, &account)?;
        Ok(account.value)
    }

    /// Returns every account, each verified.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::TamperedTrustedAccount`] on the first record that
    /// fails verification.
    pub async fn list(&self) -> UseCaseResult<Vec<TrustedAccountDetails>> {
        let accounts = self
            .repository
            .get_all_trusted_accounts()
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        accounts
            .into_iter()
            .map(|account| {
                verify(self.provider.as_ref(), ID, &account)?;
                Ok(account.value)
            })
            .collect()
    }

    /// Signs and stores a new account.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateTrustedAccount`] if the address is
    /// already registered.
    pub async fn add(&self, details: TrustedAccountDetails) -> UseCaseResult<()> {
        let address = details.address.clone();
        let signed = self.sign(details).await?;
        self.repository
            .add_trusted_account(signed)
            .await
            .map_err(|e| Self::map_write_error(e, &address))?;
        tracing::info!(%address, "trusted account added");
        Ok(())
    }

    /// Signs and replaces an existing account.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::TrustedAccountNotFound`] if the address is not
    /// registered.
    pub async fn update(&self, details: TrustedAccountDetails) -> UseCaseResult<()> {
        let address = details.address.clone();
        let signed = self.sign(details).await?;
        self.repository
            .update_trusted_account(signed)
            .await
            .map_err(|e| Self::map_write_error(e, &address))?;
        tracing::info!(%address, "trusted account updated");
        Ok(())
    }

    /// Removes an account.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::TrustedAccountNotFound`] if the address is not
    /// registered.
    pub async fn delete(&self, address: &str) -> UseCaseResult<()> {
        self.repository
            .delete_trusted_account(address)
            .await
            .map_err(|e| Self::map_write_error(e, address))?;
        tracing::info!(%address, "trusted account deleted");
        Ok(())
    }

    async fn sign(
        &self,
        details: TrustedAccountDetails,
    ) -> UseCaseResult<Signed<TrustedAccountDetails>> {
        let hash = Signed::hash_of(&details)
            .map_err(|e| UseCaseError::new(ID, ErrorKind::InvalidInput).caused_by(e))?;
        let signature = self
            .provider
            .sign_quote(&hash)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        Ok(Signed {
            value: details,
            signature,
            hash,
        })
    }

    fn map_write_error(err: RepositoryError, address: &str) -> UseCaseError {
        let kind = if err.is_duplicate() {
            ErrorKind::DuplicateTrustedAccount
        } else if err.is_not_found() {
            ErrorKind::TrustedAccountNotFound
        } else {
            ErrorKind::Infrastructure
        };
        UseCaseError::new(ID, kind)
            .caused_by(err)
            .with_address(address)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::use_cases::tests::{
        Harness, LP_KEY, TRUSTED_KEY, address_of, sign_with,
    };
    use crate::domain::entities::fixtures;

    fn use_case(h: &Harness) -> TrustedAccountsUseCase {
        TrustedAccountsUseCase::new(h.trusted_accounts.clone(), h.provider.clone())
    }

    #[tokio::test]
    async fn add_then_get_round_trips() {
        let h = Harness::new();
        let uc = use_case(&h);
        let details = Harness::trusted_account(1_000, 2_000);
        uc.add(details.clone()).await.unwrap();

        assert_eq!(uc.get(&details.address).await.unwrap(), details);
        assert_eq!(uc.list().await.unwrap(), vec![details]);
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected() {
        let h = Harness::new();
        let uc = use_case(&h);
        uc.add(Harness::trusted_account(1, 1)).await.unwrap();
        let err = uc.add(Harness::trusted_account(2, 2)).await.unwrap_err();
        assert!(err.is(ErrorKind::DuplicateTrustedAccount));
    }

    #[tokio::test]
    async fn update_and_delete_need_existing_account() {
        let h = Harness::new();
        let uc = use_case(&h);
        let details = Harness::trusted_account(1, 1);
        assert!(
            uc.update(details.clone())
                .await
                .unwrap_err()
                .is(ErrorKind::TrustedAccountNotFound)
        );
        assert!(
            uc.delete(&details.address)
                .await
                .unwrap_err()
                .is(ErrorKind::TrustedAccountNotFound)
        );

        uc.add(details.clone()).await.unwrap();
        let raised = TrustedAccountDetails {
            btc_locking_cap: Wei::from(50u64),
            ..details.clone()
        };
        uc.update(raised.clone()).await.unwrap();
        assert_eq!(uc.get(&details.address).await.unwrap(), raised);
        uc.delete(&details.address).await.unwrap();
        assert!(uc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn altered_record_is_tampered() {
        let h = Harness::new();
        let mut details = Harness::trusted_account(1_000, 1_000);
        let hash = Signed::hash_of(&details).unwrap();
        let signature = sign_with(LP_KEY, &hash).await;
        details.btc_locking_cap = Wei::from(1_000_000u64);
        h.trusted_accounts
            .add_trusted_account(Signed {
                value: details.clone(),
                signature,
                hash,
            })
            .await
            .unwrap();

        let err = use_case(&h).get(&details.address).await.unwrap_err();
        assert!(err.is(ErrorKind::TamperedTrustedAccount));
    }

    #[tokio::test]
    async fn record_signed_by_someone_else_is_tampered() {
        let h = Harness::new();
        let details = Harness::trusted_account(1_000, 1_000);
        let hash = Signed::hash_of(&details).unwrap();
        let signature = sign_with(TRUSTED_KEY, &hash).await;
        h.trusted_accounts
            .add_trusted_account(Signed {
                value: details.clone(),
                signature,
                hash,
            })
            .await
            .unwrap();

        let err = use_case(&h).list().await.unwrap_err();
        assert!(err.is(ErrorKind::TamperedTrustedAccount));
    }

    #[tokio::test]
    async fn signing_account_recovers_registered_signer() {
        let h = Harness::new();
        h.add_trusted_account(Harness::trusted_account(10, 20)).await;
        let hash = fixtures::quote_hash(4);
        let signature = sign_with(TRUSTED_KEY, &hash).await;

        let account = signing_account(
            h.trusted_accounts.as_ref(),
            h.provider.as_ref(),
            UseCaseId::AcceptPegoutQuote,
            &hash,
            &signature,
        )
        .await
        .unwrap();
        assert_eq!(account.address, address_of(TRUSTED_KEY));
    }

    #[tokio::test]
    async fn unknown_signer_is_not_found() {
        let h = Harness::new();
        let hash = fixtures::quote_hash(4);
        let signature = sign_with(TRUSTED_KEY, &hash).await;
        let err = signing_account(
            h.trusted_accounts.as_ref(),
            h.provider.as_ref(),
            UseCaseId::AcceptPeginQuote,
            &hash,
            &signature,
        )
        .await
        .unwrap_err();
        assert!(err.is(ErrorKind::TrustedAccountNotFound));
        assert_eq!(err.use_case(), UseCaseId::AcceptPeginQuote);
    }

    #[test]
    fn locking_cap_is_inclusive() {
        let account = Harness::trusted_account(100, 100);
        let committed = [Wei::from(40u64), Wei::from(30u64)];
        assert!(
            check_locking_cap(
                ID,
                &account,
                committed,
                Wei::from(30u64),
                account.btc_locking_cap
            )
            .is_ok()
        );
        let err = check_locking_cap(
            ID,
            &account,
            committed,
            Wei::from(31u64),
            account.btc_locking_cap,
        )
        .unwrap_err();
        assert!(err.is(ErrorKind::LockingCapExceeded));
        assert_eq!(err.context().amount, Some(Wei::from(101u64)));
    }
}
