//! # In-Memory Trusted Account Repository
//!
//! In-memory implementation of [`TrustedAccountRepository`], keyed by the
//! lowercase account address.

use crate::domain::entities::{Signed, TrustedAccountDetails, normalize_address};
use crate::infrastructure::persistence::traits::{
    RepositoryError, RepositoryResult, TrustedAccountRepository,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const ENTITY: &str = "TrustedAccount";

/// In-memory implementation of [`TrustedAccountRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrustedAccountRepository {
    storage: Arc<RwLock<HashMap<String, Signed<TrustedAccountDetails>>>>,
}

impl InMemoryTrustedAccountRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrustedAccountRepository for InMemoryTrustedAccountRepository {
    async fn get_trusted_account(
        &self,
        address: &str,
    ) -> RepositoryResult<Option<Signed<TrustedAccountDetails>>> {
        let storage = self.storage.read().await;
        Ok(storage.get(&normalize_address(address)).cloned())
    }

    async fn get_all_trusted_accounts(
        &self,
    ) -> RepositoryResult<Vec<Signed<TrustedAccountDetails>>> {
        let storage = self.storage.read().await;
        let mut accounts: Vec<_> = storage.values().cloned().collect();
        accounts.sort_by(|a, b| a.value.address.cmp(&b.value.address));
        Ok(accounts)
    }

    async fn add_trusted_account(
        &self,
        account: Signed<TrustedAccountDetails>,
    ) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        let key = account.value.normalized_address();
        if storage.contains_key(&key) {
            return Err(RepositoryError::duplicate(ENTITY, key));
        }
        storage.insert(key, account);
        Ok(())
    }

    async fn update_trusted_account(
        &self,
        account: Signed<TrustedAccountDetails>,
    ) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        let key = account.value.normalized_address();
        match storage.get_mut(&key) {
            Some(existing) => {
                *existing = account;
                Ok(())
            }
            None => Err(RepositoryError::not_found(ENTITY, key)),
        }
    }

    async fn delete_trusted_account(&self, address: &str) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        let key = normalize_address(address);
        storage
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found(ENTITY, key))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Wei;

    fn account(address: &str) -> Signed<TrustedAccountDetails> {
        Signed {
            value: TrustedAccountDetails {
                address: address.to_string(),
                name: "desk".to_string(),
                btc_locking_cap: Wei::from(10u64),
                rbtc_locking_cap: Wei::from(20u64),
            },
            signature: "sig".to_string(),
            hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn lookup_ignores_address_case() {
        let repo = InMemoryTrustedAccountRepository::new();
        repo.add_trusted_account(account("0xABCD")).await.unwrap();
        assert!(repo.get_trusted_account("0xabcd").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn add_duplicate_fails() {
        let repo = InMemoryTrustedAccountRepository::new();
        repo.add_trusted_account(account("0xabcd")).await.unwrap();
        let err = repo.add_trusted_account(account("0xABCD")).await.unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn update_and_delete_missing_fail() {
        let repo = InMemoryTrustedAccountRepository::new();
        assert!(repo.update_trusted_account(account("0x1")).await.unwrap_err().is_not_found());
        assert!(repo.delete_trusted_account("0x1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn list_is_sorted_by_address() {
        let repo = InMemoryTrustedAccountRepository::new();
        repo.add_trusted_account(account("0x2")).await.unwrap();
        repo.add_trusted_account(account("0x1")).await.unwrap();
        let all = repo.get_all_trusted_accounts().await.unwrap();
        assert_eq!(all[0].value.address, "0x1");
        repo.delete_trusted_account("0x1").await.unwrap();
        assert_eq!(repo.get_all_trusted_accounts().await.unwrap().len(), 1);
    }
}
