//! # In-Memory Pegout Repository
//!
//! In-memory implementation of [`PegoutQuoteRepository`].
//!
//! Quotes, lifecycle records and deposits share one lock so batched
//! updates are applied atomically.

use crate::domain::entities::{
    BatchPegOut, PegoutCreationData, PegoutDeposit, PegoutQuote, RetainedPegoutQuote,
};
use crate::domain::value_objects::PegoutState;
use crate::infrastructure::persistence::traits::{
    PegoutQuoteRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const RETAINED: &str = "RetainedPegoutQuote";

#[derive(Debug, Default)]
struct PegoutStore {
    quotes: HashMap<String, (PegoutQuote, PegoutCreationData)>,
    retained: HashMap<String, RetainedPegoutQuote>,
    deposits: HashMap<String, PegoutDeposit>,
}

/// In-memory implementation of [`PegoutQuoteRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryPegoutQuoteRepository {
    storage: Arc<RwLock<PegoutStore>>,
}

impl InMemoryPegoutQuoteRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of lifecycle records.
    pub async fn retained_count(&self) -> usize {
        self.storage.read().await.retained.len()
    }
}

#[async_trait]
impl PegoutQuoteRepository for InMemoryPegoutQuoteRepository {
    async fn insert_quote(
        &self,
        quote_hash: &str,
        quote: PegoutQuote,
        creation_data: PegoutCreationData,
    ) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.quotes.contains_key(quote_hash) {
            return Err(RepositoryError::duplicate("PegoutQuote", quote_hash));
        }
        storage
            .quotes
            .insert(quote_hash.to_string(), (quote, creation_data));
        Ok(())
    }

    async fn get_quote(&self, quote_hash: &str) -> RepositoryResult<Option<PegoutQuote>> {
        let storage = self.storage.read().await;
        Ok(storage.quotes.get(quote_hash).map(|(quote, _)| quote.clone()))
    }

    async fn get_pegout_creation_data(&self, quote_hash: &str) -> PegoutCreationData {
        let storage = self.storage.read().await;
        storage
            .quotes
            .get(quote_hash)
            .map(|(_, data)| data.clone())
            .unwrap_or_else(PegoutCreationData::zero)
    }

    async fn get_retained_quote(
        &self,
        quote_hash: &str,
    ) -> RepositoryResult<Option<RetainedPegoutQuote>> {
        let storage = self.storage.read().await;
        Ok(storage.retained.get(quote_hash).cloned())
    }

    async fn insert_retained_quote(&self, retained: RetainedPegoutQuote) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.retained.contains_key(&retained.quote_hash) {
            return Err(RepositoryError::duplicate(RETAINED, retained.quote_hash));
        }
        storage
            .retained
            .insert(retained.quote_hash.clone(), retained);
        Ok(())
    }

    async fn update_retained_quote(&self, retained: RetainedPegoutQuote) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        match storage.retained.get_mut(&retained.quote_hash) {
            Some(existing) => {
                *existing = retained;
                Ok(())
            }
            None => Err(RepositoryError::not_found(RETAINED, retained.quote_hash)),
        }
    }

    async fn update_retained_quotes(
        &self,
        retained: Vec<RetainedPegoutQuote>,
    ) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if let Some(missing) = retained
            .iter()
            .find(|quote| !storage.retained.contains_key(&quote.quote_hash))
        {
            return Err(RepositoryError::not_found(RETAINED, missing.quote_hash.clone()));
        }
        for quote in retained {
            storage.retained.insert(quote.quote_hash.clone(), quote);
        }
        Ok(())
    }

    async fn get_retained_quote_by_state(
        &self,
        states: &[PegoutState],
    ) -> RepositoryResult<Vec<RetainedPegoutQuote>> {
        let storage = self.storage.read().await;
        Ok(storage
            .retained
            .values()
            .filter(|quote| states.contains(&quote.state))
            .cloned()
            .collect())
    }

    async fn get_retained_quotes_for_address(
        &self,
        address: &str,
        states: &[PegoutState],
    ) -> RepositoryResult<Vec<RetainedPegoutQuote>> {
        let storage = self.storage.read().await;
        Ok(storage
            .retained
            .values()
            .filter(|quote| {
                quote.owner_account_address.eq_ignore_ascii_case(address)
                    && states.contains(&quote.state)
            })
            .cloned()
            .collect())
    }

    async fn get_retained_quotes_in_batch(
        &self,
        batch: &BatchPegOut,
    ) -> RepositoryResult<Vec<RetainedPegoutQuote>> {
        let storage = self.storage.read().await;
        Ok(storage
            .retained
            .values()
            .filter(|quote| {
                !quote.bridge_refund_tx_hash.is_empty()
                    && batch.contains(&quote.bridge_refund_tx_hash)
            })
            .cloned()
            .collect())
    }

    async fn list_pegout_deposits_by_address(
        &self,
        address: &str,
    ) -> RepositoryResult<Vec<PegoutDeposit>> {
        let storage = self.storage.read().await;
        let mut deposits: Vec<PegoutDeposit> = storage
            .deposits
            .values()
            .filter(|deposit| deposit.from.eq_ignore_ascii_case(address))
            .cloned()
            .collect();
        deposits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(deposits)
    }

    async fn upsert_pegout_deposit(&self, deposit: PegoutDeposit) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        storage.deposits.insert(deposit.tx_hash.clone(), deposit);
        Ok(())
    }

    async fn upsert_pegout_deposits(&self, deposits: Vec<PegoutDeposit>) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        for deposit in deposits {
            storage.deposits.insert(deposit.tx_hash.clone(), deposit);
        }
        Ok(())
    }

    async fn delete_quotes(&self, quote_hashes: &[String]) -> RepositoryResult<u64> {
        let mut storage = self.storage.write().await;
        let mut removed = 0u64;
        for hash in quote_hashes {
            if storage.quotes.remove(hash).is_some() {
                removed += 1;
            }
            if storage.retained.remove(hash).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::fixtures;
    use crate::domain::value_objects::{Timestamp, Wei};

    #[tokio::test]
    async fn get_missing_quote_returns_none() {
        let repo = InMemoryPegoutQuoteRepository::new();
        assert!(repo.get_quote("ab").await.unwrap().is_none());
        assert!(repo.get_retained_quote("ab").await.unwrap().is_none());
        assert_eq!(
            repo.get_pegout_creation_data("ab").await,
            PegoutCreationData::zero()
        );
    }

    #[tokio::test]
    async fn insert_retained_twice_is_duplicate() {
        let repo = InMemoryPegoutQuoteRepository::new();
        let retained = fixtures::retained_pegout("ab", PegoutState::WaitingForDeposit);
        repo.insert_retained_quote(retained.clone()).await.unwrap();
        let err = repo.insert_retained_quote(retained).await.unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let repo = InMemoryPegoutQuoteRepository::new();
        let retained = fixtures::retained_pegout("ab", PegoutState::WaitingForDeposit);
        assert!(repo.update_retained_quote(retained).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn batch_update_is_all_or_nothing() {
        let repo = InMemoryPegoutQuoteRepository::new();
        let stored = fixtures::retained_pegout("aa", PegoutState::RefundPegOutSucceeded);
        repo.insert_retained_quote(stored.clone()).await.unwrap();

        let mut first = stored;
        first.state = PegoutState::BridgeTxSucceeded;
        let missing = fixtures::retained_pegout("bb", PegoutState::BridgeTxSucceeded);
        assert!(repo.update_retained_quotes(vec![first, missing]).await.is_err());

        let unchanged = repo.get_retained_quote("aa").await.unwrap().unwrap();
        assert_eq!(unchanged.state, PegoutState::RefundPegOutSucceeded);
    }

    #[tokio::test]
    async fn filters_by_state_and_owner() {
        let repo = InMemoryPegoutQuoteRepository::new();
        let mut owned = fixtures::retained_pegout("aa", PegoutState::WaitingForDeposit);
        owned.owner_account_address = "0xAB".to_string();
        repo.insert_retained_quote(owned).await.unwrap();
        repo.insert_retained_quote(fixtures::retained_pegout("bb", PegoutState::BtcReleased))
            .await
            .unwrap();

        let active = repo
            .get_retained_quote_by_state(&PegoutState::active())
            .await
            .unwrap();
        assert_eq!(active.len(), 1);

        let owned = repo
            .get_retained_quotes_for_address("0xab", &PegoutState::active())
            .await
            .unwrap();
        assert_eq!(owned.len(), 1);
    }

    #[tokio::test]
    async fn batch_lookup_matches_bridge_tx() {
        let repo = InMemoryPegoutQuoteRepository::new();
        let mut retained = fixtures::retained_pegout("aa", PegoutState::BridgeTxSucceeded);
        retained.bridge_refund_tx_hash = "0x01".to_string();
        repo.insert_retained_quote(retained).await.unwrap();
        repo.insert_retained_quote(fixtures::retained_pegout("bb", PegoutState::BridgeTxSucceeded))
            .await
            .unwrap();

        let batch = BatchPegOut {
            release_rsk_tx_hashes: vec!["0x01".to_string()],
            ..BatchPegOut::default()
        };
        let found = repo.get_retained_quotes_in_batch(&batch).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].quote_hash, "aa");
    }

    #[tokio::test]
    async fn deposits_are_upserted_by_tx_hash() {
        let repo = InMemoryPegoutQuoteRepository::new();
        let deposit = PegoutDeposit {
            tx_hash: "0x01".to_string(),
            quote_hash: "aa".to_string(),
            amount: Wei::from(1u64),
            timestamp: Timestamp::now(),
            block_number: 1,
            from: "0xUser".to_string(),
        };
        repo.upsert_pegout_deposit(deposit.clone()).await.unwrap();
        let mut updated = deposit;
        updated.amount = Wei::from(2u64);
        repo.upsert_pegout_deposits(vec![updated]).await.unwrap();

        let deposits = repo.list_pegout_deposits_by_address("0xuser").await.unwrap();
        assert_eq!(deposits.len(), 1);
        assert_eq!(deposits[0].amount, Wei::from(2u64));
    }

    #[tokio::test]
    async fn delete_quotes_counts_documents() {
        let repo = InMemoryPegoutQuoteRepository::new();
        let hash = fixtures::quote_hash(1);
        repo.insert_quote(&hash, fixtures::pegout_quote(1, 1, 1), PegoutCreationData::zero())
            .await
            .unwrap();
        repo.insert_retained_quote(fixtures::retained_pegout(&hash, PegoutState::BtcReleased))
            .await
            .unwrap();
        assert_eq!(repo.delete_quotes(&[hash]).await.unwrap(), 2);
        assert_eq!(repo.retained_count().await, 0);
    }
}
