//! # In-Memory Pegin Repository
//!
//! In-memory implementation of [`PeginQuoteRepository`].

use crate::domain::entities::{PeginQuote, RetainedPeginQuote};
use crate::domain::value_objects::PeginState;
use crate::infrastructure::persistence::traits::{
    PeginQuoteRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct PeginStore {
    quotes: HashMap<String, PeginQuote>,
    retained: HashMap<String, RetainedPeginQuote>,
}

/// In-memory implementation of [`PeginQuoteRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryPeginQuoteRepository {
    storage: Arc<RwLock<PeginStore>>,
}

impl InMemoryPeginQuoteRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PeginQuoteRepository for InMemoryPeginQuoteRepository {
    async fn insert_quote(&self, quote_hash: &str, quote: PeginQuote) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.quotes.contains_key(quote_hash) {
            return Err(RepositoryError::duplicate("PeginQuote", quote_hash));
        }
        storage.quotes.insert(quote_hash.to_string(), quote);
        Ok(())
    }

    async fn get_quote(&self, quote_hash: &str) -> RepositoryResult<Option<PeginQuote>> {
        let storage = self.storage.read().await;
        Ok(storage.quotes.get(quote_hash).cloned())
    }

    async fn get_retained_quote(
        &self,
        quote_hash: &str,
    ) -> RepositoryResult<Option<RetainedPeginQuote>> {
        let storage = self.storage.read().await;
        Ok(storage.retained.get(quote_hash).cloned())
    }

    async fn insert_retained_quote(&self, retained: RetainedPeginQuote) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.retained.contains_key(&retained.quote_hash) {
            return Err(RepositoryError::duplicate(
                "RetainedPeginQuote",
                retained.quote_hash,
            ));
        }
        storage
            .retained
            .insert(retained.quote_hash.clone(), retained);
        Ok(())
    }

    async fn update_retained_quote(&self, retained: RetainedPeginQuote) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        match storage.retained.get_mut(&retained.quote_hash) {
            Some(existing) => {
                *existing = retained;
                Ok(())
            }
            None => Err(RepositoryError::not_found(
                "RetainedPeginQuote",
                retained.quote_hash,
            )),
        }
    }

    async fn get_retained_quote_by_state(
        &self,
        states: &[PeginState],
    ) -> RepositoryResult<Vec<RetainedPeginQuote>> {
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
        states: &[PeginState],
    ) -> RepositoryResult<Vec<RetainedPeginQuote>> {
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

    async fn delete_quotes(&self, quote_hashes: &[String]) -> RepositoryResult<u64> {
        let mut storage = self.storage.write().await;
        let mut removed = 0u64;
        for hash in quote_hashes {
            removed += u64::from(storage.quotes.remove(hash).is_some());
            removed += u64::from(storage.retained.remove(hash).is_some());
        }
        Ok(removed)
    }
}
