//! # In-Memory Batch Repository
//!
//! In-memory implementation of [`BatchPegOutRepository`].

use crate::domain::entities::BatchPegOut;
use crate::infrastructure::persistence::traits::{BatchPegOutRepository, RepositoryResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`BatchPegOutRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryBatchPegOutRepository {
    storage: Arc<RwLock<HashMap<String, BatchPegOut>>>,
}

impl InMemoryBatchPegOutRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BatchPegOutRepository for InMemoryBatchPegOutRepository {
    async fn upsert_batch(&self, batch: BatchPegOut) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        storage.insert(batch.transaction_hash.clone(), batch);
        Ok(())
    }

    async fn get_batch(&self, transaction_hash: &str) -> RepositoryResult<Option<BatchPegOut>> {
        let storage = self.storage.read().await;
        Ok(storage.get(transaction_hash).cloned())
    }
}
