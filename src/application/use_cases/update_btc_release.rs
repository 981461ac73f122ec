//! # Update BTC Release Use Case
//!
//! Records a bridge release that paid out the BTC of previously forwarded
//! pegouts.
//!
//! This use case orchestrates:
//! - Lookup of the records whose bridge transfer the batch released
//! - Marking them [`PegoutState::BtcReleased`]
//! - Persisting the records and the batch
//! - The batch-updated event

use crate::application::error::{UseCaseError, UseCaseId, UseCaseResult};
use crate::domain::entities::BatchPegOut;
use crate::domain::events::{BatchPegOutUpdated, EventMetadata, QuoteEvent};
use crate::domain::value_objects::PegoutState;
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::persistence::{BatchPegOutRepository, PegoutQuoteRepository};
use std::sync::Arc;

const ID: UseCaseId = UseCaseId::UpdateBtcRelease;

/// Use case for recording bridge releases.
#[derive(Debug)]
pub struct UpdateBtcReleaseUseCase {
    pegout_repository: Arc<dyn PegoutQuoteRepository>,
    batch_repository: Arc<dyn BatchPegOutRepository>,
    event_bus: Arc<dyn EventBus>,
}

impl UpdateBtcReleaseUseCase {
    /// Creates a new UpdateBtcReleaseUseCase.
    #[must_use]
    pub fn new(
        pegout_repository: Arc<dyn PegoutQuoteRepository>,
        batch_repository: Arc<dyn BatchPegOutRepository>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            pegout_repository,
            batch_repository,
            event_bus,
        }
    }

    /// Marks every record released by `batch` and returns how many there
    /// were.
    ///
    /// A batch releasing none of the LP's transfers is not an error and
    /// writes nothing.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the records cannot be read or
    /// updated, or if the batch cannot be stored. In the last case the
    /// records were already updated and no event is published.
    pub async fn execute(&self, batch: BatchPegOut) -> UseCaseResult<usize> {
        let mut quotes = self
            .pegout_repository
            .get_retained_quotes_in_batch(&batch)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        if quotes.is_empty() {
            tracing::debug!(tx = %batch.transaction_hash, "batch releases no LP transfer");
            return Ok(0);
        }

        for quote in &mut quotes {
            quote.state = PegoutState::BtcReleased;
            quote.btc_release_tx_hash = batch.transaction_hash.clone();
        }
        let quote_hashes: Vec<String> = quotes.iter().map(|q| q.quote_hash.clone()).collect();
        let updated = quotes.len();

        self.pegout_repository
            .update_retained_quotes(quotes)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        self.batch_repository
            .upsert_batch(batch.clone())
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;

        tracing::info!(
            tx = %batch.transaction_hash,
            btc_tx = %batch.btc_tx_hash,
            quotes = updated,
            "btc release recorded"
        );
        self.event_bus
            .publish(QuoteEvent::BatchPegOutUpdated(BatchPegOutUpdated {
                metadata: EventMetadata::new(),
                batch,
                quote_hashes,
            }));
        Ok(updated)
    }
}
