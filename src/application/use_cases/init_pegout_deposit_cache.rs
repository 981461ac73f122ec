//! # Init Pegout Deposit Cache Use Case
//!
//! Loads the pegout deposits of the most recent blocks into the repository
//! on startup.

use crate::application::error::{UseCaseError, UseCaseId, UseCaseResult};
use crate::infrastructure::blockchain::{LiquidityBridgeContract, RootstockRpc};
use crate::infrastructure::persistence::PegoutQuoteRepository;
use std::sync::Arc;

const ID: UseCaseId = UseCaseId::InitPegoutDepositCache;

/// Use case for warming the pegout deposit cache.
#[derive(Debug)]
pub struct InitPegoutDepositCacheUseCase {
    pegout_repository: Arc<dyn PegoutQuoteRepository>,
    lbc: Arc<dyn LiquidityBridgeContract>,
    rsk_rpc: Arc<dyn RootstockRpc>,
}

impl InitPegoutDepositCacheUseCase {
    /// Creates a new InitPegoutDepositCacheUseCase.
    #[must_use]
    pub fn new(
        pegout_repository: Arc<dyn PegoutQuoteRepository>,
        lbc: Arc<dyn LiquidityBridgeContract>,
        rsk_rpc: Arc<dyn RootstockRpc>,
    ) -> Self {
        Self {
            pegout_repository,
            lbc,
            rsk_rpc,
        }
    }

    /// Stores every deposit of the last `blocks` blocks and returns how many
    /// were found.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the height, the events or the
    /// upsert fail.
    pub async fn execute(&self, blocks: u64) -> UseCaseResult<usize> {
        let height = self
            .rsk_rpc
            .get_height()
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        let from_block = height.saturating_sub(blocks);
        let deposits = self
            .lbc
            .get_deposit_events(from_block, height)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        let found = deposits.len();
        self.pegout_repository
            .upsert_pegout_deposits(deposits)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        tracing::info!(from_block, to_block = height, deposits = found, "pegout deposit cache loaded");
        Ok(found)
    }
}
