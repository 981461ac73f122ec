//! # Collateral Use Case
//!
//! Reads, tops up and withdraws the LP's pegin and pegout collateral on the
//! liquidity bridge contract.

use crate::application::error::{ErrorKind, UseCaseError, UseCaseId, UseCaseResult};
use crate::domain::services::liquidity_provider::LiquidityProvider;
use crate::domain::value_objects::Wei;
use crate::domain::value_objects::arithmetic::CheckedArithmetic;
use crate::infrastructure::blockchain::LiquidityBridgeContract;
use std::sync::Arc;

const ID: UseCaseId = UseCaseId::Collateral;

/// Which of the two collateral pools an operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pool {
    Pegin,
    Pegout,
}

/// Use case for managing the LP collateral.
#[derive(Debug)]
pub struct CollateralUseCase {
    lbc: Arc<dyn LiquidityBridgeContract>,
    provider: Arc<dyn LiquidityProvider>,
}

impl CollateralUseCase {
    /// Creates a new CollateralUseCase.
    #[must_use]
    pub fn new(lbc: Arc<dyn LiquidityBridgeContract>, provider: Arc<dyn LiquidityProvider>) -> Self {
        Self { lbc, provider }
    }

    /// Returns the pegin collateral of the LP.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the contract cannot be read.
    pub async fn get(&self) -> UseCaseResult<Wei> {
        self.current(Pool::Pegin).await
    }

    /// Returns the pegout collateral of the LP.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the contract cannot be read.
    pub async fn get_pegout(&self) -> UseCaseResult<Wei> {
        self.current(Pool::Pegout).await
    }

    /// Adds `amount` to the pegin collateral and returns the new total.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InsufficientAmount`] if the total would stay
    /// below the contract minimum, or an infrastructure error.
    pub async fn add(&self, amount: Wei) -> UseCaseResult<Wei> {
        self.top_up(Pool::Pegin, amount).await
    }

    /// Adds `amount` to the pegout collateral and returns the new total.
    ///
    /// # Errors
    ///
    /// Same as [`CollateralUseCase::add`].
    pub async fn add_pegout(&self, amount: Wei) -> UseCaseResult<Wei> {
        self.top_up(Pool::Pegout, amount).await
    }

    /// Withdraws the whole pegin collateral.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the contract call fails.
    pub async fn withdraw(&self) -> UseCaseResult<()> {
        self.lbc
            .withdraw_collateral()
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        tracing::info!("pegin collateral withdrawn");
        Ok(())
    }

    /// Withdraws the whole pegout collateral.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the contract call fails.
    pub async fn withdraw_pegout(&self) -> UseCaseResult<()> {
        self.lbc
            .withdraw_pegout_collateral()
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        tracing::info!("pegout collateral withdrawn");
        Ok(())
    }

    async fn current(&self, pool: Pool) -> UseCaseResult<Wei> {
        let address = self.provider.rsk_address();
        let collateral = match pool {
            Pool::Pegin => self.lbc.get_collateral(&address).await,
            Pool::Pegout => self.lbc.get_pegout_collateral(&address).await,
        };
        collateral.map_err(|e| UseCaseError::infrastructure(ID, e))
    }

    async fn top_up(&self, pool: Pool, amount: Wei) -> UseCaseResult<Wei> {
        let minimum = self
            .lbc
            .get_minimum_collateral()
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        let current = self.current(pool).await?;
        let total = current.safe_add(amount).map_err(|e| {
            UseCaseError::new(ID, ErrorKind::InvalidInput)
                .caused_by(e)
                .with_amount(amount)
        })?;
        if total < minimum {
            return Err(UseCaseError::new(ID, ErrorKind::InsufficientAmount)
                .with_amount(total)
                .with_required(minimum));
        }

        let added = match pool {
            Pool::Pegin => self.lbc.add_collateral(amount).await,
            Pool::Pegout => self.lbc.add_pegout_collateral(amount).await,
        };
        added.map_err(|e| UseCaseError::infrastructure(ID, e))?;
        tracing::info!(?pool, %amount, %total, "collateral added");
        Ok(total)
    }
}
