//! # Liquidity Guards
//!
//! Mutual-exclusion regions around the shared resources the use cases
//! check and then spend:
//!
//! - pegout liquidity accounting
//! - pegin liquidity accounting
//! - the RSK wallet
//! - the BTC wallet
//!
//! A guard is released when the returned [`ResourceGuard`] is dropped, so
//! every exit path of a critical section releases it. No code path holds
//! two guards at once.

use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Held lock over one guarded resource.
pub type ResourceGuard = OwnedMutexGuard<()>;

/// Shared resource serialized by a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardedResource {
    /// Pegout liquidity reservation.
    PegoutLiquidity,
    /// Pegin liquidity reservation.
    PeginLiquidity,
    /// Sends from the RSK wallet.
    RskWallet,
    /// Sends from the BTC wallet.
    BtcWallet,
}

/// Set of guards shared by every use case of one LP.
///
/// Clones share the same locks.
#[derive(Debug, Clone, Default)]
pub struct LiquidityGuards {
    pegout: Arc<Mutex<()>>,
    pegin: Arc<Mutex<()>>,
    rsk_wallet: Arc<Mutex<()>>,
    btc_wallet: Arc<Mutex<()>>,
}

impl LiquidityGuards {
    /// Creates a fresh set of guards.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and takes the guard of `resource`.
    pub async fn acquire(&self, resource: GuardedResource) -> ResourceGuard {
        let guard = Arc::clone(self.lock(resource)).lock_owned().await;
        tracing::trace!(?resource, "guard acquired");
        guard
    }

    /// Returns true if `resource` is currently held.
    #[must_use]
    pub fn is_held(&self, resource: GuardedResource) -> bool {
        self.lock(resource).try_lock().is_err()
    }

    fn lock(&self, resource: GuardedResource) -> &Arc<Mutex<()>> {
        match resource {
            GuardedResource::PegoutLiquidity => &self.pegout,
            GuardedResource::PeginLiquidity => &self.pegin,
            GuardedResource::RskWallet => &self.rsk_wallet,
            GuardedResource::BtcWallet => &self.btc_wallet,
        }
    }
}
