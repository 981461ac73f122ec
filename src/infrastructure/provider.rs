//! # Local Liquidity Provider
//!
//! In-process implementation of the LP capability: signs with a local key
//! and measures free liquidity as wallet balances minus what accepted
//! quotes still hold.

use crate::domain::services::liquidity_provider::{
    LiquidityProvider, PeginConfiguration, PeginLiquidityProvider, PegoutConfiguration,
    PegoutLiquidityProvider, ProviderError, ProviderResult,
};
use crate::domain::value_objects::{PeginState, PegoutState, Wei};
use crate::infrastructure::blockchain::{BitcoinWallet, LiquidityBridgeContract, RootstockRpc};
use crate::infrastructure::persistence::{PegoutQuoteRepository, PeginQuoteRepository};
use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::utils::hex;
use std::sync::Arc;

/// Pegout records whose liquidity is still committed.
const PEGOUT_LOCKING_STATES: [PegoutState; 3] = [
    PegoutState::WaitingForDeposit,
    PegoutState::WaitingForDepositConfirmations,
    PegoutState::SendPegoutFailed,
];

/// Pegin records whose liquidity is still committed.
const PEGIN_LOCKING_STATES: [PeginState; 2] =
    [PeginState::WaitingForDeposit, PeginState::CallForUserFailed];

/// Chain clients and stores the provider reads balances from.
#[derive(Debug, Clone)]
pub struct ProviderSources {
    /// LP Bitcoin wallet.
    pub btc_wallet: Arc<dyn BitcoinWallet>,
    /// RSK RPC.
    pub rsk_rpc: Arc<dyn RootstockRpc>,
    /// Liquidity bridge contract.
    pub lbc: Arc<dyn LiquidityBridgeContract>,
    /// Pegout store.
    pub pegout_repository: Arc<dyn PegoutQuoteRepository>,
    /// Pegin store.
    pub pegin_repository: Arc<dyn PeginQuoteRepository>,
}

/// LP capability backed by a local private key.
#[derive(Debug)]
pub struct LocalLiquidityProvider {
    signer: LocalWallet,
    btc_address: String,
    sources: ProviderSources,
    pegout_configuration: PegoutConfiguration,
    pegin_configuration: PeginConfiguration,
}

impl LocalLiquidityProvider {
    /// Creates a provider signing with `signer`.
    #[must_use]
    pub fn new(
        signer: LocalWallet,
        btc_address: impl Into<String>,
        sources: ProviderSources,
        pegout_configuration: PegoutConfiguration,
        pegin_configuration: PeginConfiguration,
    ) -> Self {
        Self {
            signer,
            btc_address: btc_address.into(),
            sources,
            pegout_configuration,
            pegin_configuration,
        }
    }

    /// Parses a hex private key into a signer.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Signing`] if the key is malformed.
    pub fn signer_from_key(private_key: &str) -> ProviderResult<LocalWallet> {
        private_key
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(ProviderError::signing)
    }

    fn locked(amounts: impl IntoIterator<Item = Wei>) -> ProviderResult<Wei> {
        Wei::checked_sum(amounts).map_err(ProviderError::liquidity)
    }
}

#[async_trait]
impl LiquidityProvider for LocalLiquidityProvider {
    fn rsk_address(&self) -> String {
        format!("{:#x}", self.signer.address())
    }

    fn btc_address(&self) -> String {
        self.btc_address.clone()
    }

    async fn sign_quote(&self, hash: &str) -> ProviderResult<String> {
        let bytes = hex::decode(hash.trim_start_matches("0x")).map_err(ProviderError::signing)?;
        let signature = self
            .signer
            .sign_message(bytes)
            .await
            .map_err(ProviderError::signing)?;
        Ok(hex::encode(signature.to_vec()))
    }
}

#[async_trait]
impl PegoutLiquidityProvider for LocalLiquidityProvider {
    async fn has_pegout_liquidity(&self, required: Wei) -> ProviderResult<bool> {
        let balance = self
            .sources
            .btc_wallet
            .get_balance()
            .await
            .map_err(ProviderError::liquidity)?;
        let quotes = self
            .sources
            .pegout_repository
            .get_retained_quote_by_state(&PEGOUT_LOCKING_STATES)
            .await
            .map_err(ProviderError::liquidity)?;
        let locked = Self::locked(quotes.iter().map(|q| q.required_liquidity))?;
        let available = balance.saturating_sub(locked);
        tracing::debug!(%balance, %locked, %required, "checking pegout liquidity");
        Ok(available >= required)
    }

    fn pegout_configuration(&self) -> PegoutConfiguration {
        self.pegout_configuration.clone()
    }
}

#[async_trait]
impl PeginLiquidityProvider for LocalLiquidityProvider {
    async fn has_pegin_liquidity(&self, required: Wei) -> ProviderResult<bool> {
        let address = self.rsk_address();
        let (rsk_balance, lbc_balance) = futures::try_join!(
            self.sources.rsk_rpc.get_balance(&address),
            self.sources.lbc.get_balance(&address),
        )
        .map_err(ProviderError::liquidity)?;
        let quotes = self
            .sources
            .pegin_repository
            .get_retained_quote_by_state(&PEGIN_LOCKING_STATES)
            .await
            .map_err(ProviderError::liquidity)?;
        let locked = Self::locked(quotes.iter().map(|q| q.required_liquidity))?;
        let available = rsk_balance.saturating_add(lbc_balance).saturating_sub(locked);
        tracing::debug!(%rsk_balance, %lbc_balance, %locked, %required, "checking pegin liquidity");
        Ok(available >= required)
    }

    fn pegin_configuration(&self) -> PeginConfiguration {
        self.pegin_configuration.clone()
    }
}
