//! # Accept Pegin Quote Use Case
//!
//! Commits the LP to a pegin quote.
//!
//! This use case orchestrates:
//! - Pause, existence and expiry checks
//! - Trusted account signature recovery and RBTC locking cap enforcement
//! - Liquidity reservation under the pegin liquidity guard
//! - Derivation of the flyover deposit address by the bridge
//! - Signing, persistence and the acceptance event

use crate::application::error::{ErrorKind, UseCaseError, UseCaseId, UseCaseResult};
use crate::application::guard::{GuardedResource, LiquidityGuards};
use crate::application::use_cases::accept_pegout_quote::AcceptedQuote;
use crate::application::use_cases::trusted_accounts::{check_locking_cap, signing_account};
use crate::domain::entities::{PeginQuote, RetainedPeginQuote, TrustedAccountDetails};
use crate::domain::events::{AcceptedPeginQuote, EventMetadata, QuoteEvent};
use crate::domain::services::liquidity_provider::PeginLiquidityProvider;
use crate::domain::value_objects::{PeginState, QuoteHash, Wei, validate_quote_hash};
use crate::infrastructure::blockchain::{
    Bridge, FlyoverDerivationArgs, LiquidityBridgeContract, RootstockRpc,
};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::persistence::{PeginQuoteRepository, TrustedAccountRepository};
use std::sync::Arc;

const ID: UseCaseId = UseCaseId::AcceptPeginQuote;

/// Use case for accepting pegin quotes.
#[derive(Debug)]
pub struct AcceptPeginQuoteUseCase {
    pegin_repository: Arc<dyn PeginQuoteRepository>,
    trusted_accounts: Arc<dyn TrustedAccountRepository>,
    lbc: Arc<dyn LiquidityBridgeContract>,
    bridge: Arc<dyn Bridge>,
    rsk_rpc: Arc<dyn RootstockRpc>,
    provider: Arc<dyn PeginLiquidityProvider>,
    event_bus: Arc<dyn EventBus>,
    guards: LiquidityGuards,
}

impl AcceptPeginQuoteUseCase {
    /// Creates a new AcceptPeginQuoteUseCase with all dependencies.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        pegin_repository: Arc<dyn PeginQuoteRepository>,
        trusted_accounts: Arc<dyn TrustedAccountRepository>,
        lbc: Arc<dyn LiquidityBridgeContract>,
        bridge: Arc<dyn Bridge>,
        rsk_rpc: Arc<dyn RootstockRpc>,
        provider: Arc<dyn PeginLiquidityProvider>,
        event_bus: Arc<dyn EventBus>,
        guards: LiquidityGuards,
    ) -> Self {
        Self {
            pegin_repository,
            trusted_accounts,
            lbc,
            bridge,
            rsk_rpc,
            provider,
            event_bus,
            guards,
        }
    }

    /// Executes the accept pegin quote use case.
    ///
    /// Accepting an already accepted quote returns the stored signature and
    /// deposit address.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The hash is malformed or the contract is paused
    /// - The quote does not exist or its deposit window closed
    /// - The signer is not a valid trusted account or exceeds its cap
    /// - The LP lacks liquidity
    /// - The deposit address cannot be derived
    /// - Signing or persistence fails
    pub async fn execute(
        &self,
        quote_hash: &str,
        signature: Option<&str>,
    ) -> UseCaseResult<AcceptedQuote> {
        validate_quote_hash(quote_hash).map_err(|e| {
            UseCaseError::new(ID, ErrorKind::InvalidInput)
                .caused_by(e)
                .with_quote_hash(quote_hash)
        })?;

        let status = self
            .lbc
            .paused_status()
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        if status.is_paused {
            return Err(UseCaseError::new(ID, ErrorKind::Paused).caused_by(status.reason));
        }

        let quote = self
            .pegin_repository
            .get_quote(quote_hash)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash))?
            .ok_or_else(|| UseCaseError::new(ID, ErrorKind::NotFound).with_quote_hash(quote_hash))?;
        if quote.is_expired() {
            return Err(UseCaseError::new(ID, ErrorKind::Expired).with_quote_hash(quote_hash));
        }

        let trusted_account = match signature {
            Some(signature) => Some(
                signing_account(
                    self.trusted_accounts.as_ref(),
                    self.provider.as_ref(),
                    ID,
                    quote_hash,
                    signature,
                )
                .await?,
            ),
            None => None,
        };

        let _guard = self.guards.acquire(GuardedResource::PeginLiquidity).await;

        if let Some(retained) = self
            .pegin_repository
            .get_retained_quote(quote_hash)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash))?
        {
            tracing::debug!(quote_hash, "pegin quote already accepted");
            return Ok(AcceptedQuote {
                signature: retained.signature,
                deposit_address: retained.deposit_address,
            });
        }

        let gas_price = self
            .rsk_rpc
            .gas_price()
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        let extra_gas = self.provider.pegin_configuration().call_for_user_extra_gas;
        let required_liquidity = quote.required_liquidity(extra_gas, gas_price).map_err(|e| {
            UseCaseError::new(ID, ErrorKind::InvalidInput)
                .caused_by(e)
                .with_quote_hash(quote_hash)
        })?;

        if let Some(account) = &trusted_account {
            self.check_cap(account, required_liquidity).await?;
        }

        let has_liquidity = self
            .provider
            .has_pegin_liquidity(required_liquidity)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash))?;
        if !has_liquidity {
            return Err(UseCaseError::new(ID, ErrorKind::NoLiquidity)
                .with_quote_hash(quote_hash)
                .with_required(required_liquidity));
        }

        let deposit_address = self.deposit_address(quote_hash, &quote).await?;
        let lp_signature = self
            .provider
            .sign_quote(quote_hash)
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash))?;

        let mut retained =
            RetainedPeginQuote::new(quote_hash, deposit_address, lp_signature, required_liquidity);
        if let Some(account) = &trusted_account {
            retained.owner_account_address = account.address.clone();
        }
        retained.validate().map_err(|e| {
            UseCaseError::new(ID, ErrorKind::ValidationFailed)
                .caused_by(e)
                .with_quote_hash(quote_hash)
        })?;

        self.pegin_repository
            .insert_retained_quote(retained.clone())
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash))?;

        tracing::info!(
            quote_hash,
            required_liquidity = %required_liquidity,
            deposit_address = %retained.deposit_address,
            "pegin quote accepted"
        );

        let accepted = AcceptedQuote {
            signature: retained.signature.clone(),
            deposit_address: retained.deposit_address.clone(),
        };
        self.event_bus
            .publish(QuoteEvent::AcceptedPeginQuote(AcceptedPeginQuote {
                metadata: EventMetadata::new(),
                quote,
                retained_quote: retained,
            }));
        Ok(accepted)
    }

    async fn deposit_address(&self, quote_hash: &str, quote: &PeginQuote) -> UseCaseResult<String> {
        let hash_bytes = QuoteHash::parse(quote_hash)
            .and_then(|hash| hash.to_bytes())
            .map_err(|e| UseCaseError::new(ID, ErrorKind::InvalidInput).caused_by(e))?;
        self.bridge
            .flyover_deposit_address(FlyoverDerivationArgs {
                quote_hash: hash_bytes,
                user_btc_refund_address: quote.btc_refund_address.clone(),
                lp_btc_address: quote.lp_btc_address.clone(),
                lbc_address: quote.lbc_address.clone(),
            })
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e).with_quote_hash(quote_hash))
    }

    async fn check_cap(
        &self,
        account: &TrustedAccountDetails,
        required: Wei,
    ) -> UseCaseResult<()> {
        let active = self
            .pegin_repository
            .get_retained_quotes_for_address(&account.address, &PeginState::active())
            .await
            .map_err(|e| UseCaseError::infrastructure(ID, e))?;
        check_locking_cap(
            ID,
            account,
            active.iter().map(|q| q.required_liquidity),
            required,
            account.rbtc_locking_cap,
        )
    }
}
