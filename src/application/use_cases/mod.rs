//! # Use Cases
//!
//! Quote lifecycle operations of the liquidity provider.
//!
//! Each use case orchestrates the repositories, chain ports and event bus
//! for one step of a pegin or pegout. Handlers that move funds record
//! terminal failures on the quote and leave retryable ones for the next
//! watcher tick.
//!
//! ## Pegout
//!
//! - [`AcceptPegoutQuoteUseCase`]: Reserve liquidity and retain a quote
//! - [`UpdatePegoutDepositUseCase`]: Record the user's RSK deposit
//! - [`SendPegoutUseCase`]: Pay the user in BTC
//! - [`RefundPegoutUseCase`]: Claim the refund from the contract
//! - [`BridgePegoutUseCase`]: Forward refunded RBTC to the bridge
//! - [`UpdateBtcReleaseUseCase`]: Mark quotes released by a bridge batch
//!
//! ## Pegin
//!
//! - [`AcceptPeginQuoteUseCase`]: Reserve liquidity and derive the deposit address
//! - [`CallForUserUseCase`]: Advance the user's RBTC call
//! - [`RegisterPeginUseCase`]: Prove the BTC deposit to the bridge

pub mod accept_pegin_quote;
pub mod accept_pegout_quote;
pub mod bridge_pegout;
pub mod call_for_user;
pub mod collateral;
pub mod init_pegout_deposit_cache;
pub mod recommended_pegin;
pub mod recommended_pegout;
pub mod refund_pegout;
pub mod register_pegin;
pub mod send_pegout;
pub mod trusted_accounts;
pub mod update_btc_release;
pub mod update_pegout_deposit;


pub use accept_pegin_quote::AcceptPeginQuoteUseCase;
pub use accept_pegout_quote::{AcceptPegoutQuoteUseCase, AcceptedQuote};
pub use bridge_pegout::BridgePegoutUseCase;
pub use call_for_user::CallForUserUseCase;
pub use collateral::CollateralUseCase;
pub use init_pegout_deposit_cache::InitPegoutDepositCacheUseCase;
pub use recommended_pegin::RecommendedPeginUseCase;
pub use recommended_pegout::RecommendedPegoutUseCase;
pub use refund_pegout::RefundPegoutUseCase;
pub use register_pegin::RegisterPeginUseCase;
pub use send_pegout::SendPegoutUseCase;
pub use trusted_accounts::TrustedAccountsUseCase;
pub use update_btc_release::UpdateBtcReleaseUseCase;
pub use update_pegout_deposit::UpdatePegoutDepositUseCase;
