//! # Domain Entities
//!
//! Quote terms, their lifecycle records and the records observed on chain.
//!
//! ## Pegout
//!
//! - [`PegoutQuote`]: Terms of an RBTC to BTC transfer
//! - [`RetainedPegoutQuote`]: Lifecycle record of an accepted pegout
//! - [`PegoutDeposit`]: User deposit seen on the contract
//! - [`BatchPegOut`]: Bridge release covering several pegouts
//!
//! ## Pegin
//!
//! - [`PeginQuote`]: Terms of a BTC to RBTC transfer
//! - [`RetainedPeginQuote`]: Lifecycle record of an accepted pegin
//!
//! ## Accounts
//!
//! - [`TrustedAccountDetails`]: Locking caps of a trusted account
//! - [`Signed`]: A value stored with the LP signature over its hash

pub mod batch_pegout;
pub mod pegin_quote;
pub mod pegout_deposit;
pub mod pegout_quote;
pub mod trusted_account;

#[cfg(test)]
pub(crate) mod fixtures;

pub use batch_pegout::BatchPegOut;
pub use pegin_quote::{PeginQuote, RetainedPeginQuote, WatchedPeginQuote};
pub use pegout_deposit::PegoutDeposit;
pub use pegout_quote::{PegoutCreationData, PegoutQuote, RetainedPegoutQuote, WatchedPegoutQuote};
pub use trusted_account::{Signed, TrustedAccountDetails, normalize_address};
