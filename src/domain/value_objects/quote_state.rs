//! # Quote States
//!
//! Lifecycle states of retained pegout and pegin quotes.
//!
//! # Pegout
//!
//! ```text
//! WaitingForDeposit -> WaitingForDepositConfirmations
//!     -> TimeForDepositElapsed | SendPegoutSucceeded | SendPegoutFailed
//! SendPegoutSucceeded -> RefundPegOutSucceeded | RefundPegOutFailed
//! RefundPegOutSucceeded -> BridgeTxSucceeded | BridgeTxFailed
//! BridgeTxSucceeded -> BtcReleased
//! ```
//!
//! # Pegin
//!
//! ```text
//! WaitingForDeposit -> WaitingForDepositConfirmations
//!     -> TimeForDepositElapsed | CallForUserSucceeded | CallForUserFailed
//! CallForUserSucceeded -> RegisterPegInSucceeded | RegisterPegInFailed
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a retained pegout quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PegoutState {
    /// Accepted, waiting for the user's RSK deposit.
    WaitingForDeposit,
    /// Deposit seen, waiting for enough RSK confirmations.
    WaitingForDepositConfirmations,
    /// The user never deposited in time.
    TimeForDepositElapsed,
    /// BTC was sent to the user.
    SendPegoutSucceeded,
    /// Sending BTC to the user failed.
    SendPegoutFailed,
    /// The LP claimed the user's deposit from the contract.
    RefundPegOutSucceeded,
    /// The refund claim failed.
    RefundPegOutFailed,
    /// The refunded RBTC was sent to the bridge.
    BridgeTxSucceeded,
    /// Sending the refunded RBTC to the bridge failed.
    BridgeTxFailed,
    /// The bridge released the BTC back to the LP.
    BtcReleased,
}

impl PegoutState {
    /// Returns all states.
    #[must_use]
    pub const fn all() -> [Self; 10] {
        [
            Self::WaitingForDeposit,
            Self::WaitingForDepositConfirmations,
            Self::TimeForDepositElapsed,
            Self::SendPegoutSucceeded,
            Self::SendPegoutFailed,
            Self::RefundPegOutSucceeded,
            Self::RefundPegOutFailed,
            Self::BridgeTxSucceeded,
            Self::BridgeTxFailed,
            Self::BtcReleased,
        ]
    }

    /// Returns the states in which the quote still holds LP liquidity.
    #[must_use]
    pub const fn active() -> [Self; 2] {
        [Self::WaitingForDeposit, Self::WaitingForDepositConfirmations]
    }

    /// Returns true if no further transition leaves this state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::TimeForDepositElapsed
                | Self::SendPegoutFailed
                | Self::RefundPegOutFailed
                | Self::BridgeTxFailed
                | Self::BtcReleased
        )
    }

    /// Returns the state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WaitingForDeposit => "WaitingForDeposit",
            Self::WaitingForDepositConfirmations => "WaitingForDepositConfirmations",
            Self::TimeForDepositElapsed => "TimeForDepositElapsed",
            Self::SendPegoutSucceeded => "SendPegoutSucceeded",
            Self::SendPegoutFailed => "SendPegoutFailed",
            Self::RefundPegOutSucceeded => "RefundPegOutSucceeded",
            Self::RefundPegOutFailed => "RefundPegOutFailed",
            Self::BridgeTxSucceeded => "BridgeTxSucceeded",
            Self::BridgeTxFailed => "BridgeTxFailed",
            Self::BtcReleased => "BtcReleased",
        }
    }
}

impl fmt::Display for PegoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a retained pegin quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeginState {
    /// Accepted, waiting for the user's BTC deposit.
    WaitingForDeposit,
    /// Deposit seen, waiting for enough BTC confirmations.
    WaitingForDepositConfirmations,
    /// The user never deposited in time.
    TimeForDepositElapsed,
    /// The LP performed the call on behalf of the user.
    CallForUserSucceeded,
    /// The call on behalf of the user failed.
    CallForUserFailed,
    /// The pegin was registered in the bridge.
    RegisterPegInSucceeded,
    /// Registering the pegin failed.
    RegisterPegInFailed,
}

impl PeginState {
    /// Returns the states in which the quote still holds LP liquidity.
    #[must_use]
    pub const fn active() -> [Self; 2] {
        [Self::WaitingForDeposit, Self::WaitingForDepositConfirmations]
    }

    /// Returns true if no further transition leaves this state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::TimeForDepositElapsed
                | Self::CallForUserFailed
                | Self::RegisterPegInSucceeded
                | Self::RegisterPegInFailed
        )
    }

    /// Returns the state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WaitingForDeposit => "WaitingForDeposit",
            Self::WaitingForDepositConfirmations => "WaitingForDepositConfirmations",
            Self::TimeForDepositElapsed => "TimeForDepositElapsed",
            Self::CallForUserSucceeded => "CallForUserSucceeded",
            Self::CallForUserFailed => "CallForUserFailed",
            Self::RegisterPegInSucceeded => "RegisterPegInSucceeded",
            Self::RegisterPegInFailed => "RegisterPegInFailed",
        }
    }
}

impl fmt::Display for PeginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
