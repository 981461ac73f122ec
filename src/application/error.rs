//! # Application Errors
//!
//! The single error type surfaced by every use case.
//!
//! A [`UseCaseError`] names the use case that failed, classifies the
//! failure with an [`ErrorKind`], carries typed context for observability
//! and keeps every underlying cause, so a persistence error raised while
//! recording a failure is reported alongside the original one.
//!
//! # Error Kinds
//!
//! ```text
//! ErrorKind
//! ├── NotFound, Expired, WrongState        - Quote lookups and lifecycle
//! ├── InsufficientAmount, NoLiquidity      - Money checks
//! ├── LockingCapExceeded, Tampered...      - Trusted accounts
//! ├── NoEnoughConfirmations, TxBelowMinimum
//! ├── ValidationFailed, InvalidInput       - Input and struct checks
//! └── Infrastructure, Paused, ...          - Everything else
//! ```
//!
//! # Examples
//!
//! ```
//! use liquidity_provider::application::error::{ErrorKind, UseCaseError, UseCaseId};
//!
//! let err = UseCaseError::new(UseCaseId::SendPegout, ErrorKind::Expired)
//!     .with_quote_hash("ab12");
//! assert!(err.is(ErrorKind::Expired));
//! assert_eq!(err.to_string(), "SendPegout: expired quote. quote_hash: ab12");
//! ```

use crate::domain::value_objects::Wei;
use std::fmt;

/// Identifier of a use case, prefixed to its errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UseCaseId {
    /// Accept a pegout quote.
    AcceptPegoutQuote,
    /// Pay the BTC of a pegout.
    SendPegout,
    /// Claim a pegout deposit.
    RefundPegout,
    /// Forward refunded RBTC to the bridge.
    BridgePegout,
    /// Record a bridge release.
    UpdateBtcRelease,
    /// Record a user pegout deposit.
    UpdatePegoutDeposit,
    /// Load recent pegout deposits.
    InitPegoutDepositCache,
    /// Recommend a pegout value.
    RecommendedPegout,
    /// Accept a pegin quote.
    AcceptPeginQuote,
    /// Call the destination of a pegin.
    CallForUser,
    /// Register a pegin with the bridge.
    RegisterPegin,
    /// Recommend a pegin value.
    RecommendedPegin,
    /// Read or change collateral.
    Collateral,
    /// Read or change trusted accounts.
    TrustedAccounts,
}

impl UseCaseId {
    /// Returns the identifier as written in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AcceptPegoutQuote => "AcceptPegoutQuote",
            Self::SendPegout => "SendPegout",
            Self::RefundPegout => "RefundPegout",
            Self::BridgePegout => "BridgePegout",
            Self::UpdateBtcRelease => "UpdateBtcRelease",
            Self::UpdatePegoutDeposit => "UpdatePegoutDeposit",
            Self::InitPegoutDepositCache => "InitPegoutDepositCache",
            Self::RecommendedPegout => "RecommendedPegout",
            Self::AcceptPeginQuote => "AcceptPeginQuote",
            Self::CallForUser => "CallForUser",
            Self::RegisterPegin => "RegisterPegin",
            Self::RecommendedPegin => "RecommendedPegin",
            Self::Collateral => "Collateral",
            Self::TrustedAccounts => "TrustedAccounts",
        }
    }
}

impl fmt::Display for UseCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a use case failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A quote or record does not exist.
    NotFound,
    /// The quote expired.
    Expired,
    /// The record is not in the state the operation requires.
    WrongState,
    /// An amount is below what is required.
    InsufficientAmount,
    /// The LP cannot cover the amount.
    NoLiquidity,
    /// A trusted account would exceed its locking cap.
    LockingCapExceeded,
    /// A trusted account record does not match its signature.
    TamperedTrustedAccount,
    /// The signer is not a trusted account.
    TrustedAccountNotFound,
    /// The trusted account already exists.
    DuplicateTrustedAccount,
    /// A transaction lacks confirmations.
    NoEnoughConfirmations,
    /// The amount is below the bridge minimum.
    TxBelowMinimum,
    /// A record misses required fields or an amount is out of range.
    ValidationFailed,
    /// A repository, wallet or RPC call failed.
    Infrastructure,
    /// The contract is paused.
    Paused,
    /// A deposit arrived for a quote not waiting for it.
    IllegalState,
    /// The caller supplied unusable input.
    InvalidInput,
    /// The operation can never succeed for this quote.
    NonRecoverable,
}

impl ErrorKind {
    /// Returns the base message of the kind.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::NotFound => "quote not found",
            Self::Expired => "expired quote",
            Self::WrongState => "quote with wrong state",
            Self::InsufficientAmount => "insufficient amount",
            Self::NoLiquidity => "not enough liquidity",
            Self::LockingCapExceeded => "locking cap exceeded",
            Self::TamperedTrustedAccount => "trusted account information was tampered",
            Self::TrustedAccountNotFound => "trusted account not found",
            Self::DuplicateTrustedAccount => "trusted account already exists",
            Self::NoEnoughConfirmations => "not enough confirmations for transaction",
            Self::TxBelowMinimum => "requested amount below bridge's min transaction value",
            Self::ValidationFailed => "validation failed",
            Self::Infrastructure => "infrastructure error",
            Self::Paused => "protocol is paused",
            Self::IllegalState => "illegal quote state",
            Self::InvalidInput => "invalid input",
            Self::NonRecoverable => "non recoverable error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Typed context attached to a use case error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Quote the operation was about.
    pub quote_hash: Option<String>,
    /// Lifecycle state observed.
    pub state: Option<String>,
    /// Amount involved.
    pub amount: Option<Wei>,
    /// Amount that was required.
    pub required: Option<Wei>,
    /// Address involved.
    pub address: Option<String>,
}

impl ErrorContext {
    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = Vec::new();
        if let Some(hash) = &self.quote_hash {
            fields.push(format!("quote_hash: {hash}"));
        }
        if let Some(state) = &self.state {
            fields.push(format!("state: {state}"));
        }
        if let Some(amount) = &self.amount {
            fields.push(format!("amount: {amount}"));
        }
        if let Some(required) = &self.required {
            fields.push(format!("required: {required}"));
        }
        if let Some(address) = &self.address {
            fields.push(format!("address: {address}"));
        }
        f.write_str(&fields.join(", "))
    }
}

/// Error returned by every use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseCaseError {
    use_case: UseCaseId,
    kind: ErrorKind,
    context: ErrorContext,
    causes: Vec<String>,
}

impl UseCaseError {
    /// Creates an error of `kind` raised by `use_case`.
    #[must_use]
    pub fn new(use_case: UseCaseId, kind: ErrorKind) -> Self {
        Self {
            use_case,
            kind,
            context: ErrorContext::default(),
            causes: Vec::new(),
        }
    }

    /// Creates an [`ErrorKind::Infrastructure`] error wrapping `cause`.
    #[must_use]
    pub fn infrastructure(use_case: UseCaseId, cause: impl fmt::Display) -> Self {
        Self::new(use_case, ErrorKind::Infrastructure).caused_by(cause)
    }

    /// Appends an underlying cause.
    #[must_use]
    pub fn caused_by(mut self, cause: impl fmt::Display) -> Self {
        self.causes.push(cause.to_string());
        self
    }

    /// Joins another error into this one, keeping both.
    pub fn join(&mut self, other: impl fmt::Display) {
        self.causes.push(other.to_string());
    }

    /// Sets the quote hash context.
    #[must_use]
    pub fn with_quote_hash(mut self, quote_hash: impl Into<String>) -> Self {
        self.context.quote_hash = Some(quote_hash.into());
        self
    }

    /// Sets the state context.
    #[must_use]
    pub fn with_state(mut self, state: impl fmt::Display) -> Self {
        self.context.state = Some(state.to_string());
        self
    }

    /// Sets the amount context.
    #[must_use]
    pub fn with_amount(mut self, amount: Wei) -> Self {
        self.context.amount = Some(amount);
        self
    }

    /// Sets the required amount context.
    #[must_use]
    pub fn with_required(mut self, required: Wei) -> Self {
        self.context.required = Some(required);
        self
    }

    /// Sets the address context.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.context.address = Some(address.into());
        self
    }

    /// Returns true if the error is of `kind`.
    #[must_use]
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Returns the use case that failed.
    #[must_use]
    pub const fn use_case(&self) -> UseCaseId {
        self.use_case
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the context.
    #[must_use]
    pub const fn context(&self) -> &ErrorContext {
        &self.context
    }

    /// Returns the underlying causes, oldest first.
    #[must_use]
    pub fn causes(&self) -> &[String] {
        &self.causes
    }
}

impl fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.use_case, self.kind)?;
        if !self.causes.is_empty() {
            write!(f, ": {}", self.causes.join("; "))?;
        }
        if !self.context.is_empty() {
            write!(f, ". {}", self.context)?;
        }
        Ok(())
    }
}

impl std::error::Error for UseCaseError {}

/// Result type for use cases.
pub type UseCaseResult<T> = Result<T, UseCaseError>;
