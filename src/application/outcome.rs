//! # Failure Outcome
//!
//! Two-variant failure used inside the lifecycle use cases.
//!
//! Helpers return [`Failure::Retryable`] for transient conditions (I/O,
//! missing confirmations, the bridge not having seen a transaction yet) and
//! [`Failure::Terminal`] when the quote can never complete. Each use case
//! has a single top-level handler: a terminal failure marks the record
//! failed, persists it and publishes the completion event, a retryable one
//! is returned untouched.

use crate::application::error::{ErrorKind, UseCaseError, UseCaseId};
use std::fmt;

/// Failure of a lifecycle step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Leave the record as is and retry later.
    Retryable(UseCaseError),
    /// Mark the record failed.
    Terminal(UseCaseError),
}

impl Failure {
    /// Creates a retryable failure of `kind`.
    #[must_use]
    pub fn retryable(use_case: UseCaseId, kind: ErrorKind) -> Self {
        Self::Retryable(UseCaseError::new(use_case, kind))
    }

    /// Creates a terminal failure of `kind`.
    #[must_use]
    pub fn terminal(use_case: UseCaseId, kind: ErrorKind) -> Self {
        Self::Terminal(UseCaseError::new(use_case, kind))
    }

    /// Creates a retryable infrastructure failure wrapping `cause`.
    #[must_use]
    pub fn transient(use_case: UseCaseId, cause: impl fmt::Display) -> Self {
        Self::Retryable(UseCaseError::infrastructure(use_case, cause))
    }

    /// Returns true for [`Failure::Terminal`].
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    /// Returns the wrapped error.
    #[must_use]
    pub const fn error(&self) -> &UseCaseError {
        match self {
            Self::Retryable(err) | Self::Terminal(err) => err,
        }
    }

    /// Applies `f` to the wrapped error, keeping the variant.
    #[must_use]
    pub fn map(self, f: impl FnOnce(UseCaseError) -> UseCaseError) -> Self {
        match self {
            Self::Retryable(err) => Self::Retryable(f(err)),
            Self::Terminal(err) => Self::Terminal(f(err)),
        }
    }

    /// Consumes the failure, returning the wrapped error.
    #[must_use]
    pub fn into_error(self) -> UseCaseError {
        match self {
            Self::Retryable(err) | Self::Terminal(err) => err,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retryable(err) => write!(f, "retryable: {err}"),
            Self::Terminal(err) => write!(f, "terminal: {err}"),
        }
    }
}

/// Result of a lifecycle step.
pub type Outcome<T> = Result<T, Failure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keeps_variant() {
        let failure = Failure::terminal(UseCaseId::SendPegout, ErrorKind::Expired)
            .map(|err| err.with_quote_hash("ab"));
        assert!(failure.is_terminal());
        assert_eq!(failure.error().context().quote_hash.as_deref(), Some("ab"));
    }

    #[test]
    fn transient_is_retryable_infrastructure() {
        let failure = Failure::transient(UseCaseId::RefundPegout, "timeout");
        assert!(!failure.is_terminal());
        assert!(failure.into_error().is(ErrorKind::Infrastructure));
    }
}
