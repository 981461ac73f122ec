//! # Domain Errors
//!
//! Typed domain error definitions.
//!
//! This module provides the [`DomainError`] enum for representing
//! domain-level errors with numeric error codes.
//!
//! # Examples
//!
//! ```
//! use liquidity_provider::domain::errors::DomainError;
//!
//! let error = DomainError::required_field("RetainedPegoutQuote", "signature");
//! assert_eq!(error.code(), 1002);
//! ```

use crate::domain::value_objects::arithmetic::ArithmeticError;
use crate::domain::value_objects::wei::Wei;
use std::fmt;
use thiserror::Error;

/// Domain-level error with numeric error codes.
///
/// | Range | Category |
/// |-------|----------|
/// | 1000-1999 | Validation errors |
/// | 4000-4999 | Arithmetic errors |
/// | 5000-5999 | Encoding errors |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Quote hash is not 64 hex characters.
    #[error("invalid quote hash {hash}: {reason}")]
    InvalidQuoteHash {
        /// The rejected hash.
        hash: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A required field of an entity is empty.
    #[error("{entity} validation failed: {field} is required")]
    RequiredField {
        /// Entity name.
        entity: &'static str,
        /// Field name.
        field: &'static str,
    },

    /// Amount outside the LP's configured bounds.
    #[error("amount {amount} out of range [{min}, {max}]")]
    AmountOutOfRange {
        /// Requested amount.
        amount: Wei,
        /// Lower bound.
        min: Wei,
        /// Upper bound.
        max: Wei,
    },

    /// Generic validation error.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Arithmetic error.
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    /// A stored value could not be decoded.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// A signature could not be parsed or recovered.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

impl DomainError {
    /// Creates an invalid quote hash error.
    #[must_use]
    pub fn invalid_quote_hash(hash: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidQuoteHash {
            hash: hash.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a required field error.
    #[must_use]
    pub const fn required_field(entity: &'static str, field: &'static str) -> Self {
        Self::RequiredField { entity, field }
    }

    /// Creates an out of range error.
    #[must_use]
    pub const fn amount_out_of_range(amount: Wei, min: Wei, max: Wei) -> Self {
        Self::AmountOutOfRange { amount, min, max }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Creates a deserialization error.
    #[must_use]
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization(message.into())
    }

    /// Creates an invalid signature error.
    #[must_use]
    pub fn invalid_signature(message: impl fmt::Display) -> Self {
        Self::InvalidSignature(message.to_string())
    }

    /// Returns the numeric error code.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::InvalidQuoteHash { .. } => 1001,
            Self::RequiredField { .. } => 1002,
            Self::AmountOutOfRange { .. } => 1003,
            Self::ValidationError(_) => 1099,
            Self::Arithmetic(ArithmeticError::Overflow) => 4001,
            Self::Arithmetic(ArithmeticError::Underflow) => 4002,
            Self::Arithmetic(ArithmeticError::DivisionByZero) => 4003,
            Self::Arithmetic(ArithmeticError::InvalidValue(_)) => 4004,
            Self::Deserialization(_) => 5001,
            Self::InvalidSignature(_) => 5002,
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        self.code() >= 1000 && self.code() < 2000
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
