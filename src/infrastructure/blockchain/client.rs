//! # Blockchain Client Types
//!
//! Shared types and the error surface of every chain port.
//!
//! The ports themselves live in [`bitcoin`](super::bitcoin),
//! [`rootstock`](super::rootstock) and [`contracts`](super::contracts).

use crate::domain::value_objects::{Timestamp, Wei};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Transaction hash, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    /// Creates a new transaction hash.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Returns the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if no transaction was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TxHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<TxHash> for String {
    fn from(hash: TxHash) -> Self {
        hash.0
    }
}

/// Value, gas limit and gas price of an RSK transaction.
///
/// `None` leaves the choice to the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionConfig {
    /// Value sent with the transaction.
    pub value: Wei,
    /// Gas limit.
    pub gas_limit: Option<u64>,
    /// Gas price.
    pub gas_price: Option<Wei>,
}

impl TransactionConfig {
    /// Creates a transaction configuration.
    #[must_use]
    pub fn new(value: Wei, gas_limit: Option<u64>, gas_price: Option<Wei>) -> Self {
        Self {
            value,
            gas_limit,
            gas_price,
        }
    }
}

/// A log emitted by an RSK transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReceiptLog {
    /// Emitting contract.
    pub address: String,
    /// Indexed topics, hex encoded.
    pub topics: Vec<String>,
    /// Unindexed data.
    pub data: Vec<u8>,
}

/// Receipt of a mined RSK transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Transaction hash.
    pub transaction_hash: TxHash,
    /// Hash of the including block.
    pub block_hash: String,
    /// Number of the including block.
    pub block_number: u64,
    /// Sender.
    pub from: String,
    /// Recipient.
    pub to: String,
    /// Gas used by the transaction.
    pub gas_used: u64,
    /// Gas price paid.
    pub gas_price: Wei,
    /// Value transferred.
    pub value: Wei,
    /// Emitted logs.
    pub logs: Vec<ReceiptLog>,
}

/// Header data of an RSK block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block hash.
    pub hash: String,
    /// Block number.
    pub number: u64,
    /// Block timestamp.
    pub timestamp: Timestamp,
}

/// Error type for blockchain operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockchainError {
    /// RPC connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Transaction submission error.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Transaction reverted.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// The bridge has not yet processed the BTC transaction being proved.
    #[error("waiting for bridge: {0}")]
    WaitingForBridge(String),

    /// Requested transaction, block or log does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A chain value could not be decoded.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BlockchainError {
    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a transaction error.
    #[must_use]
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Creates a reverted error.
    #[must_use]
    pub fn reverted(msg: impl Into<String>) -> Self {
        Self::Reverted(msg.into())
    }

    /// Creates a waiting-for-bridge error.
    #[must_use]
    pub fn waiting_for_bridge(msg: impl Into<String>) -> Self {
        Self::WaitingForBridge(msg.into())
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Creates a decoding error.
    #[must_use]
    pub fn decoding(msg: impl Into<String>) -> Self {
        Self::Decoding(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if the bridge has not caught up yet and the call
    /// should be retried later.
    #[must_use]
    pub const fn is_waiting_for_bridge(&self) -> bool {
        matches!(self, Self::WaitingForBridge(_))
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;
