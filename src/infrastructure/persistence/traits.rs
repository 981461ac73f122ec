//! # Repository Traits
//!
//! Port definitions for persistence abstraction.
//!
//! Every lookup distinguishes absence from failure: a missing entity is
//! `Ok(None)` (or an empty `Vec`), never an error.
//!
//! # Available Repositories
//!
//! - [`PegoutQuoteRepository`]: Pegout quotes, lifecycle records and deposits
//! - [`PeginQuoteRepository`]: Pegin quotes and lifecycle records
//! - [`BatchPegOutRepository`]: Observed bridge releases
//! - [`TrustedAccountRepository`]: Signed trusted account records
//!
//! # Examples
//!
//! ```ignore
//! use liquidity_provider::infrastructure::persistence::traits::PegoutQuoteRepository;
//! use liquidity_provider::domain::value_objects::PegoutState;
//!
//! async fn waiting(repo: &impl PegoutQuoteRepository) {
//!     let quotes = repo
//!         .get_retained_quote_by_state(&PegoutState::active())
//!         .await
//!         .unwrap();
//!     println!("{} quotes hold liquidity", quotes.len());
//! }
//! ```

use crate::domain::entities::{
    BatchPegOut, PegoutCreationData, PegoutDeposit, PegoutQuote, PeginQuote, RetainedPeginQuote,
    RetainedPegoutQuote, Signed, TrustedAccountDetails,
};
use crate::domain::value_objects::{PeginState, PegoutState};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for repository operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Entity to update or delete not found.
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Duplicate entity.
    #[error("Duplicate entity: {entity_type} with id {id} already exists")]
    Duplicate {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query error.
    #[error("Query error: {0}")]
    Query(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a duplicate error.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository of pegout quotes.
#[async_trait]
pub trait PegoutQuoteRepository: Send + Sync + fmt::Debug {
    /// Stores the terms of a new quote with its fee snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the hash is already stored.
    async fn insert_quote(
        &self,
        quote_hash: &str,
        quote: PegoutQuote,
        creation_data: PegoutCreationData,
    ) -> RepositoryResult<()>;

    /// Gets the terms of a quote.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn get_quote(&self, quote_hash: &str) -> RepositoryResult<Option<PegoutQuote>>;

    /// Gets the fee snapshot of a quote, all zero if none was stored.
    async fn get_pegout_creation_data(&self, quote_hash: &str) -> PegoutCreationData;

    /// Gets the lifecycle record of a quote.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn get_retained_quote(&self, quote_hash: &str)
    -> RepositoryResult<Option<RetainedPegoutQuote>>;

    /// Stores a new lifecycle record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the hash already has one.
    async fn insert_retained_quote(&self, retained: RetainedPegoutQuote) -> RepositoryResult<()>;

    /// Replaces a lifecycle record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the record does not exist.
    async fn update_retained_quote(&self, retained: RetainedPegoutQuote) -> RepositoryResult<()>;

    /// Replaces several lifecycle records at once; either all are written
    /// or none is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if any record does not exist.
    async fn update_retained_quotes(
        &self,
        retained: Vec<RetainedPegoutQuote>,
    ) -> RepositoryResult<()>;

    /// Lists lifecycle records in any of the given states.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn get_retained_quote_by_state(
        &self,
        states: &[PegoutState],
    ) -> RepositoryResult<Vec<RetainedPegoutQuote>>;

    /// Lists lifecycle records owned by a trusted account in any of the
    /// given states.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn get_retained_quotes_for_address(
        &self,
        address: &str,
        states: &[PegoutState],
    ) -> RepositoryResult<Vec<RetainedPegoutQuote>>;

    /// Lists lifecycle records whose bridge transaction is part of the
    /// batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn get_retained_quotes_in_batch(
        &self,
        batch: &BatchPegOut,
    ) -> RepositoryResult<Vec<RetainedPegoutQuote>>;

    /// Lists deposits made from an address, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn list_pegout_deposits_by_address(
        &self,
        address: &str,
    ) -> RepositoryResult<Vec<PegoutDeposit>>;

    /// Inserts or replaces a deposit, keyed by transaction hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn upsert_pegout_deposit(&self, deposit: PegoutDeposit) -> RepositoryResult<()>;

    /// Inserts or replaces several deposits.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn upsert_pegout_deposits(&self, deposits: Vec<PegoutDeposit>) -> RepositoryResult<()>;

    /// Deletes quotes, their records and snapshots; returns how many
    /// documents were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn delete_quotes(&self, quote_hashes: &[String]) -> RepositoryResult<u64>;
}

/// Repository of pegin quotes.
#[async_trait]
pub trait PeginQuoteRepository: Send + Sync + fmt::Debug {
    /// Stores the terms of a new quote.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the hash is already stored.
    async fn insert_quote(&self, quote_hash: &str, quote: PeginQuote) -> RepositoryResult<()>;

    /// Gets the terms of a quote.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn get_quote(&self, quote_hash: &str) -> RepositoryResult<Option<PeginQuote>>;

    /// Gets the lifecycle record of a quote.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn get_retained_quote(&self, quote_hash: &str)
    -> RepositoryResult<Option<RetainedPeginQuote>>;

    /// Stores a new lifecycle record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the hash already has one.
    async fn insert_retained_quote(&self, retained: RetainedPeginQuote) -> RepositoryResult<()>;

    /// Replaces a lifecycle record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the record does not exist.
    async fn update_retained_quote(&self, retained: RetainedPeginQuote) -> RepositoryResult<()>;

    /// Lists lifecycle records in any of the given states.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn get_retained_quote_by_state(
        &self,
        states: &[PeginState],
    ) -> RepositoryResult<Vec<RetainedPeginQuote>>;

    /// Lists lifecycle records owned by a trusted account in any of the
    /// given states.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn get_retained_quotes_for_address(
        &self,
        address: &str,
        states: &[PeginState],
    ) -> RepositoryResult<Vec<RetainedPeginQuote>>;

    /// Deletes quotes and their records; returns how many documents were
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn delete_quotes(&self, quote_hashes: &[String]) -> RepositoryResult<u64>;
}

/// Repository of bridge releases.
#[async_trait]
pub trait BatchPegOutRepository: Send + Sync + fmt::Debug {
    /// Inserts or replaces a batch, keyed by its RSK transaction hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn upsert_batch(&self, batch: BatchPegOut) -> RepositoryResult<()>;

    /// Gets a batch by its RSK transaction hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn get_batch(&self, transaction_hash: &str) -> RepositoryResult<Option<BatchPegOut>>;
}

/// Repository of signed trusted account records.
#[async_trait]
pub trait TrustedAccountRepository: Send + Sync + fmt::Debug {
    /// Gets the record of an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn get_trusted_account(
        &self,
        address: &str,
    ) -> RepositoryResult<Option<Signed<TrustedAccountDetails>>>;

    /// Lists every record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    async fn get_all_trusted_accounts(&self)
    -> RepositoryResult<Vec<Signed<TrustedAccountDetails>>>;

    /// Stores a new record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the address already has one.
    async fn add_trusted_account(&self, account: Signed<TrustedAccountDetails>)
    -> RepositoryResult<()>;

    /// Replaces a record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address has none.
    async fn update_trusted_account(
        &self,
        account: Signed<TrustedAccountDetails>,
    ) -> RepositoryResult<()>;

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address has none.
    async fn delete_trusted_account(&self, address: &str) -> RepositoryResult<()>;
}
