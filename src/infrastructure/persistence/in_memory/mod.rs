//! # In-Memory Repositories
//!
//! In-memory implementations used by the binary and by tests.
//!
//! ## Available Repositories
//!
//! - [`InMemoryPegoutQuoteRepository`]: Pegout quotes, records and deposits
//! - [`InMemoryPeginQuoteRepository`]: Pegin quotes and records
//! - [`InMemoryBatchPegOutRepository`]: Bridge releases
//! - [`InMemoryTrustedAccountRepository`]: Signed trusted accounts
//!
//! ## Thread Safety
//!
//! All implementations use `Arc<RwLock<..>>` for thread-safe access.

pub mod batch_repository;
pub mod pegin_repository;
pub mod pegout_repository;
pub mod trusted_account_repository;

pub use batch_repository::InMemoryBatchPegOutRepository;
pub use pegin_repository::InMemoryPeginQuoteRepository;
pub use pegout_repository::InMemoryPegoutQuoteRepository;
pub use trusted_account_repository::InMemoryTrustedAccountRepository;
