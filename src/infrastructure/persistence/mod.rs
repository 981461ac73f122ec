//! # Persistence Layer
//!
//! Repository ports and their in-memory implementations.
//!
//! ## Repository Traits (Ports)
//!
//! - [`PegoutQuoteRepository`]: Pegout quotes, records and deposits
//! - [`PeginQuoteRepository`]: Pegin quotes and records
//! - [`BatchPegOutRepository`]: Bridge releases
//! - [`TrustedAccountRepository`]: Signed trusted accounts
//!
//! ## Implementations
//!
//! - `in_memory`: `RwLock`-guarded maps

pub mod in_memory;
pub mod traits;

pub use traits::{
    BatchPegOutRepository, PegoutQuoteRepository, PeginQuoteRepository, RepositoryError,
    RepositoryResult, TrustedAccountRepository,
};
