//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Money
//!
//! - [`Wei`]: Exact, non-negative amount backed by a 256-bit integer
//!
//! ## Identity Types
//!
//! - [`QuoteHash`]: 32-byte quote identifier in hex form
//! - [`Nonce`]: Per-quote nonce with its BSON encoding
//! - [`EventId`]: Domain event identifier
//!
//! ## Arithmetic
//!
//! - [`ArithmeticError`]: Error type for arithmetic failures
//! - [`CheckedArithmetic`]: Trait for safe arithmetic operations
//!
//! ## Lifecycle
//!
//! - [`PegoutState`], [`PeginState`]: Retained quote states

pub mod arithmetic;
pub mod ids;
pub mod nonce;
pub mod quote_hash;
pub mod quote_state;
pub mod timestamp;
pub mod wei;

pub use arithmetic::{ArithmeticError, ArithmeticResult, CheckedArithmetic};
pub use ids::EventId;
pub use nonce::{BsonType, Nonce};
pub use quote_hash::{QuoteHash, validate_quote_hash};
pub use quote_state::{PeginState, PegoutState};
pub use timestamp::Timestamp;
pub use wei::Wei;
