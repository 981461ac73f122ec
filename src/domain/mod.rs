//! # Domain Layer
//!
//! Quotes, lifecycle records, monetary values and lifecycle events.
//!
//! - [`entities`]: Pegout and pegin quotes, deposits, batches, trusted accounts
//! - [`value_objects`]: `Wei`, quote hashes, nonces, states
//! - [`events`]: Lifecycle events
//! - [`services`]: LP capability ports and fee algebra
//! - [`errors`]: Domain errors

pub mod entities;
pub mod errors;
pub mod events;
pub mod services;
pub mod value_objects;
