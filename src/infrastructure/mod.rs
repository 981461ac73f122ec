//! # Infrastructure Layer
//!
//! Ports to the outside world and the adapters the service runs with.
//!
//! ## Blockchain
//!
//! Bitcoin and Rootstock clients, the liquidity bridge contract and the
//! RSK bridge, expressed as traits.
//!
//! ## Persistence
//!
//! Repository traits for quotes, batches and trusted accounts, with
//! in-memory implementations.
//!
//! ## Events
//!
//! A broadcast event bus and a subscriber logging lifecycle transitions.

pub mod blockchain;
pub mod event_bus;
pub mod persistence;
pub mod provider;

pub use event_bus::{BroadcastEventBus, EventBus, QuoteEventLogger};
pub use provider::{LocalLiquidityProvider, ProviderSources};
