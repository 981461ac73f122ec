//! # Domain Events
//!
//! Events published on quote lifecycle transitions.
//!
//! ## Pegout Events
//!
//! - [`AcceptedPegoutQuote`]: Quote accepted, liquidity reserved
//! - [`PegoutBtcSent`]: BTC payment attempted
//! - [`PegoutQuoteCompleted`]: Refund claim attempted
//! - [`BridgePegoutCompleted`]: Refunded RBTC forwarded to the bridge
//! - [`BatchPegOutUpdated`]: Bridge released BTC for a batch
//!
//! ## Pegin Events
//!
//! - [`AcceptedPeginQuote`]: Quote accepted, liquidity reserved
//! - [`CallForUserCompleted`]: Call on behalf of the user attempted
//! - [`RegisterPeginCompleted`]: Bridge registration attempted

pub mod domain_event;
pub mod quote_events;

pub use domain_event::{DomainEvent, EventMetadata, EventType};
pub use quote_events::{
    AcceptedPeginQuote, AcceptedPegoutQuote, BatchPegOutUpdated, BridgePegoutCompleted,
    CallForUserCompleted, PegoutBtcSent, PegoutQuoteCompleted, QuoteEvent,
    RegisterPeginCompleted,
};
