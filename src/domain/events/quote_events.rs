//! # Quote Lifecycle Events
//!
//! Events published on every quote state transition.
//!
//! Completion events carry an `error` field that is `None` on success, so
//! observers tell successful and failed transitions apart by pattern
//! matching on the same variant.

use crate::domain::entities::{
    BatchPegOut, PegoutCreationData, PegoutQuote, PeginQuote, RetainedPeginQuote,
    RetainedPegoutQuote,
};
use crate::domain::events::domain_event::{DomainEvent, EventMetadata, EventType};
use crate::domain::value_objects::{EventId, Timestamp};
use serde::{Deserialize, Serialize};

/// A pegout quote was accepted and its liquidity reserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedPegoutQuote {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Quote terms.
    pub quote: PegoutQuote,
    /// Newly created lifecycle record.
    pub retained_quote: RetainedPegoutQuote,
    /// Fee snapshot taken when the quote was created.
    pub creation_data: PegoutCreationData,
}

/// The LP attempted the BTC payment of a pegout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PegoutBtcSent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Quote terms.
    pub quote: PegoutQuote,
    /// Updated lifecycle record.
    pub retained_quote: RetainedPegoutQuote,
    /// Fee snapshot taken when the quote was created.
    pub creation_data: PegoutCreationData,
    /// Failure, if the payment did not go through.
    pub error: Option<String>,
}

/// The LP attempted to claim the user's deposit from the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PegoutQuoteCompleted {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Updated lifecycle record.
    pub retained_quote: RetainedPegoutQuote,
    /// Failure, if the refund did not go through.
    pub error: Option<String>,
}

/// The LP forwarded refunded RBTC to the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgePegoutCompleted {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Every record included in the bridge transaction.
    pub quotes: Vec<RetainedPegoutQuote>,
    /// Failure, if the bridge transaction did not go through.
    pub error: Option<String>,
}

/// The bridge released BTC for a batch of pegouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPegOutUpdated {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The observed batch.
    pub batch: BatchPegOut,
    /// Hashes of the quotes marked released.
    pub quote_hashes: Vec<String>,
}

/// A pegin quote was accepted and its liquidity reserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedPeginQuote {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Quote terms.
    pub quote: PeginQuote,
    /// Newly created lifecycle record.
    pub retained_quote: RetainedPeginQuote,
}

/// The LP attempted the call on behalf of the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallForUserCompleted {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Quote terms.
    pub quote: PeginQuote,
    /// Updated lifecycle record.
    pub retained_quote: RetainedPeginQuote,
    /// Failure, if the call did not go through.
    pub error: Option<String>,
}

/// The LP attempted to register the pegin in the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPeginCompleted {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Updated lifecycle record.
    pub retained_quote: RetainedPeginQuote,
    /// Failure, if the registration did not go through.
    pub error: Option<String>,
}

/// Every lifecycle event the engine publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum QuoteEvent {
    /// See [`AcceptedPegoutQuote`].
    AcceptedPegoutQuote(AcceptedPegoutQuote),
    /// See [`PegoutBtcSent`].
    PegoutBtcSent(PegoutBtcSent),
    /// See [`PegoutQuoteCompleted`].
    PegoutQuoteCompleted(PegoutQuoteCompleted),
    /// See [`BridgePegoutCompleted`].
    BridgePegoutCompleted(BridgePegoutCompleted),
    /// See [`BatchPegOutUpdated`].
    BatchPegOutUpdated(BatchPegOutUpdated),
    /// See [`AcceptedPeginQuote`].
    AcceptedPeginQuote(AcceptedPeginQuote),
    /// See [`CallForUserCompleted`].
    CallForUserCompleted(CallForUserCompleted),
    /// See [`RegisterPeginCompleted`].
    RegisterPeginCompleted(RegisterPeginCompleted),
}

impl QuoteEvent {
    fn metadata(&self) -> &EventMetadata {
        match self {
            Self::AcceptedPegoutQuote(e) => &e.metadata,
            Self::PegoutBtcSent(e) => &e.metadata,
            Self::PegoutQuoteCompleted(e) => &e.metadata,
            Self::BridgePegoutCompleted(e) => &e.metadata,
            Self::BatchPegOutUpdated(e) => &e.metadata,
            Self::AcceptedPeginQuote(e) => &e.metadata,
            Self::CallForUserCompleted(e) => &e.metadata,
            Self::RegisterPeginCompleted(e) => &e.metadata,
        }
    }

    /// Returns the error carried by the event, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::PegoutBtcSent(e) => e.error.as_deref(),
            Self::PegoutQuoteCompleted(e) => e.error.as_deref(),
            Self::BridgePegoutCompleted(e) => e.error.as_deref(),
            Self::CallForUserCompleted(e) => e.error.as_deref(),
            Self::RegisterPeginCompleted(e) => e.error.as_deref(),
            Self::AcceptedPegoutQuote(_)
            | Self::BatchPegOutUpdated(_)
            | Self::AcceptedPeginQuote(_) => None,
        }
    }

    /// Returns the hashes of the quotes the event is about.
    #[must_use]
    pub fn quote_hashes(&self) -> Vec<&str> {
        match self {
            Self::AcceptedPegoutQuote(e) => vec![e.retained_quote.quote_hash.as_str()],
            Self::PegoutBtcSent(e) => vec![e.retained_quote.quote_hash.as_str()],
            Self::PegoutQuoteCompleted(e) => vec![e.retained_quote.quote_hash.as_str()],
            Self::BridgePegoutCompleted(e) => {
                e.quotes.iter().map(|q| q.quote_hash.as_str()).collect()
            }
            Self::BatchPegOutUpdated(e) => e.quote_hashes.iter().map(String::as_str).collect(),
            Self::AcceptedPeginQuote(e) => vec![e.retained_quote.quote_hash.as_str()],
            Self::CallForUserCompleted(e) => vec![e.retained_quote.quote_hash.as_str()],
            Self::RegisterPeginCompleted(e) => vec![e.retained_quote.quote_hash.as_str()],
        }
    }
}

impl DomainEvent for QuoteEvent {
    fn event_id(&self) -> EventId {
        self.metadata().event_id
    }

    fn timestamp(&self) -> Timestamp {
        self.metadata().timestamp
    }

    fn event_type(&self) -> EventType {
        match self {
            Self::AcceptedPegoutQuote(_)
            | Self::PegoutBtcSent(_)
            | Self::PegoutQuoteCompleted(_)
            | Self::BridgePegoutCompleted(_)
            | Self::BatchPegOutUpdated(_) => EventType::Pegout,
            Self::AcceptedPeginQuote(_)
            | Self::CallForUserCompleted(_)
            | Self::RegisterPeginCompleted(_) => EventType::Pegin,
        }
    }

    fn event_name(&self) -> &'static str {
        match self {
            Self::AcceptedPegoutQuote(_) => "AcceptedPegoutQuote",
            Self::PegoutBtcSent(_) => "PegoutBtcSent",
            Self::PegoutQuoteCompleted(_) => "PegoutQuoteCompleted",
            Self::BridgePegoutCompleted(_) => "BridgePegoutCompleted",
            Self::BatchPegOutUpdated(_) => "BatchPegOutUpdated",
            Self::AcceptedPeginQuote(_) => "AcceptedPeginQuote",
            Self::CallForUserCompleted(_) => "CallForUserCompleted",
            Self::RegisterPeginCompleted(_) => "RegisterPeginCompleted",
        }
    }
}
