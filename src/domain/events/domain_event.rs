//! # Domain Event Trait
//!
//! What every lifecycle event exposes to subscribers: an id, the moment it
//! was raised and the transfer direction it belongs to.
//!
//! # Examples
//!
//! ```
//! use liquidity_provider::domain::events::domain_event::{EventMetadata, EventType};
//!
//! let metadata = EventMetadata::new();
//! assert_eq!(EventType::Pegout.to_string(), "PEGOUT");
//! # let _ = metadata;
//! ```

use crate::domain::value_objects::EventId;
use crate::domain::value_objects::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of the transfer an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// RBTC to BTC lifecycle events.
    Pegout,
    /// BTC to RBTC lifecycle events.
    Pegin,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pegout => write!(f, "PEGOUT"),
            Self::Pegin => write!(f, "PEGIN"),
        }
    }
}

/// An immutable record of a quote lifecycle transition.
pub trait DomainEvent: Send + Sync + fmt::Debug {
    /// Id assigned when the event was raised.
    fn event_id(&self) -> EventId;

    /// When the transition happened.
    fn timestamp(&self) -> Timestamp;

    /// Pegin or pegout.
    fn event_type(&self) -> EventType;

    /// Stable name, used as the log `event` field.
    fn event_name(&self) -> &'static str;
}

/// Id and time stamped on every event at publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Random v4 id.
    pub event_id: EventId,
    /// Publication time.
    pub timestamp: Timestamp,
}

impl EventMetadata {
    /// Stamps a fresh id and the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            event_id: EventId::new_v4(),
            timestamp: Timestamp::now(),
        }
    }
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self::new()
    }
}
