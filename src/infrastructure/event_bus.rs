//! # Event Bus
//!
//! Publish/subscribe channel for [`QuoteEvent`]s.
//!
//! Publishing never fails from the caller's point of view: an event sent
//! while nobody listens is dropped, and slow subscribers skip the events
//! they lagged behind on.
//!
//! # Examples
//!
//! ```ignore
//! let bus = BroadcastEventBus::new(256);
//! let logger = QuoteEventLogger::spawn(bus.subscribe());
//! bus.publish(event);
//! ```

use crate::domain::events::{DomainEvent, QuoteEvent};
use std::fmt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Default capacity of the broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Sink of lifecycle events.
pub trait EventBus: Send + Sync + fmt::Debug {
    /// Publishes an event to every current subscriber.
    fn publish(&self, event: QuoteEvent);
}

/// [`EventBus`] backed by a `tokio::sync::broadcast` channel.
#[derive(Debug, Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<QuoteEvent>,
}

impl BroadcastEventBus {
    /// Creates a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns a receiver of every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<QuoteEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventBus for BroadcastEventBus {
    fn publish(&self, event: QuoteEvent) {
        let name = event.event_name();
        if self.sender.send(event).is_err() {
            tracing::trace!(event = name, "event dropped, no subscribers");
        }
    }
}

/// Subscriber that logs every lifecycle event.
#[derive(Debug)]
pub struct QuoteEventLogger;

impl QuoteEventLogger {
    /// Spawns the logging task. It ends when every sender is dropped.
    #[must_use]
    pub fn spawn(mut receiver: broadcast::Receiver<QuoteEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => Self::log(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event logger lagged behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn log(event: &QuoteEvent) {
        let hashes = event.quote_hashes().join(",");
        match event.error() {
            Some(error) => tracing::warn!(
                event_id = %event.event_id(),
                event = event.event_name(),
                direction = %event.event_type(),
                quote_hashes = %hashes,
                error,
                "lifecycle transition failed"
            ),
            None => tracing::info!(
                event_id = %event.event_id(),
                event = event.event_name(),
                direction = %event.event_type(),
                quote_hashes = %hashes,
                "lifecycle transition"
            ),
        }
    }
}
