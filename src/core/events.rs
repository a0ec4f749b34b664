//! Broadcast of path revalidation signals
//!
//! Successful mutations tell the rest of the process that a rendered path is
//! stale. The signal goes out on a `tokio::sync::broadcast` channel so any
//! number of listeners (page caches, live dashboards) can react without the
//! mutation waiting on them.
//!
//! ```text
//! InvoiceActions ──▶ Navigator::revalidate_path() ──▶ EventBus::publish() ──▶ subscribers
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let event_bus = EventBus::new(1024);
//! let mut rx = event_bus.subscribe();
//!
//! event_bus.publish(RevalidationEvent::PathRevalidated {
//!     path: "/dashboard/invoices".to_string(),
//! });
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("stale: {}", envelope.event.path());
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Cache signals emitted after a mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RevalidationEvent {
    /// Cached content for this path must be recomputed on next access
    PathRevalidated { path: String },
}

impl RevalidationEvent {
    pub fn path(&self) -> &str {
        match self {
            RevalidationEvent::PathRevalidated { path } => path,
        }
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: RevalidationEvent,
}

impl EventEnvelope {
    pub fn new(event: RevalidationEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; all clones share one channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// Receivers that fall more than `capacity` events behind get `Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never blocks and never fails. Returns the number of receivers.
    pub fn publish(&self, event: RevalidationEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        // send() returns Err only if there are no receivers
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> RevalidationEvent {
        RevalidationEvent::PathRevalidated {
            path: "/dashboard/invoices".to_string(),
        }
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(listing()).unwrap();
        assert_eq!(json["action"], "path_revalidated");
        assert_eq!(json["path"], "/dashboard/invoices");
    }

    #[test]
    fn test_event_envelope_has_metadata() {
        let envelope = EventEnvelope::new(listing());
        assert!(!envelope.id.is_nil());
        assert!(envelope.timestamp <= Utc::now());
    }

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        assert_eq!(bus.publish(listing()), 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event.path(), "/dashboard/invoices");
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.publish(listing()), 2);

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1.id, e2.id);
    }

    #[test]
    fn test_event_bus_publish_without_subscribers() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(listing()), 0);
    }

    #[test]
    fn test_event_bus_clone_shares_channel() {
        let bus = EventBus::default();
        let _rx = bus.subscribe();
        let bus2 = bus.clone();
        assert_eq!(bus2.receiver_count(), 1);
    }
}
