//! Event Bus - in-process pub/sub for logging events
//!
//! Delivery is synchronous: `publish` calls every matching subscriber on the
//! caller's stack, in subscription order, and hands the first subscriber
//! error back to the publisher. Subscribers may publish, subscribe or
//! unsubscribe from inside a handler; each publish works on a snapshot of the
//! subscribers registered when it started.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use super::types::{Event, EventName};
use crate::error::Result;

/// Callback invoked for each published event of the subscribed name
pub type Handler = Arc<dyn Fn(&Event) -> Result<()> + Send + Sync>;

/// Token returned by [`EventBus::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    name: EventName,
    handler: Handler,
}

/// Central event bus shared by producers and presenters
pub struct EventBus {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl EventBus {
    /// Create an event bus with no subscribers
    pub fn new() -> Self {
        debug!("EventBus::new: creating event bus");
        Self {
            next_id: AtomicU64::new(1),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Attach a handler to one event name
    pub fn subscribe<F>(&self, name: EventName, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(%name, ?id, "EventBus::subscribe: new subscriber");
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber {
                id,
                name,
                handler: Arc::new(handler),
            });
        id
    }

    /// Detach a handler; returns false if it was not attached
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        let removed = subscribers.len() != before;
        debug!(?id, removed, "EventBus::unsubscribe");
        removed
    }

    /// Deliver an event to every subscriber of its name
    ///
    /// Returns whether at least one subscriber existed. The first handler
    /// error stops delivery and is returned to the caller.
    pub fn publish(&self, event: &Event) -> Result<bool> {
        let name = event.name();
        let handlers: Vec<Handler> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.name == name)
            .map(|s| Arc::clone(&s.handler))
            .collect();
        debug!(%name, project = ?event.project_name(), listeners = handlers.len(), "EventBus::publish");

        if handlers.is_empty() {
            return Ok(false);
        }
        for handler in handlers {
            handler(event)?;
        }
        Ok(true)
    }

    /// Number of subscribers attached to an event name
    pub fn subscriber_count(&self, name: EventName) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.name == name)
            .count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Create an event bus wrapped in an Arc for shared ownership
pub fn create_event_bus() -> Arc<EventBus> {
    Arc::new(EventBus::new())
}
