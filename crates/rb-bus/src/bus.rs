//! Event Bus
//!
//! Named, multicast, synchronous events. `publish` returns only after every
//! subscriber has run. Handlers may publish recursively; the subscriber list
//! is snapshotted per publish, so a handler subscribed during delivery only
//! sees later events.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::value::Value;

/// A published event
#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    pub name: String,
    pub args: Vec<Value>,
}

impl BusEvent {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Argument at `index`
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Text argument at `index`
    pub fn arg_str(&self, index: usize) -> Option<&str> {
        self.arg(index).and_then(Value::as_str)
    }
}

/// Subscriber callback
pub type Handler = Arc<dyn Fn(&BusEvent) + Send + Sync>;

/// Token returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    handler: Handler,
}

struct BusShared {
    /// Event name → subscribers in registration order
    subscribers: RwLock<HashMap<String, Vec<Subscriber>>>,
    next_id: AtomicU64,
    published: AtomicU64,
}

/// Cloneable handle to a shared event bus
#[derive(Clone)]
pub struct EventBus {
    shared: Arc<BusShared>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(BusShared {
                subscribers: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                published: AtomicU64::new(0),
            }),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SUBSCRIPTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Register `handler` for events named `name`
    pub fn subscribe<F>(&self, name: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&BusEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        self.shared
            .subscribers
            .write()
            .entry(name.to_string())
            .or_default()
            .push(Subscriber {
                id,
                handler: Arc::new(handler),
            });
        id
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.shared.subscribers.write();
        for list in subscribers.values_mut() {
            if let Some(pos) = list.iter().position(|s| s.id == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Number of subscribers currently registered for `name`
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.shared
            .subscribers
            .read()
            .get(name)
            .map_or(0, |list| list.len())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PUBLISHING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deliver an event to every current subscriber, in registration order
    pub fn publish(&self, name: &str, args: &[Value]) {
        let handlers: Vec<Handler> = self
            .shared
            .subscribers
            .read()
            .get(name)
            .map(|list| list.iter().map(|s| s.handler.clone()).collect())
            .unwrap_or_default();

        self.shared.published.fetch_add(1, Ordering::Relaxed);
        log::trace!("publish {name} -> {} subscriber(s)", handlers.len());

        if handlers.is_empty() {
            return;
        }

        let event = BusEvent::new(name, args.to_vec());
        for handler in handlers {
            handler(&event);
        }
    }

    /// Total events published since creation
    pub fn published_count(&self) -> u64 {
        self.shared.published.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.shared.subscribers.read();
        f.debug_struct("EventBus")
            .field("events", &subscribers.len())
            .field("published", &self.published_count())
            .finish()
    }
}
