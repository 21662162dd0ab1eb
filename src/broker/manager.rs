//! The event broker: registry mutation and synchronous publish fan-out.

use crate::error::{BrokerError, Result};
use crate::types::{category_key, EventRecord};
use crossbeam_channel::bounded;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

use super::types::{same_handler, EventStream, HandlerFailure, HandlerRef, PublishOutcome};

/// Default buffered capacity for stream subscriptions.
pub const DEFAULT_STREAM_BUFFER: usize = 1000;

/// Owns the subscription registry and fans published records out to it.
///
/// All operations are synchronous on the caller's thread and safe to call
/// concurrently. The registry lock is never held while a handler runs, so
/// handlers may re-enter the broker without deadlocking.
pub struct EventBroker {
    /// Registered handlers per normalized category, in registration order.
    /// Invariant: no entry is ever left empty.
    handlers: RwLock<HashMap<String, Vec<HandlerRef>>>,
}

impl EventBroker {
    /// Create a broker with an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    // --- Registration ---

    /// Register `handler` for `category`.
    ///
    /// The category is compared case-insensitively and must be non-empty
    /// after trimming. Registering the same `HandlerRef` twice for the same
    /// category is a no-op; the handler will still be invoked once per
    /// publish.
    pub fn subscribe(&self, category: &str, handler: HandlerRef) -> Result<()> {
        let key = category_key(category);
        if key.is_empty() {
            return Err(BrokerError::EmptyCategory);
        }

        let mut handlers = self.handlers.write();
        let entry = handlers.entry(key).or_default();
        if entry.iter().any(|existing| same_handler(existing, &handler)) {
            debug!(category, "handler already subscribed, ignoring");
            return Ok(());
        }
        entry.push(handler);
        debug!(category, subscribers = entry.len(), "handler subscribed");
        Ok(())
    }

    /// Remove `handler` from `category`.
    ///
    /// Unsubscribing a handler that was never registered, or from an unknown
    /// category, is a silent no-op. A category whose last handler is removed
    /// disappears from the registry entirely.
    pub fn unsubscribe(&self, category: &str, handler: &HandlerRef) -> Result<()> {
        let key = category_key(category);
        if key.is_empty() {
            return Err(BrokerError::EmptyCategory);
        }

        let mut handlers = self.handlers.write();
        if let Some(entry) = handlers.get_mut(&key) {
            let before = entry.len();
            entry.retain(|existing| !same_handler(existing, handler));
            if entry.len() < before {
                debug!(category, "handler unsubscribed");
            }
            if entry.is_empty() {
                handlers.remove(&key);
            }
        }
        Ok(())
    }

    // --- Publishing ---

    /// Deliver `event` to every handler registered for `category`.
    ///
    /// Handlers run synchronously, in registration order, against a snapshot
    /// of the set taken when the call starts; registrations made during the
    /// fan-out affect future publishes only. A category with no subscribers
    /// is a silent no-op. Panicking handlers are isolated and reported in
    /// the returned outcome.
    pub fn publish(&self, category: &str, event: &EventRecord) -> PublishOutcome {
        let key = category_key(category);
        let snapshot: Option<Vec<HandlerRef>> = self.handlers.read().get(&key).cloned();
        let snapshot = match snapshot {
            Some(handlers) => handlers,
            None => return PublishOutcome::default(),
        };

        let mut outcome = PublishOutcome {
            attempted: snapshot.len(),
            failures: Vec::new(),
        };

        for (index, handler) in snapshot.iter().enumerate() {
            let invocation =
                panic::catch_unwind(AssertUnwindSafe(|| handler.on_event(self, event)));
            if let Err(payload) = invocation {
                let message = panic_message(payload);
                warn!(category, handler_index = index, %message, "handler panicked during publish");
                outcome.failures.push(HandlerFailure {
                    category: category.to_string(),
                    handler_index: index,
                    message,
                });
            }
        }
        outcome
    }

    /// Publish `event` under its own category.
    pub fn publish_record(&self, event: &EventRecord) -> PublishOutcome {
        self.publish(event.category(), event)
    }

    /// Subscribe a bounded pull-style stream to `category`.
    ///
    /// The stream's feeding handler participates in the registry like any
    /// other handler. When the buffer is full the record is dropped for this
    /// stream only; the publisher is never blocked.
    pub fn subscribe_stream(&self, category: &str, buffer: usize) -> Result<EventStream> {
        let (sender, receiver) = bounded(buffer);
        let stream_category = category.to_string();
        let handler: HandlerRef =
            Arc::new(move |_broker: &EventBroker, event: &EventRecord| {
                match sender.try_send(event.clone()) {
                    Ok(()) => {}
                    Err(crossbeam_channel::TrySendError::Full(_)) => {
                        warn!(category = %stream_category, "stream buffer full, dropping event");
                    }
                    Err(crossbeam_channel::TrySendError::Disconnected(_)) => {}
                }
            });
        self.subscribe(category, Arc::clone(&handler))?;
        Ok(EventStream::new(category.to_string(), handler, receiver))
    }

    // --- Observers ---

    /// Whether at least one handler is registered for `category`.
    pub fn has_subscribers(&self, category: &str) -> bool {
        self.handlers.read().contains_key(&category_key(category))
    }

    /// Number of handlers registered for `category`.
    pub fn handler_count(&self, category: &str) -> usize {
        self.handlers
            .read()
            .get(&category_key(category))
            .map_or(0, Vec::len)
    }

    /// Number of categories with at least one handler.
    pub fn category_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl Default for EventBroker {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a panic payload as text for the failure report.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
