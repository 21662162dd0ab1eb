//! Handler, outcome, and stream types for the event broker.

use crate::types::EventRecord;
use std::fmt;
use std::sync::Arc;

use super::manager::EventBroker;

/// A subscriber callback.
///
/// Invoked synchronously on the publishing thread with a reference to the
/// broker (so the handler may re-enter it) and the published record. The
/// broker assumes nothing about handler behavior beyond this signature.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, broker: &EventBroker, event: &EventRecord);
}

impl<F> EventHandler for F
where
    F: Fn(&EventBroker, &EventRecord) + Send + Sync,
{
    fn on_event(&self, broker: &EventBroker, event: &EventRecord) {
        self(broker, event)
    }
}

/// Shared reference to a registered handler.
///
/// Identity is the `Arc` allocation: clones of the same `HandlerRef` are
/// the same handler for subscription and unsubscription purposes, while two
/// `Arc`s wrapping behaviorally identical closures are distinct.
pub type HandlerRef = Arc<dyn EventHandler>;

/// Handler identity comparison (data pointer, ignoring the vtable).
pub(crate) fn same_handler(a: &HandlerRef, b: &HandlerRef) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const u8, Arc::as_ptr(b) as *const u8)
}

/// One handler's failure during a publish.
#[derive(Clone, Debug)]
pub struct HandlerFailure {
    /// Category the publish was addressed to.
    pub category: String,
    /// Zero-based position of the handler in the invocation snapshot.
    pub handler_index: usize,
    /// Panic payload rendered as text.
    pub message: String,
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "handler #{} for {:?} failed: {}",
            self.handler_index, self.category, self.message
        )
    }
}

/// Aggregate report of one publish call.
///
/// Handler failures are collected here instead of propagating, so one broken
/// subscriber cannot abort delivery to the others.
#[derive(Debug, Default)]
pub struct PublishOutcome {
    /// Number of handlers in the snapshot (all are attempted).
    pub attempted: usize,
    /// Failures, in invocation order. Empty on a clean fan-out.
    pub failures: Vec<HandlerFailure>,
}

impl PublishOutcome {
    /// Handlers that completed without panicking.
    pub fn delivered(&self) -> usize {
        self.attempted - self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Pull-style subscription fed by a registry handler.
///
/// Created by [`EventBroker::subscribe_stream`]; the owning side drains
/// records on its own schedule. To cancel, pass [`EventStream::handler`] to
/// [`EventBroker::unsubscribe`].
pub struct EventStream {
    category: String,
    handler: HandlerRef,
    receiver: crossbeam_channel::Receiver<EventRecord>,
}

impl EventStream {
    pub(crate) fn new(
        category: String,
        handler: HandlerRef,
        receiver: crossbeam_channel::Receiver<EventRecord>,
    ) -> Self {
        Self {
            category,
            handler,
            receiver,
        }
    }

    /// Category this stream was subscribed under, as given.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The registry handler feeding this stream.
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// Receive the next record (blocking).
    pub fn recv(&self) -> Result<EventRecord, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a record (non-blocking).
    pub fn try_recv(&self) -> Result<EventRecord, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<EventRecord, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
