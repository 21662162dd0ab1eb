//! Retrospective filtering over retained event records.
//!
//! The broker does not persist history; a consumer that wants to audit past
//! events keeps them (an [`EventLog`] is the simplest way) and runs the
//! retained sequence through an [`EventFilter`]. Filters are stateless and
//! lazy: applying one borrows the input, preserves its order, and can be
//! repeated with identical results.

use crate::broker::{EventBroker, HandlerRef};
use crate::types::EventRecord;
use parking_lot::Mutex;
use std::sync::Arc;

type Predicate = Box<dyn Fn(&EventRecord) -> bool + Send + Sync>;

/// Criteria for selecting records out of a retained sequence.
///
/// Both criteria are optional; a filter with neither is the identity. The
/// predicate is only consulted for records that survive the category test.
#[derive(Default)]
pub struct EventFilter {
    category: Option<String>,
    predicate: Option<Predicate>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retain only records whose category matches, case-insensitively.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Retain only records satisfying `predicate`.
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&EventRecord) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Whether a single record passes this filter.
    pub fn matches(&self, event: &EventRecord) -> bool {
        if let Some(ref category) = self.category {
            if !event.matches_category(category) {
                return false;
            }
        }
        if let Some(ref predicate) = self.predicate {
            if !predicate(event) {
                return false;
            }
        }
        true
    }

    /// Lazily select matching records, preserving input order.
    ///
    /// Does not consume or mutate the input; re-applying the same filter to
    /// the same slice yields the same sequence.
    pub fn apply<'a>(
        &'a self,
        events: &'a [EventRecord],
    ) -> impl Iterator<Item = &'a EventRecord> + 'a {
        events.iter().filter(move |event| self.matches(event))
    }
}

/// Caller-owned log of published records.
///
/// The retained-history collaborator from the broker's data flow: subscribe
/// its [`handler`](EventLog::handler) to the categories of interest and the
/// log accumulates every delivery, in arrival order, ready for
/// [`EventFilter::apply`].
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<EventRecord>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the log.
    pub fn record(&self, event: &EventRecord) {
        self.events.lock().push(event.clone());
    }

    /// Adapt this log into a broker handler that records every delivery.
    ///
    /// Each call creates a handler with its own identity; keep the returned
    /// reference if the subscription should be removable later.
    pub fn handler(self: Arc<Self>) -> HandlerRef {
        Arc::new(move |_broker: &EventBroker, event: &EventRecord| self.record(event))
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Copy of the retained records, in arrival order.
    pub fn snapshot(&self) -> Vec<EventRecord> {
        self.events.lock().clone()
    }
}
