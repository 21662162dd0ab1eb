//! # Herald
//!
//! A synchronous, in-process publish/subscribe event broker: producers
//! announce lifecycle events about entities under string categories, and
//! consumers register interest in those categories without the producer
//! knowing who they are.
//!
//! ## Core Concepts
//!
//! - **Event records**: immutable descriptions of one occurrence, with a
//!   construction-time timestamp and a typed attribute map
//! - **Broker**: string-keyed subscription registry with ordered,
//!   snapshot-isolated, failure-isolated fan-out
//! - **Streams**: bounded channel-backed pull subscriptions
//! - **Queries**: lazy category/predicate filters over retained records
//!
//! Delivery is best-effort within one process: no persistence, no transport,
//! no cross-category ordering.
//!
//! ## Example
//!
//! ```ignore
//! use herald::{EventBroker, EventFilter, EventLog, EventRecord, SubjectId};
//!
//! let broker = EventBroker::new();
//! let log = Arc::new(EventLog::new());
//! broker.subscribe("Onboarded", Arc::clone(&log).handler())?;
//!
//! let event = EventRecord::new(SubjectId(7), "Ada", "Onboarded")?
//!     .with_note("joined compilers team");
//! broker.publish_record(&event);
//!
//! let retained = log.snapshot();
//! let onboarded = EventFilter::new().with_category("onboarded");
//! assert_eq!(onboarded.apply(&retained).count(), 1);
//! ```

pub mod broker;
pub mod error;
pub mod query;
pub mod types;

// Re-exports
pub use broker::{
    EventBroker, EventHandler, EventStream, HandlerFailure, HandlerRef, PublishOutcome,
    DEFAULT_STREAM_BUFFER,
};
pub use error::{BrokerError, Result};
pub use query::{EventFilter, EventLog};
pub use types::{AttributeValue, EventRecord, SubjectId, Timestamp};
