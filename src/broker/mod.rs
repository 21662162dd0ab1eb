//! Event broker: subscription registry and synchronous fan-out.
//!
//! Producers announce lifecycle events under string categories; consumers
//! register handlers for the categories they care about without the
//! producer knowing who they are.
//!
//! The broker guarantees:
//! - Registration order is invocation order within one publish.
//! - Each publish invokes a consistent snapshot of the handler set; handlers
//!   may re-enter the broker (subscribe, unsubscribe, publish) freely.
//! - A panicking handler never prevents the remaining handlers from running.
//!
//! # Example
//!
//! ```ignore
//! let broker = EventBroker::new();
//!
//! let handler: HandlerRef = Arc::new(|_broker: &EventBroker, event: &EventRecord| {
//!     println!("{} -> {}", event.subject_name(), event.category());
//! });
//! broker.subscribe("Onboarded", Arc::clone(&handler))?;
//!
//! let event = EventRecord::new(SubjectId(7), "Ada", "Onboarded")?;
//! let outcome = broker.publish_record(&event);
//! assert!(outcome.is_clean());
//!
//! broker.unsubscribe("Onboarded", &handler)?;
//! ```

mod manager;
mod types;

pub use manager::{EventBroker, DEFAULT_STREAM_BUFFER};
pub use types::{EventHandler, EventStream, HandlerFailure, HandlerRef, PublishOutcome};
