//! Error handling and edge case tests.

use herald::{BrokerError, EventBroker, EventRecord, HandlerRef, SubjectId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn noop_handler() -> HandlerRef {
    Arc::new(|_broker: &EventBroker, _event: &EventRecord| {})
}

// --- Invalid Arguments ---

#[test]
fn test_subscribe_rejects_blank_categories() {
    let broker = EventBroker::new();
    for category in ["", " ", "\t\n"] {
        assert!(matches!(
            broker.subscribe(category, noop_handler()),
            Err(BrokerError::EmptyCategory)
        ));
    }
    assert_eq!(broker.category_count(), 0);
}

#[test]
fn test_unsubscribe_rejects_blank_categories() {
    let broker = EventBroker::new();
    let handler = noop_handler();
    assert!(matches!(
        broker.unsubscribe("  ", &handler),
        Err(BrokerError::EmptyCategory)
    ));
}

#[test]
fn test_record_validation() {
    assert!(matches!(
        EventRecord::new(SubjectId(0), "Ada", "Onboarded"),
        Err(BrokerError::InvalidSubjectId)
    ));
    assert!(matches!(
        EventRecord::new(SubjectId(1), "", "Onboarded"),
        Err(BrokerError::EmptySubjectName)
    ));
    assert!(matches!(
        EventRecord::new(SubjectId(1), "Ada", " "),
        Err(BrokerError::EmptyCategory)
    ));
    let record = EventRecord::new(SubjectId(1), "Ada", "Onboarded").unwrap();
    assert!(matches!(
        record.with_attribute("", 1.0),
        Err(BrokerError::EmptyAttributeKey)
    ));
}

#[test]
fn test_error_display() {
    assert_eq!(
        BrokerError::EmptyCategory.to_string(),
        "category must not be empty"
    );
    assert_eq!(
        BrokerError::InvalidSubjectId.to_string(),
        "subject id must be positive"
    );
}

// --- Idempotent Unregistration ---

#[test]
fn test_unsubscribe_never_registered_handler() {
    let broker = EventBroker::new();
    broker.subscribe("Onboarded", noop_handler()).unwrap();

    // Different identity, same category: silent no-op.
    broker.unsubscribe("Onboarded", &noop_handler()).unwrap();
    assert_eq!(broker.handler_count("Onboarded"), 1);

    // Unknown category: silent no-op.
    broker.unsubscribe("Nonexistent", &noop_handler()).unwrap();
}

#[test]
fn test_unsubscribe_twice_is_noop() {
    let broker = EventBroker::new();
    let handler = noop_handler();
    broker.subscribe("Onboarded", Arc::clone(&handler)).unwrap();

    broker.unsubscribe("Onboarded", &handler).unwrap();
    broker.unsubscribe("Onboarded", &handler).unwrap();
    assert!(!broker.has_subscribers("Onboarded"));
}

// --- Handler Failure Isolation ---

#[test]
fn test_publish_survives_every_handler_failing() {
    let broker = EventBroker::new();
    for _ in 0..3 {
        let handler: HandlerRef = Arc::new(|_broker: &EventBroker, _event: &EventRecord| {
            panic!("broken subscriber");
        });
        broker.subscribe("Onboarded", handler).unwrap();
    }

    let event = EventRecord::new(SubjectId(1), "Ada", "Onboarded").unwrap();
    let outcome = broker.publish_record(&event);

    assert_eq!(outcome.attempted, 3);
    assert_eq!(outcome.delivered(), 0);
    assert_eq!(outcome.failures.len(), 3);
    for (index, failure) in outcome.failures.iter().enumerate() {
        assert_eq!(failure.handler_index, index);
        assert_eq!(failure.category, "Onboarded");
        assert_eq!(failure.message, "broken subscriber");
    }

    // Failures do not unsubscribe anyone.
    assert_eq!(broker.handler_count("Onboarded"), 3);
}

#[test]
fn test_failure_carries_formatted_panic_message() {
    let broker = EventBroker::new();
    let handler: HandlerRef = Arc::new(|_broker: &EventBroker, event: &EventRecord| {
        panic!("no seat assigned for {}", event.subject_name());
    });
    broker.subscribe("Onboarded", handler).unwrap();

    let event = EventRecord::new(SubjectId(1), "Ada", "Onboarded").unwrap();
    let outcome = broker.publish_record(&event);

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].message, "no seat assigned for Ada");
    assert_eq!(
        outcome.failures[0].to_string(),
        "handler #0 for \"Onboarded\" failed: no seat assigned for Ada"
    );
}

#[test]
fn test_handlers_after_failure_still_run() {
    let broker = EventBroker::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let panicking: HandlerRef =
        Arc::new(|_broker: &EventBroker, _event: &EventRecord| panic!("first in line"));
    broker.subscribe("Onboarded", panicking).unwrap();

    let counting: HandlerRef = {
        let counter = Arc::clone(&counter);
        Arc::new(move |_broker: &EventBroker, _event: &EventRecord| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    };
    broker.subscribe("Onboarded", counting).unwrap();

    let event = EventRecord::new(SubjectId(1), "Ada", "Onboarded").unwrap();
    broker.publish_record(&event);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

// --- Silent No-Ops ---

#[test]
fn test_publish_to_unknown_category() {
    let broker = EventBroker::new();
    let event = EventRecord::new(SubjectId(1), "Ada", "Onboarded").unwrap();

    let outcome = broker.publish("NeverSubscribed", &event);
    assert_eq!(outcome.attempted, 0);
    assert_eq!(outcome.delivered(), 0);
    assert!(outcome.is_clean());
}

#[test]
fn test_publish_with_blank_category_is_noop() {
    // No registry entry can exist for a blank category, so this is the
    // no-subscribers path rather than an error.
    let broker = EventBroker::new();
    let event = EventRecord::new(SubjectId(1), "Ada", "Onboarded").unwrap();
    let outcome = broker.publish("  ", &event);
    assert_eq!(outcome.attempted, 0);
}
