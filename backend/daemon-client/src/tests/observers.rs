// Unit tests for the observer registry
// Tests ordering, removal, and re-entrant subscription

use crate::client::ObserverRegistry;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// **VALUE**: Verifies observers run in subscription order with the notified value.
///
/// **WHY THIS MATTERS**: View layers often subscribe a store first and a renderer
/// second; reversing the order renders stale data.
///
/// **BUG THIS CATCHES**: Would catch a switch to an unordered collection.
#[test]
fn given_two_observers_when_notified_then_called_in_subscription_order() {
    // GIVEN: Two observers recording into a shared log
    let registry: ObserverRegistry<u32> = ObserverRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let first_log = Arc::clone(&log);
    registry.subscribe(Arc::new(move |value: &u32| {
        first_log.lock().unwrap().push(("first", *value))
    }));
    let second_log = Arc::clone(&log);
    registry.subscribe(Arc::new(move |value: &u32| {
        second_log.lock().unwrap().push(("second", *value))
    }));

    // WHEN: Notifying
    registry.notify(&7);

    // THEN: Both ran, in order, with the value
    assert_eq!(*log.lock().unwrap(), vec![("first", 7), ("second", 7)]);
}

/// **VALUE**: Verifies unsubscribed observers are no longer called.
///
/// **WHY THIS MATTERS**: Without removal, every short-lived view that subscribes
/// leaks its callback for the lifetime of the client.
///
/// **BUG THIS CATCHES**: Would catch removal by index instead of id, or a
/// second unsubscribe reporting success.
#[test]
fn given_unsubscribed_observer_when_notified_then_not_called() {
    let registry: ObserverRegistry<u32> = ObserverRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let id = registry.subscribe(Arc::new(move |_: &u32| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    assert!(registry.unsubscribe(id));
    assert!(!registry.unsubscribe(id));

    registry.notify(&1);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(registry.len(), 0);
}

/// **VALUE**: Verifies an observer can subscribe another observer from its callback.
///
/// **WHY THIS MATTERS**: Notification must not hold the registry lock, or a
/// callback that touches the registry deadlocks the poll loop.
///
/// **BUG THIS CATCHES**: Would catch calling observers while the mutex is held.
#[test]
fn given_reentrant_observer_when_notified_then_does_not_deadlock() {
    let registry: Arc<ObserverRegistry<u32>> = Arc::new(ObserverRegistry::new());

    let inner_registry = Arc::clone(&registry);
    registry.subscribe(Arc::new(move |_: &u32| {
        inner_registry.subscribe(Arc::new(|_: &u32| {}));
    }));

    registry.notify(&1);

    assert_eq!(registry.len(), 2);
}
