// Unit tests for pool change detection

use crate::client::pool_differs;

use models::Instance;

fn instance(local: &str, latency: Option<i32>) -> Instance {
    let mut instance = Instance::new(format!("wss://remote/{local}"), local);
    instance.latency = latency;
    instance
}

/// **VALUE**: Verifies disjoint key sets are reported as a change.
///
/// **WHY THIS MATTERS**: This is the "cache mirrors server" case: a cache of
/// `[b]` against a daemon pool of `[a]` must trigger a replacement notification.
///
/// **BUG THIS CATCHES**: Would catch a one-directional diff that only looks for
/// new keys and misses removed ones (or vice versa).
#[test]
fn given_disjoint_keys_when_diffed_then_differs() {
    assert!(pool_differs(&[instance("b", None)], &[instance("a", None)]));
    assert!(pool_differs(&[], &[instance("a", None)]));
    assert!(pool_differs(&[instance("a", None)], &[]));
}

/// **VALUE**: Verifies latency-only differences are not a change.
///
/// **WHY THIS MATTERS**: The daemon refreshes latency constantly. Notifying on
/// every latency tick would make observers re-render every sync.
///
/// **BUG THIS CATCHES**: Would catch comparing whole instances with `==`.
#[test]
fn given_same_keys_with_different_latency_when_diffed_then_same() {
    let cached = [instance("a", Some(10)), instance("b", Some(-1))];
    let fetched = [instance("b", Some(30)), instance("a", Some(12))];

    assert!(!pool_differs(&cached, &fetched));
}

#[test]
fn given_subset_keys_when_diffed_then_differs() {
    let cached = [instance("a", None)];
    let fetched = [instance("a", None), instance("c", None)];

    assert!(pool_differs(&cached, &fetched));
}

#[test]
fn given_empty_pools_when_diffed_then_same() {
    assert!(!pool_differs(&[], &[]));
}
