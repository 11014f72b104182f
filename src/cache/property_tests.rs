//! Property-Based Tests for the Cache Module
//!
//! Uses proptest to verify the store's budget, eviction and accounting
//! properties over arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

use crate::cache::{CacheStore, ImageHandle};

// == Test Configuration ==
const TEST_BUDGET_BYTES: u64 = 4096;
const TEST_MAX_AGE: Duration = Duration::from_secs(300);

fn test_store(budget: u64) -> CacheStore {
    CacheStore::new(budget, TEST_MAX_AGE)
}

fn handle(size: usize) -> ImageHandle {
    ImageHandle::new(vec![0u8; size])
}

// == Strategies ==
/// Generates URL-shaped cache keys
fn url_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,24}".prop_map(|s| format!("/pages/{}.png", s))
}

/// Generates payload sizes well under the test budget
fn size_strategy() -> impl Strategy<Value = usize> {
    1usize..512
}

/// A sequence of store operations for testing
#[derive(Debug, Clone)]
enum StoreOp {
    Insert { url: String, size: usize },
    Lookup { url: String },
    Remove { url: String },
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        (url_strategy(), size_strategy()).prop_map(|(url, size)| StoreOp::Insert { url, size }),
        url_strategy().prop_map(|url| StoreOp::Lookup { url }),
        url_strategy().prop_map(|url| StoreOp::Remove { url }),
    ]
}

/// Applies an op at a synthetic, strictly increasing clock.
fn apply(store: &mut CacheStore, op: &StoreOp, now_ms: u64) -> Option<bool> {
    match op {
        StoreOp::Insert { url, size } => {
            store.insert(url, handle(*size), now_ms);
            None
        }
        StoreOp::Lookup { url } => Some(store.lookup(url, now_ms).is_some()),
        StoreOp::Remove { url } => {
            store.remove(url);
            None
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations, the hit/miss counters reflect
    // exactly the lookups that found or missed an entry.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(store_op_strategy(), 1..50)) {
        let mut store = test_store(TEST_BUDGET_BYTES);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for (tick, op) in ops.iter().enumerate() {
            match apply(&mut store, op, tick as u64) {
                Some(true) => expected_hits += 1,
                Some(false) => expected_misses += 1,
                None => {}
            }
        }

        let report = store.report(ops.len() as u64);
        prop_assert_eq!(report.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(report.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(report.total_entries, store.len(), "Total entries mismatch");
    }

    // For any sequence of inserts, the total size stays within the byte
    // budget, except when a single payload alone exceeds it - in which
    // case that payload is the only entry left.
    #[test]
    fn prop_byte_budget_enforced(
        inserts in prop::collection::vec((url_strategy(), 1usize..2048), 1..60)
    ) {
        let budget: u64 = 1024;
        let mut store = test_store(budget);

        for (tick, (url, size)) in inserts.iter().enumerate() {
            store.insert(url, handle(*size), tick as u64);
            if store.total_size() > budget {
                prop_assert_eq!(
                    store.len(),
                    1,
                    "Budget exceeded with more than the single oversized entry"
                );
            }
        }
    }

    // Total size always equals the sum of live entry sizes, whatever the
    // mix of inserts, overwrites and removals.
    #[test]
    fn prop_size_accounting_consistent(ops in prop::collection::vec(store_op_strategy(), 1..60)) {
        let mut store = test_store(TEST_BUDGET_BYTES);
        let mut live: std::collections::HashMap<String, u64> = std::collections::HashMap::new();

        for (tick, op) in ops.iter().enumerate() {
            apply(&mut store, op, tick as u64);
            match op {
                StoreOp::Insert { url, size } => {
                    live.insert(url.clone(), *size as u64);
                    // Mirror evictions: drop tracked urls no longer present
                    live.retain(|tracked, _| store.peek(tracked));
                }
                StoreOp::Remove { url } => {
                    live.remove(url);
                }
                StoreOp::Lookup { .. } => {}
            }
        }

        let expected: u64 = live.values().sum();
        prop_assert_eq!(store.total_size(), expected, "Size accounting drifted");
    }

    // Storing a payload under an existing key replaces it: one entry,
    // the new payload's size.
    #[test]
    fn prop_overwrite_semantics(
        url in url_strategy(),
        first_size in size_strategy(),
        second_size in size_strategy()
    ) {
        let mut store = test_store(TEST_BUDGET_BYTES);

        store.insert(&url, handle(first_size), 0);
        store.insert(&url, handle(second_size), 1);

        prop_assert_eq!(store.len(), 1, "Overwrite should keep a single entry");
        prop_assert_eq!(store.total_size(), second_size as u64);
    }

    // Clearing drops every entry and zeroes the counters regardless of
    // prior activity.
    #[test]
    fn prop_clear_resets(ops in prop::collection::vec(store_op_strategy(), 1..40)) {
        let mut store = test_store(TEST_BUDGET_BYTES);

        for (tick, op) in ops.iter().enumerate() {
            apply(&mut store, op, tick as u64);
        }

        store.clear();

        let report = store.report(ops.len() as u64);
        prop_assert_eq!(report.total_entries, 0);
        prop_assert_eq!(report.total_size_bytes, 0);
        prop_assert_eq!(report.hits, 0);
        prop_assert_eq!(report.misses, 0);
        prop_assert_eq!(report.hit_rate, 0.0);
    }
}

// Property tests for LRU eviction behavior
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // When inserts push the store over budget, the least recently used
    // entry goes first.
    #[test]
    fn prop_lru_eviction_order(
        urls in prop::collection::vec(url_strategy(), 3..10),
        new_url in url_strategy()
    ) {
        let unique_urls: Vec<String> = urls
            .into_iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        prop_assume!(unique_urls.len() >= 2);
        prop_assume!(!unique_urls.contains(&new_url));

        // Size the budget for exactly the initial set
        let entry_size: usize = 64;
        let budget = (unique_urls.len() * entry_size) as u64;
        let mut store = test_store(budget);

        let oldest_url = unique_urls[0].clone();
        for (tick, url) in unique_urls.iter().enumerate() {
            store.insert(url, handle(entry_size), tick as u64);
        }

        prop_assert_eq!(store.total_size(), budget, "Store should be at budget");

        // Adding one more entry must push out the first-inserted URL
        store.insert(&new_url, handle(entry_size), unique_urls.len() as u64);

        prop_assert!(!store.peek(&oldest_url), "Oldest URL should have been evicted");
        prop_assert!(store.peek(&new_url), "New URL should exist after insertion");
        prop_assert!(store.total_size() <= budget, "Budget exceeded after eviction");

        for url in unique_urls.iter().skip(1) {
            prop_assert!(store.peek(url), "URL '{}' should still exist (not the oldest)", url);
        }
    }

    // A hit protects the entry: after touching the would-be victim, the
    // next-oldest entry is evicted instead.
    #[test]
    fn prop_lru_access_tracking(
        urls in prop::collection::vec(url_strategy(), 3..8),
        new_url in url_strategy()
    ) {
        let unique_urls: Vec<String> = urls
            .into_iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        prop_assume!(unique_urls.len() >= 3);
        prop_assume!(!unique_urls.contains(&new_url));

        let entry_size: usize = 64;
        let budget = (unique_urls.len() * entry_size) as u64;
        let mut store = test_store(budget);

        for (tick, url) in unique_urls.iter().enumerate() {
            store.insert(url, handle(entry_size), tick as u64);
        }

        // Touch the first-inserted URL so it is no longer the victim
        let touched_url = unique_urls[0].clone();
        let expected_victim = unique_urls[1].clone();
        let _ = store.lookup(&touched_url, unique_urls.len() as u64);

        store.insert(&new_url, handle(entry_size), (unique_urls.len() + 1) as u64);

        prop_assert!(store.peek(&touched_url), "Touched URL should not be evicted");
        prop_assert!(!store.peek(&expected_victim), "Next-oldest URL should have been evicted");
        prop_assert!(store.peek(&new_url), "New URL should exist");
    }
}
