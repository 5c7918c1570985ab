//! Property-Based Tests for Cache-Aside Aggregation
//!
//! **Property 1: Cached results equal fresh results**
//!
//! For any record set and topic, a value served from cache SHALL equal the
//! value a fresh aggregation over the same records produces.
//!
//! **Property 2: Empty results are never cached on read**
//!
//! For any record set where a view is empty, repeated reads SHALL recompute
//! every time and leave the key absent.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gallop_core::{count_by_topic, list_topics, CacheKey, GallopError, StateCount};
use gallop_storage::{CacheAside, InMemoryCacheStore, InMemoryRecordStore, RecordStore};
use gallop_test_utils::fixtures::health_records;
use gallop_test_utils::generators::{arb_records, arb_topic};
use proptest::prelude::*;
use tokio::runtime::Runtime;

fn test_runtime() -> Result<Runtime, TestCaseError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

/// Cache-aside read of a topic aggregate, counting record fetches.
async fn cached_counts(
    cache: &CacheAside,
    records: &InMemoryRecordStore,
    topic: &gallop_core::Topic,
    fetches: &AtomicUsize,
) -> Result<Option<Vec<StateCount>>, GallopError> {
    let key = CacheKey::IdeologyByTopic(topic.clone()).to_string();
    cache
        .get_or_compute_default(&key, || async move {
            fetches.fetch_add(1, Ordering::SeqCst);
            let rows = records.fetch_records().await?;
            Ok::<_, GallopError>(Some(count_by_topic(topic, &rows)))
        })
        .await
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_cached_counts_match_fresh(records in arb_records(), topic in arb_topic()) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let store = Arc::new(InMemoryCacheStore::new());
            let cache = CacheAside::with_defaults(store.clone());
            let record_store = InMemoryRecordStore::with_records(records.clone());
            let fetches = AtomicUsize::new(0);

            let first = cached_counts(&cache, &record_store, &topic, &fetches)
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            let second = cached_counts(&cache, &record_store, &topic, &fetches)
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?;

            let fresh = count_by_topic(&topic, &records);
            let key = CacheKey::IdeologyByTopic(topic.clone()).to_string();

            if fresh.is_empty() {
                prop_assert_eq!(first, None);
                prop_assert_eq!(second, None);
                prop_assert_eq!(fetches.load(Ordering::SeqCst), 2);
                prop_assert!(!store.contains_key(&key).await);
            } else {
                prop_assert_eq!(first.as_ref(), Some(&fresh));
                prop_assert_eq!(second.as_ref(), Some(&fresh));
                prop_assert_eq!(fetches.load(Ordering::SeqCst), 1);
                prop_assert!(store.contains_key(&key).await);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn prop_differently_cased_topics_share_an_entry(records in arb_records(), topic in arb_topic()) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let cache = CacheAside::with_defaults(Arc::new(InMemoryCacheStore::new()));
            let record_store = InMemoryRecordStore::with_records(records.clone());
            let fetches = AtomicUsize::new(0);

            let upper = gallop_core::Topic::new(topic.as_str().to_uppercase());
            let a = cached_counts(&cache, &record_store, &topic, &fetches)
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            let b = cached_counts(&cache, &record_store, &upper, &fetches)
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(a, b);
            Ok::<(), TestCaseError>(())
        })?;
    }
}

#[tokio::test]
async fn test_empty_record_set_topics_never_cached() -> Result<(), GallopError> {
    let store = Arc::new(InMemoryCacheStore::new());
    let cache = CacheAside::with_defaults(store.clone());
    let records = InMemoryRecordStore::new();
    let fetches = AtomicUsize::new(0);
    let fetches = &fetches;
    let records = &records;
    let key = CacheKey::IdeologyTopics.to_string();

    for _ in 0..2 {
        let topics: Option<Vec<String>> = cache
            .get_or_compute_default(&key, || async move {
                fetches.fetch_add(1, Ordering::SeqCst);
                let rows = records.fetch_records().await?;
                Ok::<_, GallopError>(Some(list_topics(&rows)))
            })
            .await?;
        assert_eq!(topics, None);
    }

    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert!(!store.contains_key(&key).await);
    Ok(())
}

#[tokio::test]
async fn test_failing_record_store_propagates() {
    let cache = CacheAside::with_defaults(Arc::new(InMemoryCacheStore::new()));
    let records = InMemoryRecordStore::with_records(health_records());
    records.set_failing(true);
    let fetches = AtomicUsize::new(0);

    let result = cached_counts(&cache, &records, &gallop_core::Topic::new("health"), &fetches).await;
    assert!(matches!(result, Err(GallopError::Storage(_))));
    assert_eq!(cache.stats().writes, 0);
}

#[tokio::test]
async fn test_health_scenario_served_from_cache() -> Result<(), GallopError> {
    let cache = CacheAside::with_defaults(Arc::new(InMemoryCacheStore::new()));
    let records = InMemoryRecordStore::with_records(health_records());
    let fetches = AtomicUsize::new(0);
    let topic = gallop_core::Topic::new("Health");

    let first = cached_counts(&cache, &records, &topic, &fetches).await?;
    records.replace(Vec::new()).await;
    let second = cached_counts(&cache, &records, &topic, &fetches).await?;

    let expected = vec![StateCount {
        state: "CA".to_string(),
        count: 2,
    }];
    assert_eq!(first, Some(expected.clone()));
    assert_eq!(second, Some(expected));
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    Ok(())
}
