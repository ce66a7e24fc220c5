//! Property-Based Tests for the Cache
//!
//! Uses proptest to verify the cache's behavioral properties over
//! generated keys, values, and operation sequences.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::storage::MemoryBackend;

// == Test Configuration ==
const LONG_TTL: Duration = Duration::from_secs(60);

// == Strategies ==
/// Generates cache keys that cannot collide with the reserved watermark key
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,32}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,128}"
}

/// A single cache operation for sequence-based properties
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: String },
    Get { key: String },
    Remove { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Put { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Remove { key }),
    ]
}

fn memory_only() -> Cache<String> {
    Cache::new(CacheConfig::new().with_ttl(LONG_TTL))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A put followed by a get returns exactly the stored value.
    #[test]
    fn prop_roundtrip(key in key_strategy(), value in value_strategy()) {
        let mut cache = memory_only();

        cache.put(&[&key], value.clone());

        prop_assert_eq!(cache.get(&[&key]), Some(value));
    }

    // Storing twice under one key leaves only the second value visible.
    #[test]
    fn prop_overwrite(
        key in key_strategy(),
        first in value_strategy(),
        second in value_strategy()
    ) {
        let mut cache = memory_only();

        cache.put(&[&key], first);
        cache.put(&[&key], second.clone());

        prop_assert_eq!(cache.get(&[&key]), Some(second));
        prop_assert_eq!(cache.len(), 1);
    }

    // After remove, a get finds nothing.
    #[test]
    fn prop_remove_erases(key in key_strategy(), value in value_strategy()) {
        let mut cache = memory_only();

        cache.put(&[&key], value);
        prop_assert!(cache.get(&[&key]).is_some());

        // Default composition: the composed key is the single part itself
        cache.remove(&key);

        prop_assert_eq!(cache.get(&[&key]), None);
    }

    // Entry timestamps always satisfy expires_at == cached_at + ttl.
    #[test]
    fn prop_entry_ttl_offset(key in key_strategy(), value in value_strategy()) {
        let mut cache = memory_only();

        let entry = cache.put(&[&key], value);

        prop_assert_eq!(entry.expires_at, entry.cached_at + LONG_TTL.as_millis() as i64);
    }

    // For any operation sequence, hit/miss counters match a model replay.
    #[test]
    fn prop_stats_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut cache = memory_only();
        let mut model: HashMap<String, String> = HashMap::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    cache.put(&[&key], value.clone());
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    let got = cache.get(&[&key]);
                    if model.contains_key(&key) {
                        expected_hits += 1;
                        prop_assert_eq!(got.as_ref(), model.get(&key));
                    } else {
                        expected_misses += 1;
                        prop_assert_eq!(got, None);
                    }
                }
                CacheOp::Remove { key } => {
                    cache.remove(&key);
                    model.remove(&key);
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "misses mismatch");
        prop_assert_eq!(stats.total_entries, model.len(), "entry count mismatch");
    }

    // A value persisted by one instance is readable by a fresh instance
    // over the same backend and namespace.
    #[test]
    fn prop_persistence_roundtrip(key in key_strategy(), value in value_strategy()) {
        let backend = Arc::new(MemoryBackend::new());

        let mut writer: Cache<String> =
            Cache::with_backend(backend.clone(), "ns", LONG_TTL);
        writer.put(&[&key], value.clone());

        let mut reader: Cache<String> =
            Cache::with_backend(backend.clone(), "ns", LONG_TTL);
        prop_assert_eq!(reader.get(&[&key]), Some(value));
    }

    // After clear, persisted entries are invisible to any later instance,
    // even though their own TTLs have not elapsed.
    #[test]
    fn prop_clear_invalidates_persisted(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..10)
    ) {
        let backend = Arc::new(MemoryBackend::new());

        let mut writer: Cache<String> =
            Cache::with_backend(backend.clone(), "ns", LONG_TTL);
        for (key, value) in &entries {
            writer.put(&[key.as_str()], value.clone());
        }
        writer.clear();

        let mut reader: Cache<String> =
            Cache::with_backend(backend.clone(), "ns", LONG_TTL);
        for (key, _) in &entries {
            prop_assert_eq!(reader.get(&[key.as_str()]), None);
        }
    }

    // A custom key composition maps equal part sequences to equal slots
    // and distinct part sequences to distinct slots.
    #[test]
    fn prop_key_composition(
        a in key_strategy(),
        b in key_strategy(),
        other in key_strategy(),
        value in value_strategy()
    ) {
        prop_assume!(b != other);

        let mut cache: Cache<String> = Cache::new(
            CacheConfig::new()
                .with_ttl(LONG_TTL)
                .with_make_key_fn(|parts: &[&str]| parts.join(":")),
        );

        cache.put(&[&a, &b], value.clone());

        prop_assert_eq!(cache.get(&[&a, &b]), Some(value));
        prop_assert_eq!(cache.get(&[&a, &other]), None);
    }
}

// Separate block with few cases for the time-sensitive TTL property
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // Entries are visible strictly before their TTL elapses and gone after.
    #[test]
    fn prop_ttl_expiration(key in key_strategy(), value in value_strategy()) {
        let backend = Arc::new(MemoryBackend::new());
        let mut cache: Cache<String> =
            Cache::with_backend(backend.clone(), "ns", Duration::from_millis(80));

        cache.put(&[&key], value.clone());
        prop_assert_eq!(cache.get(&[&key]), Some(value));

        sleep(Duration::from_millis(120));

        prop_assert_eq!(cache.get(&[&key]), None);
        let stored_key = format!("ns${}", key);
        prop_assert!(!backend.contains(&stored_key));
    }
}
