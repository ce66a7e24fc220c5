//! Cache Store Module
//!
//! The TTL cache engine: an in-memory map in front of an optional
//! persistent backend, with a clear watermark that lazily invalidates
//! persisted entries.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::cache::{current_timestamp_ms, CacheStats, CachedEntry, LAST_CLEARED_KEY};
use crate::config::CacheConfig;
use crate::storage::{SafeStorage, StorageBackend};

// == Key Composition ==
/// Maps the ordered key parts passed to `get`/`put` onto one primitive key.
pub type MakeKeyFn = dyn Fn(&[&str]) -> String + Send + Sync;

/// Default key composition: a single part, used verbatim.
fn single_part_key(parts: &[&str]) -> String {
    match parts {
        [key] => (*key).to_string(),
        _ => panic!(
            "default key composition takes exactly one key part, got {}",
            parts.len()
        ),
    }
}

// == Cache ==
/// A synchronous two-tier TTL cache.
///
/// Lookups hit the in-memory map first and fall back to the persistent
/// backend, memoizing what they find. Every entry lives for the
/// instance's uniform TTL. [`Cache::clear`] never scans the backend: it
/// records a watermark, and persisted entries older than the watermark
/// are purged lazily on their next access.
///
/// The public operations are infallible; storage trouble silently
/// degrades the cache to memory-only behavior. No operation blocks or
/// suspends mid-way, so for cross-thread use it is enough to wrap the
/// cache in `Arc<Mutex<_>>` with one lock around each call.
pub struct Cache<T> {
    /// Guarded persistent tier
    storage: SafeStorage,
    /// Uniform entry lifetime in milliseconds
    ttl_ms: i64,
    /// Key composition function
    make_key: Box<MakeKeyFn>,
    /// Process-lifetime memory tier
    memory: HashMap<String, CachedEntry<T>>,
    /// Entries persisted at or before this instant are logically cleared
    last_cleared: Option<i64>,
    /// Lookup counters
    stats: CacheStats,
}

impl<T> Cache<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    // == Constructors ==
    /// Builds a cache from its configuration.
    ///
    /// The clear watermark is loaded from the backend once, here, so an
    /// instance created after another instance's [`Cache::clear`] honors
    /// that clear even though the entries are physically still present.
    pub fn new(config: CacheConfig) -> Self {
        let storage = SafeStorage::new(
            config.storage,
            config.root_key.as_deref(),
            config.ser_deser,
        );
        let last_cleared = load_last_cleared(&storage);
        Self {
            storage,
            ttl_ms: config.ttl.as_millis() as i64,
            make_key: config
                .make_key_fn
                .unwrap_or_else(|| Box::new(single_part_key)),
            memory: HashMap::new(),
            last_cleared,
            stats: CacheStats::new(),
        }
    }

    /// Convenience constructor for the common backend + namespace + TTL
    /// case.
    pub fn with_backend(backend: Arc<dyn StorageBackend>, root_key: &str, ttl: Duration) -> Self {
        Self::new(
            CacheConfig::new()
                .with_storage(backend)
                .with_root_key(root_key)
                .with_ttl(ttl),
        )
    }

    // == Get ==
    /// Gets a value by its key parts.
    ///
    /// Returns `None` when nothing usable is cached: never stored,
    /// expired, cleared, or unreadable from the backend. An entry found
    /// only in the backend is memoized into the memory tier on the way
    /// out.
    ///
    /// # Panics
    /// Panics if `key_parts` does not match the arity the key composition
    /// function expects (exactly one part for the default).
    pub fn get(&mut self, key_parts: &[&str]) -> Option<T> {
        let key = (self.make_key)(key_parts);
        self.get_if_active(&key)
    }

    // == Put ==
    /// Stores a value under the composed key, replacing any previous
    /// entry, and returns the entry that was stored.
    ///
    /// The entry always lands in the memory tier. When a backend is
    /// configured it is persisted too; a value the codec rejects stays
    /// cached in memory while the persisted slot is dropped instead of
    /// going stale.
    ///
    /// # Panics
    /// Same arity contract as [`Cache::get`].
    pub fn put(&mut self, key_parts: &[&str], value: T) -> CachedEntry<T> {
        let key = (self.make_key)(key_parts);
        let now = current_timestamp_ms();
        let entry = CachedEntry::new(value, now, self.ttl_ms);

        self.memory.insert(key.clone(), entry.clone());
        self.save(&key, &entry);
        self.stats.set_total_entries(self.memory.len());
        entry
    }

    // == Remove ==
    /// Removes one entry from both tiers.
    ///
    /// Takes the *composed* key, not the raw key parts: callers using a
    /// custom key composition must compose the key themselves. This
    /// asymmetry with `get`/`put` is a deliberate part of the contract.
    pub fn remove(&mut self, key: &str) {
        self.memory.remove(key);
        self.storage.remove_item(key);
        self.stats.set_total_entries(self.memory.len());
    }

    // == Clear ==
    /// Drops every cached entry.
    ///
    /// The memory tier is emptied immediately. Persisted entries are not
    /// enumerated or deleted; the clear instant is persisted as a
    /// watermark instead, and entries cached at or before it are purged
    /// lazily when next accessed.
    pub fn clear(&mut self) {
        self.memory.clear();
        let now = current_timestamp_ms();
        self.last_cleared = Some(now);
        self.storage
            .set_item(LAST_CLEARED_KEY, &json!({ "timestamp": now }));
        self.stats.set_total_entries(0);
        info!(cleared_at = now, "cache cleared");
    }

    // == Purge Expired ==
    /// Sweeps expired entries out of the memory tier, together with their
    /// persisted copies. Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired_keys: Vec<String> = self
            .memory
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.memory.remove(&key);
            self.storage.remove_item(&key);
            self.stats.record_expiration();
        }
        self.stats.set_total_entries(self.memory.len());

        if count > 0 {
            debug!(removed = count, "purged expired entries");
        }
        count
    }

    // == Stats ==
    /// Returns a snapshot of the lookup counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.memory.len());
        stats
    }

    // == Length ==
    /// Number of entries currently held in the memory tier.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    // == Is Empty ==
    /// Returns true when the memory tier holds no entries.
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Instant of the most recent clear observed by this namespace.
    pub fn last_cleared(&self) -> Option<i64> {
        self.last_cleared
    }

    // == Internal: Lookup ==
    fn get_if_active(&mut self, key: &str) -> Option<T> {
        if !self.memory.contains_key(key) {
            if let Some(entry) = self.load(key) {
                self.stats.record_persistent_load();
                self.memory.insert(key.to_string(), entry);
            }
        }

        let now = current_timestamp_ms();
        let expired = match self.memory.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.memory.remove(key);
            self.storage.remove_item(key);
            self.stats.record_expiration();
            self.stats.record_miss();
            self.stats.set_total_entries(self.memory.len());
            return None;
        }

        self.stats.record_hit();
        self.memory.get(key).map(|entry| entry.value.clone())
    }

    // == Internal: Persistence ==
    // Loads a persisted entry, purging it when it is malformed or
    // predates the clear watermark.
    fn load(&self, key: &str) -> Option<CachedEntry<T>> {
        let value = self.storage.get_item(key)?;
        let entry = match serde_json::from_value::<CachedEntry<T>>(value) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(key, error = %err, "persisted entry has unusable shape, purging");
                self.storage.remove_item(key);
                return None;
            }
        };
        if self
            .last_cleared
            .is_some_and(|cleared| entry.cached_at <= cleared)
        {
            self.storage.remove_item(key);
            return None;
        }
        Some(entry)
    }

    fn save(&self, key: &str, entry: &CachedEntry<T>) {
        match serde_json::to_value(entry) {
            Ok(value) => self.storage.set_item(key, &value),
            Err(err) => {
                debug!(key, error = %err, "value cannot be persisted, dropping stale copy");
                self.storage.remove_item(key);
            }
        }
    }
}

fn load_last_cleared(storage: &SafeStorage) -> Option<i64> {
    let marker = storage.get_item(LAST_CLEARED_KEY)?;
    marker.get("timestamp").and_then(Value::as_i64)
}

impl<T> fmt::Debug for Cache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("entries", &self.memory.len())
            .field("ttl_ms", &self.ttl_ms)
            .field("last_cleared", &self.last_cleared)
            .field("storage", &self.storage)
            .finish()
    }
}
