//! Storage Backend Module
//!
//! The capability trait consumed by the cache for persistence, plus an
//! in-process HashMap implementation of it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Result, StorageError};

// == Storage Backend Trait ==
/// A narrow capability interface over a persistent key-value store.
///
/// Implementations report failures through [`StorageError`] and are free to
/// fail on every call; `SafeStorage` absorbs whatever comes back. The trait
/// is `Send + Sync` so a single backend can be shared by several cache
/// instances across threads, and implementations must stay internally
/// consistent under that sharing.
pub trait StorageBackend: Send + Sync {
    /// Reads the raw string stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous data.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}

// == Memory Backend ==
/// Process-local backend storing raw strings in a mutex-guarded map.
///
/// Useful on its own in tests, and as the shared backend when several
/// caches in one process need to observe each other's writes.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    // == Constructor ==
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| StorageError::Unavailable("backend mutex poisoned".to_string()))
    }

    // == Length ==
    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    // == Is Empty ==
    /// Returns true if the backend holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Contains ==
    /// Checks whether a raw (already namespaced) key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.items
            .lock()
            .map(|items| items.contains_key(key))
            .unwrap_or(false)
    }

    // == Seed ==
    /// Inserts a raw value directly, bypassing any serialization.
    ///
    /// Intended for pre-populating the backend in tests, e.g. with data a
    /// previous process would have left behind.
    pub fn seed(&self, key: &str, value: &str) {
        if let Ok(mut items) = self.items.lock() {
            items.insert(key.to_string(), value.to_string());
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items()?.remove(key);
        Ok(())
    }
}
