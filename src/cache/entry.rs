//! Cache Entry Module
//!
//! The immutable envelope wrapped around every cached value.

use chrono::Utc;
use serde::{Deserialize, Serialize};

// == Cached Entry ==
/// A cached value together with the timestamps governing its lifetime.
///
/// Entries are created by `Cache::put` and never mutated afterwards;
/// replacing a key always builds a fresh entry. The same shape is what
/// gets persisted, so a rehydrated entry carries its original timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEntry<T> {
    /// The cached payload, opaque to the cache
    pub value: T,
    /// Creation timestamp (Unix milliseconds)
    pub cached_at: i64,
    /// Timestamp at which the entry becomes stale (Unix milliseconds)
    pub expires_at: i64,
}

impl<T> CachedEntry<T> {
    // == Constructor ==
    /// Creates an entry cached at `cached_at` and expiring `ttl_ms` later.
    pub(crate) fn new(value: T, cached_at: i64, ttl_ms: i64) -> Self {
        Self {
            value,
            cached_at,
            expires_at: cached_at + ttl_ms,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is stale at instant `now`.
    ///
    /// The boundary counts as stale: once `expires_at` is reached the
    /// entry is gone.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    /// Checks whether the entry is stale right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds; 0 once expired.
    pub fn ttl_remaining_ms(&self) -> i64 {
        (self.expires_at - current_timestamp_ms()).max(0)
    }
}

// == Utility Functions ==
/// Returns the current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}
