//! Safe Storage Module
//!
//! Defensive adapter around an optional storage backend. Normalizes key
//! namespacing and serialization, and converts every backend or codec
//! failure into a logged no-op so callers never need their own guards.
//! Unparsable entries are purged from the backend on sight.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, StorageError};
use crate::storage::{StorageBackend, ROOT_KEY_SEPARATOR};

// == SerDeser Trait ==
/// Bidirectional codec between cached values and their raw string form.
///
/// Implementations must return `Err` on any input they cannot handle;
/// `SafeStorage` relies on that failure to purge bad entries from the
/// backend. Returning a placeholder value instead would leave malformed
/// data behind forever.
pub trait SerDeser: Send + Sync {
    /// Converts a value into the string handed to the backend.
    fn serialize(&self, item: &Value) -> Result<String>;

    /// Converts raw backend data back into a value.
    fn deserialize(&self, raw: &str) -> Result<Value>;
}

// == Json SerDeser ==
/// Default codec: compact JSON.
///
/// Rejects null and non-container values on serialization and empty input
/// on deserialization, so that a half-written or truncated slot is treated
/// as malformed rather than round-tripped.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerDeser;

impl SerDeser for JsonSerDeser {
    fn serialize(&self, item: &Value) -> Result<String> {
        if item.is_null() {
            return Err(StorageError::Serialize(
                "refusing to serialize null cached item".to_string(),
            ));
        }
        if !item.is_object() && !item.is_array() {
            return Err(StorageError::Serialize(
                "refusing to serialize non-object cached item".to_string(),
            ));
        }
        serde_json::to_string(item).map_err(|err| StorageError::Serialize(err.to_string()))
    }

    fn deserialize(&self, raw: &str) -> Result<Value> {
        if raw.is_empty() {
            return Err(StorageError::Deserialize(
                "refusing to deserialize empty cached item".to_string(),
            ));
        }
        serde_json::from_str(raw).map_err(|err| StorageError::Deserialize(err.to_string()))
    }
}

// == Safe Storage ==
/// A failure-free, namespaced view over an optional [`StorageBackend`].
///
/// With no delegate configured, every operation is a no-op and reads
/// return absent. With a delegate, all keys are prefixed with the root
/// key, values pass through the codec, and any error either direction is
/// logged and swallowed. Writes that cannot complete degrade to removing
/// the slot, so the backend never holds data newer code cannot read.
pub struct SafeStorage {
    /// Optional backend handle, possibly shared with other caches
    delegate: Option<Arc<dyn StorageBackend>>,
    /// Prefix applied to every logical key ("" when not namespaced)
    root_key: String,
    /// Codec between values and raw backend strings
    ser_deser: Box<dyn SerDeser>,
}

impl SafeStorage {
    // == Constructor ==
    /// Wraps `delegate` under `root_key`, using `ser_deser` as the codec.
    ///
    /// `None` for the codec selects [`JsonSerDeser`]. A `Some` root key is
    /// stored with a trailing separator, so logical key `k` under root
    /// `ns` lands at backend key `ns$k`.
    pub fn new(
        delegate: Option<Arc<dyn StorageBackend>>,
        root_key: Option<&str>,
        ser_deser: Option<Box<dyn SerDeser>>,
    ) -> Self {
        let root_key = match root_key {
            Some(root) => format!("{root}{ROOT_KEY_SEPARATOR}"),
            None => String::new(),
        };
        Self {
            delegate,
            root_key,
            ser_deser: ser_deser.unwrap_or_else(|| Box::new(JsonSerDeser)),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.root_key, key)
    }

    /// Whether a persistent delegate is configured at all.
    pub fn is_persistent(&self) -> bool {
        self.delegate.is_some()
    }

    // == Get Item ==
    /// Reads and decodes the value stored under `key`.
    ///
    /// Returns `None` when there is no delegate, the backend has no entry
    /// (or cannot be read), or the raw data is empty. Data the codec
    /// rejects is removed from the backend before returning `None`.
    pub fn get_item(&self, key: &str) -> Option<Value> {
        let delegate = self.delegate.as_ref()?;
        let full_key = self.full_key(key);

        let raw = match delegate.get_item(&full_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                debug!(key = %full_key, error = %err, "backend read failed, treating as absent");
                return None;
            }
        };
        if raw.is_empty() {
            return None;
        }

        match self.ser_deser.deserialize(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key = %full_key, error = %err, "unparsable cached data, purging entry");
                self.remove_item(key);
                None
            }
        }
    }

    // == Set Item ==
    /// Encodes `value` and writes it under `key`.
    ///
    /// No-op without a delegate. If the codec rejects the value or the
    /// backend refuses the write, the slot is removed instead, leaving it
    /// absent rather than stale.
    pub fn set_item(&self, key: &str, value: &Value) {
        if self.delegate.is_none() {
            return;
        }
        if let Err(err) = self.try_set(key, value) {
            debug!(key = %self.full_key(key), error = %err, "persist failed, leaving slot absent");
            self.remove_item(key);
        }
    }

    fn try_set(&self, key: &str, value: &Value) -> Result<()> {
        let delegate = self
            .delegate
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("no delegate configured".to_string()))?;
        let raw = self.ser_deser.serialize(value)?;
        delegate.set_item(&self.full_key(key), &raw)
    }

    // == Remove Item ==
    /// Deletes `key` from the backend. No-op without a delegate; backend
    /// failures are logged and swallowed.
    pub fn remove_item(&self, key: &str) {
        let Some(delegate) = self.delegate.as_ref() else {
            return;
        };
        if let Err(err) = delegate.remove_item(&self.full_key(key)) {
            debug!(key = %self.full_key(key), error = %err, "backend remove failed");
        }
    }
}

impl fmt::Debug for SafeStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeStorage")
            .field("root_key", &self.root_key)
            .field("persistent", &self.delegate.is_some())
            .finish()
    }
}
