//! Configuration Module
//!
//! Construction options for a cache instance, with environment overrides.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::MakeKeyFn;
use crate::storage::{SerDeser, StorageBackend};

/// Entry lifetime used when none is configured: five minutes.
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

/// Cache construction options.
///
/// Every field has a usable default: `CacheConfig::default()` describes a
/// memory-only cache with a five minute TTL, single-part keys, and the
/// JSON codec.
pub struct CacheConfig {
    /// Optional persistent backend, possibly shared with other caches
    pub storage: Option<Arc<dyn StorageBackend>>,
    /// Namespace prefix isolating this cache inside a shared backend
    pub root_key: Option<String>,
    /// Uniform lifetime applied to every entry
    pub ttl: Duration,
    /// Maps ordered key parts to a single primitive key
    pub make_key_fn: Option<Box<MakeKeyFn>>,
    /// Codec between values and their persisted string form
    pub ser_deser: Option<Box<dyn SerDeser>>,
}

impl CacheConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration with overrides from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - entry lifetime in milliseconds (default: 300000)
    /// - `CACHE_ROOT_KEY` - namespace prefix (default: none)
    pub fn from_env() -> Self {
        Self {
            ttl: env::var("CACHE_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TTL),
            root_key: env::var("CACHE_ROOT_KEY").ok().filter(|v| !v.is_empty()),
            ..Self::default()
        }
    }

    /// Sets the persistent backend.
    pub fn with_storage(mut self, storage: Arc<dyn StorageBackend>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Sets the namespace prefix.
    pub fn with_root_key(mut self, root_key: impl Into<String>) -> Self {
        self.root_key = Some(root_key.into());
        self
    }

    /// Sets the uniform entry lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the key composition function.
    pub fn with_make_key_fn(
        mut self,
        make_key_fn: impl Fn(&[&str]) -> String + Send + Sync + 'static,
    ) -> Self {
        self.make_key_fn = Some(Box::new(make_key_fn));
        self
    }

    /// Sets the codec used for persisted values.
    pub fn with_ser_deser(mut self, ser_deser: impl SerDeser + 'static) -> Self {
        self.ser_deser = Some(Box::new(ser_deser));
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            storage: None,
            root_key: None,
            ttl: DEFAULT_TTL,
            make_key_fn: None,
            ser_deser: None,
        }
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("persistent", &self.storage.is_some())
            .field("root_key", &self.root_key)
            .field("ttl", &self.ttl)
            .field("custom_key_fn", &self.make_key_fn.is_some())
            .field("custom_ser_deser", &self.ser_deser.is_some())
            .finish()
    }
}
