//! Tiercache - a synchronous two-tier TTL key-value cache
//!
//! Sits in front of expensive or repeated computations. Lookups hit a
//! process-lifetime memory map first and fall back to an optional
//! persistent backend, memoizing what they find. The public API never
//! fails because of storage trouble: a broken, full, or absent backend
//! silently degrades the cache to memory-only behavior.
//!
//! Clearing the cache does not scan the backend. A watermark is persisted
//! instead, and persisted entries older than it are purged lazily when
//! next accessed.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tiercache::{Cache, CacheConfig, MemoryBackend};
//!
//! let backend = Arc::new(MemoryBackend::new());
//! let mut cache: Cache<String> = Cache::new(
//!     CacheConfig::new()
//!         .with_storage(backend)
//!         .with_root_key("session")
//!         .with_ttl(Duration::from_secs(60)),
//! );
//!
//! cache.put(&["user:42"], "Ada".to_string());
//! assert_eq!(cache.get(&["user:42"]), Some("Ada".to_string()));
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod storage;

pub use cache::{current_timestamp_ms, Cache, CacheStats, CachedEntry};
pub use config::CacheConfig;
pub use error::StorageError;
pub use storage::{JsonSerDeser, MemoryBackend, SafeStorage, SerDeser, StorageBackend};
