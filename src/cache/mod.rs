//! Cache Module
//!
//! Two-tier TTL caching: a process-lifetime memory map in front of an
//! optional persistent backend, with lazy watermark invalidation.

mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, CachedEntry};
pub use stats::CacheStats;
pub use store::{Cache, MakeKeyFn};

// == Public Constants ==
/// Reserved persisted key holding the clear watermark.
///
/// A cache entry stored under this logical key would collide with the
/// watermark; callers should treat it as off-limits.
pub const LAST_CLEARED_KEY: &str = "lastCleared";
