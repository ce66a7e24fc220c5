//! Storage Module
//!
//! Pluggable persistent backends and the defensive adapter that makes
//! every backend access failure-free and key-namespaced.

mod backend;
mod safe;

// Re-export public types
pub use backend::{MemoryBackend, StorageBackend};
pub use safe::{JsonSerDeser, SafeStorage, SerDeser};

// == Public Constants ==
/// Separator placed between a configured root key and the logical key.
pub const ROOT_KEY_SEPARATOR: char = '$';
