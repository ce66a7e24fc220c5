//! Error types for the storage layer
//!
//! Provides unified error handling using thiserror. These errors flow from
//! backend and codec implementations into `SafeStorage`, which absorbs
//! every one of them; nothing here ever crosses the public cache API.

use thiserror::Error;

// == Storage Error Enum ==
/// Unified error type for backend and serialization failures.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend cannot be reached at all
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the operation
    #[error("Storage access denied: {0}")]
    AccessDenied(String),

    /// Backend has no room left for the write
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Value could not be converted to its raw string form
    #[error("Cannot serialize cached item: {0}")]
    Serialize(String),

    /// Raw data could not be converted back into a value
    #[error("Cannot deserialize cached item: {0}")]
    Deserialize(String),
}

// == Result Type Alias ==
/// Convenience Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
