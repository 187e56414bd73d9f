//! Cache error types.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur when using the variant cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backing store rejected or failed the operation.
    #[error("storage error: {0}")]
    Storage(String),

    /// A stored entry could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}
