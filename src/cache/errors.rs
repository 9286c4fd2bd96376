//! Cache error types.

use thiserror::Error;

/// Errors that can occur talking to the cache backend.
///
/// Callers treat every variant the same way: fall back to the authoritative
/// store. The cache is never retried.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to connect to the cache backend
    #[error("cache connection error: {0}")]
    ConnectionError(String),

    /// Failed to serialize or deserialize a cached record
    #[error("cache serialization error: {0}")]
    SerializationError(String),

    /// Cache operation timed out or was canceled
    #[error("cache operation timed out: {0}")]
    Timeout(String),

    /// Generic backend error
    #[error("cache backend error: {0}")]
    BackendError(String),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
