//! Crate-wide error taxonomy.
//!
//! A cache miss is deliberately not represented here: lookups return
//! `Ok(None)` and the caller consults the authoritative store. Only genuine
//! failures become errors.

use crate::cache::CacheError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskTrackerError {
    /// The caller's identity has exhausted its token budget. Maps to a
    /// throttling response at the boundary; never retried internally.
    #[error("rate limit exceeded for {identity}")]
    RateLimitExceeded { identity: String },

    /// A protected dependency is failing and its breaker is rejecting calls.
    /// Distinguishable from an actual downstream failure so callers can
    /// choose not to retry immediately.
    #[error("circuit breaker is open for {component}")]
    BreakerOpen { component: String },

    /// I/O failure talking to the cache store. Callers fall back to the
    /// authoritative store rather than retrying the cache.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The wrapped downstream call's own failure, passed through while also
    /// counting toward the breaker's failure budget.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// Authoritative store failure.
    #[error("store error: {0}")]
    Store(String),

    #[error("validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, TaskTrackerError>;
