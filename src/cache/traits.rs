//! Ordered cache store contract.
//!
//! This is the key/value-plus-ordered-index backend the cursor cache consumes
//! but does not own: per-record storage with a TTL, plus one ordered index per
//! collection mapping member identifiers to monotonically increasing scores.

use super::errors::CacheResult;
use std::time::Duration;

/// One record together with its placement in the collection's ordered index.
#[derive(Debug, Clone)]
pub struct IndexedRecord {
    /// Per-record storage key, e.g. `task:42`.
    pub record_key: String,

    /// Index member, the record identifier rendered as a string.
    pub member: String,

    /// Index score; identifiers are assignment-ordered so the score is the
    /// identifier itself.
    pub score: f64,

    /// Serialized record payload.
    pub payload: String,
}

/// Backend operations required by the cursor cache.
///
/// Implemented by concrete providers (Redis, in-memory). All operations are
/// async and return `CacheResult`; connectivity failures propagate so callers
/// can fall back.
pub trait OrderedCacheStore: Send + Sync {
    /// Rank of `member` within the ordered index, or `None` if the member
    /// (or the whole index) is absent or expired.
    fn rank_of(
        &self,
        index_key: &str,
        member: &str,
    ) -> impl std::future::Future<Output = CacheResult<Option<u64>>> + Send;

    /// Members of the ordered index in rank order, `start..=stop` inclusive.
    /// Out-of-range positions yield an empty or truncated result, never an
    /// error.
    fn range_by_rank(
        &self,
        index_key: &str,
        start: u64,
        stop: u64,
    ) -> impl std::future::Future<Output = CacheResult<Vec<String>>> + Send;

    /// Batch fetch of record payloads. The result has one entry per requested
    /// key, `None` marking a key that is absent or expired.
    fn get_many(
        &self,
        keys: &[String],
    ) -> impl std::future::Future<Output = CacheResult<Vec<Option<String>>>> + Send;

    /// Write every record with `ttl` and upsert all of them into the ordered
    /// index in one atomic batch, extending the index's TTL to match.
    fn put_many(
        &self,
        index_key: &str,
        records: &[IndexedRecord],
        ttl: Duration,
    ) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Check if the cache backend is reachable
    fn health_check(&self) -> impl std::future::Future<Output = CacheResult<bool>> + Send;

    /// Get the name of the cache provider
    fn provider_name(&self) -> &'static str;
}
