//! # Cursor Cache Module
//!
//! Cache-aside layer in front of the task list, cursor-paginated.
//!
//! ## Architecture
//!
//! ```text
//! CursorCache<S>                       <- populate / lookup / update semantics
//!   └── S: OrderedCacheStore           <- key/value + ordered index backend
//!         ├── RedisCacheStore          <- sorted sets + SETEX, pipelined writes
//!         └── InMemoryCacheStore       <- same expiry semantics, in process
//! ```
//!
//! ## Design decisions
//!
//! - **Whole-page miss**: any hole in a requested page (evicted record,
//!   unknown cursor) reports a miss instead of a partial page. The caller's
//!   policy is always "fall back to the authoritative store", never "retry
//!   the cache".
//! - **Best-effort writes**: `populate` after a store read and `update` after
//!   a write are fire-and-forget at call sites; the TTL bounds staleness.

pub mod cursor;
pub mod errors;
pub mod providers;
pub mod traits;

pub use cursor::{member_task_key, task_key, team_tasks_key, CursorCache, TaskPage};
pub use errors::{CacheError, CacheResult};
pub use providers::InMemoryCacheStore;
pub use traits::{IndexedRecord, OrderedCacheStore};

#[cfg(feature = "cache-redis")]
pub use providers::RedisCacheStore;
