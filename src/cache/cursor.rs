//! Cursor-paginated cache-aside layer over a team's task list.
//!
//! The contract is all-or-nothing: a lookup either reconstructs a full,
//! contiguous page from the backend or reports a miss so the caller consults
//! the authoritative store. A cursor that is no longer in the index, or a
//! record evicted out from under the index (TTL skew), both force a whole-page
//! miss; a partially reconstructed page is never returned.
//!
//! Writes are best-effort by convention. The TTL on every record and index is
//! the bound on staleness; there is no explicit invalidation path.

use super::errors::{CacheError, CacheResult};
use super::traits::{IndexedRecord, OrderedCacheStore};
use crate::metrics::MetricsSink;
use crate::models::Task;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Storage key for one task record.
pub fn task_key(id: i64) -> String {
    member_task_key(&id.to_string())
}

/// Storage key for a task identified by its index member string.
pub fn member_task_key(member: &str) -> String {
    format!("task:{}", member)
}

/// Ordered-index key for one team's task collection.
pub fn team_tasks_key(team_id: i64) -> String {
    format!("team_tasks:{}", team_id)
}

/// One fully reconstructed page of tasks, strictly increasing by id.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPage {
    pub tasks: Vec<Task>,

    /// Identifier of the last returned task, present when more data was
    /// retrievable beyond this page. Feed it back as the next lookup's cursor.
    pub next_cursor: Option<i64>,

    pub has_more: bool,
}

/// Cache-aside layer for cursor-paginated task listings.
#[derive(Debug)]
pub struct CursorCache<S> {
    store: S,
    ttl: Duration,
    metrics: Arc<dyn MetricsSink>,
}

impl<S: OrderedCacheStore> CursorCache<S> {
    pub fn new(store: S, ttl: Duration, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            store,
            ttl,
            metrics,
        }
    }

    /// Write `tasks` into the cache: every record with TTL plus a batch upsert
    /// of the team's ordered index, in one atomic backend operation.
    ///
    /// No-op on an empty slice. Backend failures propagate; callers treat this
    /// operation as best-effort and must not roll anything back on error.
    pub async fn populate(&self, team_id: i64, tasks: &[Task]) -> CacheResult<()> {
        if tasks.is_empty() {
            return Ok(());
        }

        let records = tasks
            .iter()
            .map(|task| {
                let payload = serde_json::to_string(task)
                    .map_err(|e| CacheError::SerializationError(e.to_string()))?;
                Ok(IndexedRecord {
                    record_key: task_key(task.id),
                    member: task.id.to_string(),
                    score: task.id as f64,
                    payload,
                })
            })
            .collect::<CacheResult<Vec<_>>>()?;

        self.store
            .put_many(&team_tasks_key(team_id), &records, self.ttl)
            .await?;

        debug!(team_id = team_id, tasks = tasks.len(), "cache populated");
        Ok(())
    }

    /// Serve the next `limit` tasks after `cursor` (exclusive), or `None` on
    /// miss.
    ///
    /// Misses cover every case where a full page cannot be guaranteed: cursor
    /// not in the index, empty range, any requested record absent, or an
    /// undecodable payload. One extra id beyond `limit` is fetched so a hit
    /// can carry a continuation cursor; trimming happens after the fetch.
    pub async fn lookup(
        &self,
        team_id: i64,
        cursor: Option<i64>,
        limit: usize,
    ) -> CacheResult<Option<TaskPage>> {
        if limit == 0 {
            return Err(CacheError::BackendError("invalid limit".to_string()));
        }

        let index_key = team_tasks_key(team_id);

        let start = match cursor {
            None => 0,
            Some(cursor_id) => {
                match self
                    .store
                    .rank_of(&index_key, &cursor_id.to_string())
                    .await?
                {
                    Some(rank) => rank + 1,
                    // An evicted or invalid cursor must never be read as
                    // "no more data".
                    None => {
                        debug!(team_id = team_id, cursor = cursor_id, "cursor not in index");
                        return self.miss(team_id);
                    }
                }
            }
        };

        // one past the limit, so a full page can prove whether more exists
        let stop = start + limit as u64;
        let members = self.store.range_by_rank(&index_key, start, stop).await?;
        if members.is_empty() {
            return self.miss(team_id);
        }

        let keys: Vec<String> = members.iter().map(|m| member_task_key(m)).collect();
        let payloads = self.store.get_many(&keys).await?;

        let mut tasks = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let Some(payload) = payload else {
                // a member outlived its record; the page has a hole
                debug!(team_id = team_id, "record evicted under index, whole-page miss");
                return self.miss(team_id);
            };

            match serde_json::from_str::<Task>(&payload) {
                Ok(task) => tasks.push(task),
                Err(_) => {
                    debug!(team_id = team_id, "undecodable cached record, whole-page miss");
                    return self.miss(team_id);
                }
            }
        }

        let mut next_cursor = None;
        let mut has_more = false;
        if tasks.len() > limit {
            tasks.truncate(limit);
            has_more = true;
            next_cursor = tasks.last().map(|t| t.id);
        }

        self.metrics.record_cache_hit();
        debug!(team_id = team_id, tasks = tasks.len(), "cache hit");
        Ok(Some(TaskPage {
            tasks,
            next_cursor,
            has_more,
        }))
    }

    /// Best-effort single-task refresh of the record and its index position.
    ///
    /// Callers must not block on the outcome or treat failure as fatal; the
    /// TTL is the consistency backstop.
    pub async fn update(&self, task: &Task) -> CacheResult<()> {
        let payload = serde_json::to_string(task)
            .map_err(|e| CacheError::SerializationError(e.to_string()))?;

        let record = IndexedRecord {
            record_key: task_key(task.id),
            member: task.id.to_string(),
            score: task.id as f64,
            payload,
        };

        self.store
            .put_many(&team_tasks_key(task.team_id), &[record], self.ttl)
            .await
    }

    fn miss(&self, team_id: i64) -> CacheResult<Option<TaskPage>> {
        self.metrics.record_cache_miss();
        debug!(team_id = team_id, "cache miss");
        Ok(None)
    }
}
