//! Cache-aside task listing.
//!
//! Only the unfiltered per-team listing is cached; it is the hot path.
//! Filtered queries (status, assignee) always go to the authoritative store.
//! On any cache failure the service falls back to the store; the cache is
//! never retried. After a fallback read of a cacheable page the result is
//! pushed into the cache best-effort, errors logged and dropped.

use crate::cache::{CursorCache, OrderedCacheStore, TaskPage};
use crate::error::TaskTrackerError;
use crate::models::Task;
use thiserror::Error;
use tracing::warn;

/// Page size used when the caller doesn't specify one.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Authoritative store failure.
#[derive(Debug, Error)]
#[error("task store error: {0}")]
pub struct StoreError(pub String);

/// Optional narrowing of a listing. An empty filter is the cacheable case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub assignee_id: Option<i64>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.assignee_id.is_none()
    }
}

/// The authoritative task store, consumed as an opaque collaborator.
pub trait TaskStore: Send + Sync {
    /// List up to `limit` tasks of `team_id` matching `filter`, with ids
    /// strictly greater than `start_from` when present, ascending by id.
    fn list_tasks(
        &self,
        team_id: i64,
        filter: &TaskFilter,
        start_from: Option<i64>,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Task>, StoreError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ListTasksQuery {
    pub team_id: i64,
    pub filter: TaskFilter,
    pub start_from: Option<i64>,
    pub limit: usize,
}

impl ListTasksQuery {
    pub fn new(team_id: i64) -> Self {
        Self {
            team_id,
            filter: TaskFilter::default(),
            start_from: None,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Task listing with a cursor cache in front of the authoritative store.
#[derive(Debug)]
pub struct TaskListService<S, T> {
    cache: CursorCache<S>,
    store: T,
}

impl<S: OrderedCacheStore, T: TaskStore> TaskListService<S, T> {
    pub fn new(cache: CursorCache<S>, store: T) -> Self {
        Self { cache, store }
    }

    pub async fn list(&self, query: &ListTasksQuery) -> Result<TaskPage, TaskTrackerError> {
        if query.limit == 0 {
            return Err(TaskTrackerError::Validation("limit must be positive".to_string()));
        }

        let cacheable = query.filter.is_empty();

        if cacheable {
            match self
                .cache
                .lookup(query.team_id, query.start_from, query.limit)
                .await
            {
                Ok(Some(page)) => return Ok(page),
                Ok(None) => {}
                // fall back to the store; never retry the cache
                Err(e) => {
                    warn!(team_id = query.team_id, error = %e, "cache lookup failed, falling back to store");
                }
            }
        }

        // one past the limit, to learn whether more data exists
        let mut tasks = self
            .store
            .list_tasks(
                query.team_id,
                &query.filter,
                query.start_from,
                query.limit + 1,
            )
            .await
            .map_err(|e| TaskTrackerError::Store(e.to_string()))?;

        if cacheable {
            // the overfetched row goes in too, so a cached replay of this
            // page can still prove whether more data exists
            if let Err(e) = self.cache.populate(query.team_id, &tasks).await {
                warn!(team_id = query.team_id, error = %e, "best-effort cache populate failed");
            }
        }

        let mut next_cursor = None;
        let mut has_more = false;
        if tasks.len() > query.limit {
            tasks.truncate(query.limit);
            has_more = true;
            next_cursor = tasks.last().map(|t| t.id);
        }

        Ok(TaskPage {
            tasks,
            next_cursor,
            has_more,
        })
    }

    /// Hook for task writes elsewhere in the system: refresh the cached copy
    /// best-effort. Failure here is logged and dropped; the TTL bounds how
    /// stale the cache can get.
    pub async fn task_updated(&self, task: &Task) {
        if let Err(e) = self.cache.update(task).await {
            warn!(task_id = task.id, error = %e, "best-effort cache update failed");
        }
    }
}
