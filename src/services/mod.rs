//! Use-case services built on the caching and resilience components.

pub mod task_list;

pub use task_list::{ListTasksQuery, StoreError, TaskFilter, TaskListService, TaskStore, DEFAULT_PAGE_SIZE};
