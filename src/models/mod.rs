//! Domain records shared across the caching and service layers.

pub mod task;

pub use task::Task;
