#![allow(clippy::doc_markdown)] // Allow technical terms like Redis, TTL in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Task Tracker Core
//!
//! Resilience and caching core for a team task tracker: the read path stays
//! fast and the service stays up when its dependencies misbehave.
//!
//! ## Overview
//!
//! Three independent components, each usable on its own:
//!
//! - a **cursor cache** in front of the authoritative task store,
//!   accelerating cursor-paginated per-team listings with TTL-bounded
//!   staleness and strict fall-through on any ambiguity
//! - a **token bucket registry** enforcing a per-identity request budget in
//!   front of the use-case layer
//! - a **circuit breaker** isolating callers from an unreliable notification
//!   downstream, failing fast while it is down and probing for recovery
//!
//! All three degrade rather than fail: a broken cache backend turns every
//! lookup into a store read, an open breaker turns deliveries into immediate
//! typed errors, and the limiter never blocks or errors.
//!
//! ## Module Organization
//!
//! - [`cache`] - Cursor-paginated cache-aside layer and its backends
//! - [`rate_limit`] - Per-identity token bucket admission control
//! - [`resilience`] - Circuit breaker state machine
//! - [`notify`] - Notification delivery behind breaker protection
//! - [`services`] - Cache-aside task listing use case
//! - [`models`] - Task record shared across the components
//! - [`config`] - Configuration types with validation
//! - [`metrics`] - Injected counters for hits, misses, throttles, transitions
//! - [`error`] - Crate-level error taxonomy
//! - [`logging`] - Structured logging initialization
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use task_tracker_core::metrics::NoOpMetrics;
//! use task_tracker_core::rate_limit::{request_identity, RateLimiterRegistry};
//! use task_tracker_core::config::RateLimitConfig;
//!
//! let limiter = RateLimiterRegistry::new(RateLimitConfig::default(), Arc::new(NoOpMetrics));
//! let identity = request_identity(Some(42), "10.0.0.1:443", None);
//! assert!(limiter.allow(&identity));
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod notify;
pub mod rate_limit;
pub mod resilience;
pub mod services;

pub use cache::{CacheError, CacheResult, CursorCache, InMemoryCacheStore, OrderedCacheStore, TaskPage};
#[cfg(feature = "cache-redis")]
pub use cache::RedisCacheStore;
pub use config::{CacheConfig, RateLimitConfig, RedisConfig};
pub use error::{Result, TaskTrackerError};
pub use metrics::{MetricsSink, NoOpMetrics};
pub use models::Task;
pub use notify::{Notification, Notifier, ProtectedNotifier, WebhookSender};
pub use rate_limit::{request_identity, RateLimiterRegistry, TokenBucket};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};
pub use services::{ListTasksQuery, TaskFilter, TaskListService, TaskStore};
