//! # Resilience Module
//!
//! Circuit breaker protection for calls to unreliable downstream
//! dependencies: short-circuit once consecutive failures cross a threshold,
//! then probe for recovery after a cooldown.
//!
//! ## Usage
//!
//! ```rust
//! use task_tracker_core::resilience::{CircuitBreaker, CircuitBreakerConfig};
//! use task_tracker_core::metrics::NoOpMetrics;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let config = CircuitBreakerConfig {
//!     failure_threshold: 5,
//!     reset_timeout: Duration::from_secs(10),
//! };
//!
//! let breaker = CircuitBreaker::new("notifier", config, Arc::new(NoOpMetrics));
//!
//! let result = breaker
//!     .call(|| async { Ok::<_, String>("delivered") })
//!     .await;
//! # let _ = result;
//! # }
//! ```

pub mod circuit_breaker;
pub mod config;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerError, CircuitState};
pub use config::CircuitBreakerConfig;
