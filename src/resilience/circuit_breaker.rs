//! # Circuit Breaker Implementation
//!
//! Fault isolation for calls to an unreliable downstream dependency, following
//! the classic three-state pattern: Closed (normal operation), Open (failing
//! fast), and Half-Open (testing recovery).
//!
//! State lives behind a single short-lived mutex; the protected call itself
//! always executes outside that critical section so a slow upstream never
//! blocks state queries from other callers. A consequence is that more than
//! one probe may be admitted while transitioning out of Open under concurrent
//! traffic; that weak guarantee is intentional.

use crate::metrics::MetricsSink;
use crate::resilience::CircuitBreakerConfig;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Circuit breaker states representing the current operational mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircuitState {
    /// Normal operation - calls pass through, consecutive failures tracked
    Closed,
    /// Failure mode - calls fail fast without executing
    Open,
    /// Testing recovery - a probe call is allowed through
    HalfOpen,
}

impl CircuitState {
    fn as_str(self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

/// Errors that can occur during circuit breaker operation
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open, rejecting all calls
    #[error("circuit breaker is open for {component}")]
    CircuitOpen { component: String },

    /// Operation failed and was recorded
    #[error("operation failed: {0}")]
    OperationFailed(E),
}

#[derive(Debug)]
struct BreakerCore {
    state: CircuitState,
    consecutive_failures: u32,
    last_failure: Option<Instant>,
}

/// Circuit breaker guarding one protected dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Component name for logging and metrics
    name: String,

    /// Configuration parameters
    config: CircuitBreakerConfig,

    /// State and failure bookkeeping. Held only for state reads and
    /// transitions, never across the protected call.
    core: Mutex<BreakerCore>,

    metrics: Arc<dyn MetricsSink>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given name and configuration
    pub fn new(
        name: impl Into<String>,
        config: CircuitBreakerConfig,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        let name = name.into();
        info!(
            component = %name,
            failure_threshold = config.failure_threshold,
            reset_timeout_ms = config.reset_timeout.as_millis() as u64,
            "Circuit breaker initialized"
        );

        Self {
            name,
            config,
            core: Mutex::new(BreakerCore {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                last_failure: None,
            }),
            metrics,
        }
    }

    /// Get current circuit state
    pub fn state(&self) -> CircuitState {
        self.core.lock().state
    }

    /// Current consecutive-failure count (for monitoring)
    pub fn consecutive_failures(&self) -> u32 {
        self.core.lock().consecutive_failures
    }

    /// Get component name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute an operation with circuit breaker protection.
    ///
    /// The operation runs outside the breaker's critical section. A timed-out
    /// or canceled operation surfaces as `Err` from its future and counts
    /// toward the failure budget like any other failure.
    pub async fn call<F, T, E, Fut>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.should_allow() {
            return Err(CircuitBreakerError::CircuitOpen {
                component: self.name.clone(),
            });
        }

        let result = operation().await;

        match &result {
            Ok(_) => self.record_success(),
            Err(_) => self.record_failure(),
        }

        result.map_err(CircuitBreakerError::OperationFailed)
    }

    /// Check whether a call should be admitted right now.
    ///
    /// While Open, the first check after `reset_timeout` has elapsed since the
    /// last failure flips the circuit to HalfOpen and admits the probe.
    /// Concurrent callers that each observed the elapsed timeout may each be
    /// admitted; "exactly one probe" is not guaranteed under races.
    ///
    /// Use together with [`record_success`](Self::record_success) /
    /// [`record_failure`](Self::record_failure) when wrapping a call site
    /// manually instead of through [`call`](Self::call).
    pub fn should_allow(&self) -> bool {
        let mut core = self.core.lock();
        match core.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let Some(last_failure) = core.last_failure else {
                    // open without a timestamp shouldn't happen; admit the call
                    warn!(component = %self.name, "Circuit open but no failure timestamp recorded");
                    return true;
                };

                if last_failure.elapsed() > self.config.reset_timeout {
                    core.state = CircuitState::HalfOpen;
                    drop(core);
                    self.log_transition(CircuitState::HalfOpen);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful call outcome.
    pub fn record_success(&self) {
        let mut core = self.core.lock();
        match core.state {
            CircuitState::HalfOpen => {
                core.state = CircuitState::Closed;
                core.consecutive_failures = 0;
                drop(core);
                self.log_transition(CircuitState::Closed);
            }
            CircuitState::Closed => {
                core.consecutive_failures = 0;
            }
            CircuitState::Open => {
                // a call admitted just before the circuit opened
                warn!(component = %self.name, "Success recorded while circuit is open");
            }
        }
    }

    /// Record a failed call outcome. The reset timer restarts from this
    /// failure.
    pub fn record_failure(&self) {
        let mut core = self.core.lock();
        core.consecutive_failures += 1;
        core.last_failure = Some(Instant::now());

        let opened = (core.state == CircuitState::HalfOpen
            || core.consecutive_failures >= self.config.failure_threshold)
            && core.state != CircuitState::Open;

        if opened {
            core.state = CircuitState::Open;
        }

        let failures = core.consecutive_failures;
        drop(core);

        if opened {
            error!(
                component = %self.name,
                consecutive_failures = failures,
                failure_threshold = self.config.failure_threshold,
                reset_timeout_ms = self.config.reset_timeout.as_millis() as u64,
                "Circuit breaker opened (failing fast)"
            );
            self.metrics
                .record_breaker_transition(&self.name, CircuitState::Open.as_str());
        } else {
            debug!(
                component = %self.name,
                consecutive_failures = failures,
                "Operation failed"
            );
        }
    }

    fn log_transition(&self, state: CircuitState) {
        match state {
            CircuitState::Closed => {
                info!(component = %self.name, "Circuit breaker closed (recovered)")
            }
            CircuitState::HalfOpen => {
                info!(component = %self.name, "Circuit breaker half-open (probing recovery)")
            }
            CircuitState::Open => {}
        }
        self.metrics
            .record_breaker_transition(&self.name, state.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::NoOpMetrics;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    fn breaker(failure_threshold: u32, reset_timeout: Duration) -> CircuitBreaker {
        CircuitBreaker::new(
            "test",
            CircuitBreakerConfig {
                failure_threshold,
                reset_timeout,
            },
            Arc::new(NoOpMetrics),
        )
    }

    #[tokio::test]
    async fn test_circuit_breaker_normal_operation() {
        let circuit = breaker(3, Duration::from_millis(100));

        assert_eq!(circuit.state(), CircuitState::Closed);

        let result = circuit.call(|| async { Ok::<_, String>("success") }).await;
        assert!(result.is_ok());
        assert_eq!(circuit.consecutive_failures(), 0);
    }

    #[tokio::test]
    async fn test_circuit_breaker_opens_on_failures() {
        let circuit = breaker(2, Duration::from_millis(100));

        // First failure
        let _ = circuit.call(|| async { Err::<String, _>("error") }).await;
        assert_eq!(circuit.state(), CircuitState::Closed);

        // Second failure should open circuit
        let _ = circuit.call(|| async { Err::<String, _>("error") }).await;
        assert_eq!(circuit.state(), CircuitState::Open);

        // Next call should fail fast without executing the operation
        let attempts = AtomicU32::new(0);
        let result = circuit
            .call(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>("should not execute")
            })
            .await;
        assert!(matches!(
            result,
            Err(CircuitBreakerError::CircuitOpen { .. })
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_resets_counter_while_closed() {
        let circuit = breaker(3, Duration::from_millis(100));

        let _ = circuit.call(|| async { Err::<String, _>("error") }).await;
        let _ = circuit.call(|| async { Err::<String, _>("error") }).await;
        assert_eq!(circuit.consecutive_failures(), 2);

        let _ = circuit.call(|| async { Ok::<_, String>("ok") }).await;
        assert_eq!(circuit.consecutive_failures(), 0);

        // the budget starts over
        let _ = circuit.call(|| async { Err::<String, _>("error") }).await;
        let _ = circuit.call(|| async { Err::<String, _>("error") }).await;
        assert_eq!(circuit.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_circuit_breaker_recovery() {
        let circuit = breaker(1, Duration::from_millis(50));

        // Cause circuit to open
        let _ = circuit.call(|| async { Err::<String, _>("error") }).await;
        assert_eq!(circuit.state(), CircuitState::Open);

        // Wait out the reset timeout
        sleep(Duration::from_millis(60)).await;

        // Next call is admitted as a probe; success closes the circuit
        let result = circuit.call(|| async { Ok::<_, String>("success") }).await;
        assert!(result.is_ok());
        assert_eq!(circuit.state(), CircuitState::Closed);
        assert_eq!(circuit.consecutive_failures(), 0);
    }

    #[tokio::test]
    async fn test_failed_probe_reopens_and_restarts_timer() {
        let circuit = breaker(1, Duration::from_millis(50));

        let _ = circuit.call(|| async { Err::<String, _>("error") }).await;
        assert_eq!(circuit.state(), CircuitState::Open);

        sleep(Duration::from_millis(60)).await;

        // Probe fails: back to Open, timer restarted from this failure
        let _ = circuit.call(|| async { Err::<String, _>("error") }).await;
        assert_eq!(circuit.state(), CircuitState::Open);

        // Well within the restarted timeout: still rejecting
        let result = circuit.call(|| async { Ok::<_, String>("ok") }).await;
        assert!(matches!(
            result,
            Err(CircuitBreakerError::CircuitOpen { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejects_for_duration_of_reset_timeout() {
        let circuit = breaker(1, Duration::from_millis(80));

        let _ = circuit.call(|| async { Err::<String, _>("error") }).await;

        sleep(Duration::from_millis(20)).await;
        assert!(!circuit.should_allow());

        sleep(Duration::from_millis(80)).await;
        assert!(circuit.should_allow());
        assert_eq!(circuit.state(), CircuitState::HalfOpen);
    }
}
