//! # Notification Delivery Module
//!
//! Outbound notification delivery behind circuit breaker protection. The
//! downstream (a webhook endpoint) is unreliable; once consecutive failures
//! cross the threshold the breaker rejects delivery attempts fast, then
//! probes for recovery after the reset timeout.
//!
//! Application-level rejections (non-success status codes) count toward the
//! failure budget exactly like transport errors: a dependency answering 500s
//! is just as down as one refusing connections.

use crate::metrics::MetricsSink;
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// One message to deliver.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub to: String,
    pub text: String,
}

/// Delivery result as reported by the downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub status: u16,
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

/// Errors from attempting a delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The call never completed (connect failure, timeout, cancellation)
    #[error("notification transport error: {0}")]
    Transport(String),

    /// The breaker is rejecting calls; no delivery was attempted
    #[error("notifier circuit breaker is open")]
    BreakerOpen,
}

/// Anything that can attempt delivery of a notification.
///
/// The protected wrapper is itself a `Notifier`, so it drops in anywhere a
/// plain one is expected.
pub trait Notifier: Send + Sync {
    fn deliver(
        &self,
        notification: &Notification,
    ) -> impl std::future::Future<Output = Result<DeliveryOutcome, NotifyError>> + Send;
}

/// Stub delivery client posting JSON to a webhook endpoint.
#[derive(Debug, Clone)]
pub struct WebhookSender {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookSender {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Notifier for WebhookSender {
    async fn deliver(&self, notification: &Notification) -> Result<DeliveryOutcome, NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(notification)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(DeliveryOutcome {
            status: response.status().as_u16(),
        })
    }
}

/// Circuit-breaker-protected notifier.
///
/// Wraps any [`Notifier`] and isolates callers from a failing downstream:
/// when the circuit is open, [`deliver`](Notifier::deliver) returns
/// [`NotifyError::BreakerOpen`] without attempting the call, which callers
/// can tell apart from the downstream's own failures.
#[derive(Debug)]
pub struct ProtectedNotifier<N> {
    inner: N,
    breaker: CircuitBreaker,
}

impl<N: Notifier> ProtectedNotifier<N> {
    pub fn new(inner: N, config: CircuitBreakerConfig, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            inner,
            breaker: CircuitBreaker::new("notifier", config, metrics),
        }
    }

    /// Current breaker state (for monitoring).
    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }
}

impl<N: Notifier> Notifier for ProtectedNotifier<N> {
    async fn deliver(&self, notification: &Notification) -> Result<DeliveryOutcome, NotifyError> {
        if !self.breaker.should_allow() {
            debug!(to = %notification.to, "notifier circuit open, rejecting delivery");
            return Err(NotifyError::BreakerOpen);
        }

        // the delivery attempt runs outside the breaker's critical section
        let result = self.inner.deliver(notification).await;

        match &result {
            Ok(outcome) if outcome.is_success() => self.breaker.record_success(),
            // rejected-by-status and transport errors spend the same budget
            _ => self.breaker.record_failure(),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::NoOpMetrics;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    /// Notifier whose outcomes are scripted by the test.
    #[derive(Debug, Default)]
    struct ScriptedNotifier {
        script: Mutex<Vec<Result<u16, String>>>,
        attempts: AtomicU32,
    }

    impl ScriptedNotifier {
        fn with_script(script: Vec<Result<u16, String>>) -> Self {
            Self {
                script: Mutex::new(script),
                attempts: AtomicU32::new(0),
            }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    impl Notifier for ScriptedNotifier {
        async fn deliver(&self, _n: &Notification) -> Result<DeliveryOutcome, NotifyError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock();
            match script.remove(0) {
                Ok(status) => Ok(DeliveryOutcome { status }),
                Err(e) => Err(NotifyError::Transport(e)),
            }
        }
    }

    fn note() -> Notification {
        Notification {
            to: "dev@example.com".to_string(),
            text: "task assigned".to_string(),
        }
    }

    fn config(threshold: u32, reset_ms: u64) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: threshold,
            reset_timeout: Duration::from_millis(reset_ms),
        }
    }

    #[tokio::test]
    async fn test_successful_delivery_passes_through() {
        let inner = ScriptedNotifier::with_script(vec![Ok(200)]);
        let notifier = ProtectedNotifier::new(inner, config(3, 100), Arc::new(NoOpMetrics));

        let outcome = notifier.deliver(&note()).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(notifier.circuit_state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_transport_failures_trip_the_breaker() {
        let inner = ScriptedNotifier::with_script(vec![
            Err("connection refused".to_string()),
            Err("connection refused".to_string()),
        ]);
        let notifier = ProtectedNotifier::new(inner, config(2, 100), Arc::new(NoOpMetrics));

        let _ = notifier.deliver(&note()).await;
        let _ = notifier.deliver(&note()).await;
        assert_eq!(notifier.circuit_state(), CircuitState::Open);

        // fast-fail without touching the downstream
        let result = notifier.deliver(&note()).await;
        assert!(matches!(result, Err(NotifyError::BreakerOpen)));
        assert_eq!(notifier.inner.attempts(), 2);
    }

    #[tokio::test]
    async fn test_failure_statuses_count_toward_the_budget() {
        let inner = ScriptedNotifier::with_script(vec![Ok(500), Ok(503)]);
        let notifier = ProtectedNotifier::new(inner, config(2, 100), Arc::new(NoOpMetrics));

        let first = notifier.deliver(&note()).await.unwrap();
        assert!(!first.is_success());
        let _ = notifier.deliver(&note()).await;

        assert_eq!(notifier.circuit_state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_probe_success_closes_the_circuit() {
        let inner = ScriptedNotifier::with_script(vec![Err("down".to_string()), Ok(200)]);
        let notifier = ProtectedNotifier::new(inner, config(1, 30), Arc::new(NoOpMetrics));

        let _ = notifier.deliver(&note()).await;
        assert_eq!(notifier.circuit_state(), CircuitState::Open);

        sleep(Duration::from_millis(40)).await;

        let outcome = notifier.deliver(&note()).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(notifier.circuit_state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_failed_probe_reopens() {
        let inner =
            ScriptedNotifier::with_script(vec![Err("down".to_string()), Ok(502)]);
        let notifier = ProtectedNotifier::new(inner, config(1, 30), Arc::new(NoOpMetrics));

        let _ = notifier.deliver(&note()).await;
        sleep(Duration::from_millis(40)).await;

        // probe comes back 502: open again
        let _ = notifier.deliver(&note()).await;
        assert_eq!(notifier.circuit_state(), CircuitState::Open);
        assert!(matches!(
            notifier.deliver(&note()).await,
            Err(NotifyError::BreakerOpen)
        ));
    }
}
