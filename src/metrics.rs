//! Injected metrics sink.
//!
//! Components take an `Arc<dyn MetricsSink>` at construction instead of
//! touching ambient global state, so tests can substitute a recording
//! implementation and deployments can bridge to their exporter of choice.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters the resilience components emit. Every method has a no-op default
/// so sinks only implement what they care about.
pub trait MetricsSink: Send + Sync + std::fmt::Debug {
    /// A cursor cache lookup served a fully reconstructed page.
    fn record_cache_hit(&self) {}

    /// A cursor cache lookup fell through to the authoritative store.
    fn record_cache_miss(&self) {}

    /// An admission decision came back negative.
    fn record_throttled(&self) {}

    /// A circuit breaker changed state; `state` is one of
    /// "closed", "open", "half_open".
    fn record_breaker_transition(&self, component: &str, state: &'static str) {
        let _ = (component, state);
    }
}

/// Sink that discards everything. The default for production wiring until an
/// exporter bridge is injected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsSink for NoOpMetrics {}

/// Sink backed by atomic counters, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    throttled: AtomicU64,
    breaker_transitions: AtomicU64,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn throttled(&self) -> u64 {
        self.throttled.load(Ordering::Relaxed)
    }

    pub fn breaker_transitions(&self) -> u64 {
        self.breaker_transitions.load(Ordering::Relaxed)
    }
}

impl MetricsSink for RecordingMetrics {
    fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_throttled(&self) {
        self.throttled.fetch_add(1, Ordering::Relaxed);
    }

    fn record_breaker_transition(&self, _component: &str, _state: &'static str) {
        self.breaker_transitions.fetch_add(1, Ordering::Relaxed);
    }
}
