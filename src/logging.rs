//! # Structured Logging Module
//!
//! One-shot tracing initialization for binaries and test harnesses that embed
//! this crate. Library code only emits `tracing` events; hosts that already
//! own a subscriber keep it.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with an env-driven filter (`RUST_LOG`).
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(EnvFilter::new(log_level)),
        );

        // try_init so FFI hosts or test harnesses that installed their own
        // global subscriber keep it.
        if subscriber.try_init().is_err() {
            tracing::debug!("global tracing subscriber already initialized, keeping existing one");
        }
    });
}
