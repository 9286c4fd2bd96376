//! Token bucket with continuous lazy refill.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// One identity's admission budget.
///
/// Holds up to `capacity` tokens; tokens accrue continuously at
/// `capacity / refill_window` per second, clamped to `[0, capacity]`. Each
/// admitted action consumes one token. This is a refilling bucket, not a
/// fixed window: budget recovers smoothly as time passes.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a full bucket accruing `capacity` tokens per `refill_window`.
    pub fn new(capacity: u32, refill_window: Duration) -> Self {
        let capacity = f64::from(capacity.max(1));
        let window_secs = refill_window.as_secs_f64().max(f64::MIN_POSITIVE);

        Self {
            capacity,
            refill_per_sec: capacity / window_secs,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Try to consume one token. Non-blocking: returns `false` immediately
    /// when the budget is exhausted.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Tokens currently available (for monitoring; refill is applied lazily
    /// so this is a lower bound between acquisitions).
    pub fn available(&self) -> f64 {
        self.state.lock().tokens
    }
}
