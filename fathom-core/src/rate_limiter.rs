//! Token-bucket and sliding-window rate limiters for the adapter runtime.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use fathom_types::RateLimiterConfig;

/// Classic token bucket: `capacity` tokens, refilled continuously at
/// `requests_per_second`. `try_acquire` is non-blocking; `wait_ms` reports
/// how long the caller would need to wait for one token to become
/// available.
pub struct TokenBucket {
    capacity: f64,
    refill_rate: f64,
    state: Mutex<BucketState>,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    #[must_use]
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            capacity: config.burst_capacity,
            refill_rate: config.requests_per_second,
            state: Mutex::new(BucketState {
                tokens: config.burst_capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    fn refill(&self, state: &mut BucketState, now: Instant) {
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_rate).min(self.capacity);
        state.last_refill = now;
    }

    /// Attempt to take one token. Returns `Ok(())` on success, or
    /// `Err(wait_ms)` with the time until a token would be available.
    pub fn try_acquire(&self) -> Result<(), u64> {
        let mut state = self.state.lock().expect("token bucket mutex poisoned");
        self.refill(&mut state, Instant::now());
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            Ok(())
        } else {
            let deficit = 1.0 - state.tokens;
            let wait_secs = deficit / self.refill_rate;
            Err((wait_secs * 1000.0).ceil() as u64)
        }
    }

    /// Block (via `tokio::time::sleep`) until a token is available, then
    /// take it.
    pub async fn acquire(&self) {
        loop {
            match self.try_acquire() {
                Ok(()) => return,
                Err(wait_ms) => tokio::time::sleep(Duration::from_millis(wait_ms)).await,
            }
        }
    }
}

/// Strict per-window limiter (e.g. "20 requests per minute") backed by a
/// deque of call timestamps, for vendors whose documented limit is not
/// well modeled by continuous refill.
pub struct SlidingWindowLimiter {
    max_calls: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    #[must_use]
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    pub fn try_acquire(&self) -> Result<(), u64> {
        let now = Instant::now();
        let mut calls = self.calls.lock().expect("sliding window mutex poisoned");
        while let Some(&front) = calls.front() {
            if now.duration_since(front) >= self.window {
                calls.pop_front();
            } else {
                break;
            }
        }
        if calls.len() < self.max_calls {
            calls.push_back(now);
            Ok(())
        } else {
            let oldest = *calls.front().expect("len checked above");
            let wait = self.window.saturating_sub(now.duration_since(oldest));
            Err(wait.as_millis().try_into().unwrap_or(u64::MAX))
        }
    }
}

/// Per-adapter-name registry so the middleware layer does not need to wire
/// a bucket through every call site by hand.
#[derive(Default)]
pub struct LimiterRegistry {
    buckets: Mutex<HashMap<String, std::sync::Arc<TokenBucket>>>,
}

impl LimiterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket_for(
        &self,
        adapter_name: &str,
        config: RateLimiterConfig,
    ) -> std::sync::Arc<TokenBucket> {
        let mut buckets = self.buckets.lock().expect("registry mutex poisoned");
        buckets
            .entry(adapter_name.to_string())
            .or_insert_with(|| std::sync::Arc::new(TokenBucket::new(config)))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_starts_full_and_drains() {
        let bucket = TokenBucket::new(RateLimiterConfig::new(1.0, 3.0));
        assert!(bucket.try_acquire().is_ok());
        assert!(bucket.try_acquire().is_ok());
        assert!(bucket.try_acquire().is_ok());
        assert!(bucket.try_acquire().is_err());
    }

    #[test]
    fn bucket_reports_wait_hint() {
        let bucket = TokenBucket::new(RateLimiterConfig::new(2.0, 1.0));
        assert!(bucket.try_acquire().is_ok());
        let wait = bucket.try_acquire().unwrap_err();
        assert!(wait > 0 && wait <= 500);
    }

    #[test]
    fn sliding_window_rejects_burst_beyond_limit() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(60));
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_err());
    }
}
