//! Three-state circuit breaker guarding adapters against a consistently
//! failing upstream.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use fathom_types::CircuitBreakerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    half_open_calls: u32,
    opened_at: Option<Instant>,
}

/// Closed: failures increment a counter (successes decrement it, floor 0);
/// hitting `failure_threshold` opens the breaker. Open: every call is
/// rejected until `recovery_timeout_ms` elapses, after which the breaker
/// moves to half-open. Half-open: up to `half_open_requests` probes are
/// admitted; any failure reopens immediately, `success_threshold`
/// consecutive successes closes it.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                half_open_calls: 0,
                opened_at: None,
            }),
        }
    }

    /// Check whether a call is currently admitted. On `Open`, transitions
    /// to `HalfOpen` once the recovery window has elapsed.
    pub fn allow_call(&self) -> Result<(), u64> {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let opened_at = inner.opened_at.expect("open state always sets opened_at");
                let recovery = Duration::from_millis(self.config.recovery_timeout_ms);
                let elapsed = opened_at.elapsed();
                if elapsed >= recovery {
                    inner.state = CircuitState::HalfOpen;
                    inner.half_open_calls = 1;
                    inner.success_count = 0;
                    Ok(())
                } else {
                    Err((recovery - elapsed).as_millis().try_into().unwrap_or(u64::MAX))
                }
            }
            CircuitState::HalfOpen => {
                if inner.half_open_calls < self.config.half_open_requests {
                    inner.half_open_calls += 1;
                    Ok(())
                } else {
                    Err(self.config.recovery_timeout_ms)
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count = inner.failure_count.saturating_sub(1);
            }
            CircuitState::HalfOpen => {
                inner.success_count += 1;
                if inner.success_count >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    inner.success_count = 0;
                    inner.half_open_calls = 0;
                    inner.opened_at = None;
                }
            }
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.success_count = 0;
                inner.half_open_calls = 0;
            }
            CircuitState::Open => {}
        }
    }

    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.inner.lock().expect("breaker mutex poisoned").state
    }
}

/// Per-adapter-name registry, mirroring `LimiterRegistry`.
#[derive(Default)]
pub struct BreakerRegistry {
    breakers: Mutex<HashMap<String, std::sync::Arc<CircuitBreaker>>>,
}

impl BreakerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn breaker_for(
        &self,
        adapter_name: &str,
        config: CircuitBreakerConfig,
    ) -> std::sync::Arc<CircuitBreaker> {
        let mut breakers = self.breakers.lock().expect("registry mutex poisoned");
        breakers
            .entry(adapter_name.to_string())
            .or_insert_with(|| std::sync::Arc::new(CircuitBreaker::new(config)))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: 2,
            success_threshold: 1,
            recovery_timeout_ms: 10,
            half_open_requests: 1,
        }
    }

    #[test]
    fn opens_after_threshold_failures() {
        let breaker = CircuitBreaker::new(config());
        assert_eq!(breaker.state(), CircuitState::Closed);
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(breaker.allow_call().is_err());
    }

    #[test]
    fn success_decrements_failure_count_in_closed_state() {
        let breaker = CircuitBreaker::new(config());
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn half_open_probe_failure_reopens() {
        let breaker = CircuitBreaker::new(config());
        breaker.record_failure();
        breaker.record_failure();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(breaker.allow_call().is_ok());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn half_open_success_closes_breaker() {
        let breaker = CircuitBreaker::new(config());
        breaker.record_failure();
        breaker.record_failure();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(breaker.allow_call().is_ok());
        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
}
