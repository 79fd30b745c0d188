//! Configuration knobs for the adapter runtime and scheduler.
//!
//! These are plain data; validation and defaulting live on the structs
//! themselves so `fathom-core` and `fathom` can both depend on a single
//! source of truth without re-deriving per-vendor numbers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Token-bucket parameters for one adapter. Defaults mirror the
/// documented per-vendor limits (requests/sec, burst capacity).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    pub requests_per_second: f64,
    pub burst_capacity: f64,
}

impl RateLimiterConfig {
    #[must_use]
    pub const fn new(requests_per_second: f64, burst_capacity: f64) -> Self {
        Self {
            requests_per_second,
            burst_capacity,
        }
    }

    /// `builtwith`: 0.5 req/s, burst 5.
    pub const TECH_FINGERPRINT: Self = Self::new(0.5, 5.0);
    /// `similarweb`: 1.0 req/s, burst 10.
    pub const TRAFFIC: Self = Self::new(1.0, 10.0);
    /// `yahoo_finance`: 1.67 req/s, burst 10.
    pub const FINANCE: Self = Self::new(1.67, 10.0);
    /// `sec_edgar`: 0.1 req/s, burst 2 (SEC fair-access policy).
    pub const REGULATORY: Self = Self::new(0.1, 2.0);
    /// generic web search: 5.0 req/s, burst 20.
    pub const WEB_SEARCH: Self = Self::new(5.0, 20.0);
    /// people/network graph lookups: 2.0 req/s, burst 10.
    pub const PEOPLE: Self = Self::new(2.0, 10.0);
}

/// Circuit-breaker parameters for one adapter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub recovery_timeout_ms: u64,
    pub half_open_requests: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            recovery_timeout_ms: 30_000,
            half_open_requests: 3,
        }
    }
}

/// Exponential backoff with jitter for the retry middleware.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BackoffConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_fraction: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 250,
            max_delay_ms: 8_000,
            jitter_fraction: 0.2,
        }
    }
}

impl BackoffConfig {
    /// Delay before attempt `attempt` (0-indexed, 0 = first retry), before
    /// jitter is applied: `min(base * 2^attempt, max)`.
    #[must_use]
    pub fn base_delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self.base_delay_ms.saturating_mul(1u64 << attempt.min(20));
        Duration::from_millis(exp.min(self.max_delay_ms))
    }
}

/// Moka cache sizing/expiry for the caching middleware.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CacheConfig {
    pub max_entries: u64,
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl_seconds: 3600,
        }
    }
}

/// Top-level engine configuration assembled by `EngineBuilder` and threaded
/// through to every adapter and the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_wave_concurrency: usize,
    pub max_batch_concurrency: usize,
    pub module_timeout_ms: u64,
    pub job_timeout_ms: u64,
    pub cache: CacheConfig,
    pub backoff: BackoffConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_wave_concurrency: 15,
            max_batch_concurrency: 8,
            module_timeout_ms: 120_000,
            job_timeout_ms: 600_000,
            cache: CacheConfig::default(),
            backoff: BackoffConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}
