//! The `Adapter` trait: the single seam every external data source plugs
//! into. Resilience (caching, rate limiting, circuit breaking, retry) is
//! layered on top in `fathom-middleware`, never inside an adapter itself.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use fathom_types::{FathomError, SourceCitation};
use serde_json::Value;

/// A successful adapter call result: the raw JSON payload plus the
/// citation describing where it came from. Cloned when a cache layer
/// stores a copy alongside the one returned to the caller.
#[derive(Debug, Clone)]
pub struct SourcedResponse {
    pub data: Value,
    pub citation: SourceCitation,
}

/// Running counters for one adapter instance. All fields are monotonic
/// counters updated via `Ordering::Relaxed`; no counter is ever read back
/// to make a control-flow decision; they exist for observability only.
#[derive(Debug, Default)]
pub struct AdapterMetrics {
    pub total_calls: AtomicU64,
    pub successful_calls: AtomicU64,
    pub failed_calls: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    pub retries: AtomicU64,
    pub total_latency_ms: AtomicU64,
}

impl AdapterMetrics {
    pub fn record_call(&self, success: bool, latency_ms: u64) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_calls.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_calls.fetch_add(1, Ordering::Relaxed);
        }
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let total = self.total_calls.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.successful_calls.load(Ordering::Relaxed) as f64 / total as f64
    }

    #[must_use]
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_calls.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.total_latency_ms.load(Ordering::Relaxed) as f64 / total as f64
    }
}

/// Health classification a caller can poll before dispatching a wave,
/// surfaced via `Adapter::health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterHealth {
    Healthy,
    Degraded,
    Unavailable,
}

/// The call surface every external data source implements. Parameters are
/// a sorted map so cache-key derivation in the middleware layer is
/// deterministic regardless of call-site ordering.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Stable identifier used for rate-limiter/circuit-breaker/cache
    /// registry keys and in `ModuleResult` diagnostics.
    fn name(&self) -> &str;

    /// Make one call, non-blocking: if the adapter (or a wrapping
    /// middleware) cannot serve the request right now it returns an error
    /// rather than waiting. `bypass_cache` tells a wrapping `CachingAdapter`
    /// to skip the lookup and go straight to the inner adapter, refreshing
    /// whatever it finds there into the cache.
    async fn call(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        bypass_cache: bool,
    ) -> Result<SourcedResponse, FathomError>;

    /// Like `call`, but blocks (e.g. on a rate limiter) rather than
    /// failing fast. The default forwards to `call`; middleware that adds
    /// blocking behavior overrides it.
    async fn call_waiting(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        bypass_cache: bool,
    ) -> Result<SourcedResponse, FathomError> {
        self.call(endpoint, params, bypass_cache).await
    }

    /// Cheap, synchronous health signal; does not make a network call.
    fn health(&self) -> AdapterHealth {
        AdapterHealth::Healthy
    }

    /// Metrics for this adapter instance, if it tracks any. Wrapping
    /// middleware delegates to the innermost adapter's metrics.
    fn metrics(&self) -> Option<&AdapterMetrics> {
        None
    }
}
