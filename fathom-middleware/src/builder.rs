//! `AdapterStack`: composes the four middlewares in the fixed order
//! cache -> rate limit -> circuit breaker -> retry, so caching sees the
//! highest hit rate (short-circuiting everything beneath it) while retry
//! sits innermost, closest to the adapter doing the actual I/O.

use std::sync::Arc;

use fathom_core::{Adapter, BreakerRegistry, LimiterRegistry};
use fathom_types::{BackoffConfig, CacheConfig, CircuitBreakerConfig, RateLimiterConfig};

use crate::caching::CachingAdapter;
use crate::circuit_breaking::CircuitBreakingAdapter;
use crate::rate_limiting::RateLimitedAdapter;
use crate::retrying::RetryingAdapter;

pub struct AdapterStack {
    rate_limiter_config: RateLimiterConfig,
    circuit_breaker_config: CircuitBreakerConfig,
    cache_config: CacheConfig,
    backoff_config: BackoffConfig,
}

impl AdapterStack {
    #[must_use]
    pub const fn new(
        rate_limiter_config: RateLimiterConfig,
        circuit_breaker_config: CircuitBreakerConfig,
        cache_config: CacheConfig,
        backoff_config: BackoffConfig,
    ) -> Self {
        Self {
            rate_limiter_config,
            circuit_breaker_config,
            cache_config,
            backoff_config,
        }
    }

    /// Wrap `adapter` with all four layers, pulling the rate limiter and
    /// circuit breaker out of the shared registries so every call site for
    /// the same adapter name shares state.
    #[must_use]
    pub fn wrap(
        &self,
        adapter: Arc<dyn Adapter>,
        limiters: &LimiterRegistry,
        breakers: &BreakerRegistry,
    ) -> Arc<dyn Adapter> {
        let name = adapter.name().to_string();
        let retrying = Arc::new(RetryingAdapter::new(adapter, self.backoff_config));
        let bucket = limiters.bucket_for(&name, self.rate_limiter_config);
        let breaker = breakers.breaker_for(&name, self.circuit_breaker_config);
        let circuit_breaking = Arc::new(CircuitBreakingAdapter::new(retrying, breaker));
        let rate_limited = Arc::new(RateLimitedAdapter::new(circuit_breaking, bucket));
        Arc::new(CachingAdapter::new(rate_limited, self.cache_config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_mock::MockAdapter;
    use fathom_types::SourceType;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn wrapped_adapter_serves_calls_end_to_end() {
        let mock = Arc::new(MockAdapter::new("people"));
        mock.set_response("org_chart", serde_json::json!({"execs": []}), SourceType::PeopleNetwork);
        let stack = AdapterStack::new(
            RateLimiterConfig::PEOPLE,
            CircuitBreakerConfig::default(),
            CacheConfig::default(),
            BackoffConfig::default(),
        );
        let limiters = LimiterRegistry::new();
        let breakers = BreakerRegistry::new();
        let wrapped = stack.wrap(mock, &limiters, &breakers);
        let result = wrapped.call("org_chart", &BTreeMap::new(), false).await;
        assert!(result.is_ok());
    }
}
