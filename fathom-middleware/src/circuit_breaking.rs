//! Circuit-breaking middleware wrapping an `Adapter`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use fathom_core::{Adapter, AdapterHealth, AdapterMetrics, CircuitBreaker, CircuitState, SourcedResponse};
use fathom_types::FathomError;

pub struct CircuitBreakingAdapter {
    inner: Arc<dyn Adapter>,
    breaker: Arc<CircuitBreaker>,
}

impl CircuitBreakingAdapter {
    #[must_use]
    pub fn new(inner: Arc<dyn Adapter>, breaker: Arc<CircuitBreaker>) -> Self {
        Self { inner, breaker }
    }

    fn record_outcome(&self, result: &Result<SourcedResponse, FathomError>) {
        match result {
            Ok(_) => self.breaker.record_success(),
            Err(e) if e.is_benign() => self.breaker.record_success(),
            Err(_) => self.breaker.record_failure(),
        }
    }
}

#[async_trait]
impl Adapter for CircuitBreakingAdapter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn call(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        bypass_cache: bool,
    ) -> Result<SourcedResponse, FathomError> {
        self.breaker
            .allow_call()
            .map_err(|recover_in_ms| FathomError::CircuitOpen { recover_in_ms })?;
        let result = self.inner.call(endpoint, params, bypass_cache).await;
        self.record_outcome(&result);
        result
    }

    async fn call_waiting(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        bypass_cache: bool,
    ) -> Result<SourcedResponse, FathomError> {
        self.breaker
            .allow_call()
            .map_err(|recover_in_ms| FathomError::CircuitOpen { recover_in_ms })?;
        let result = self.inner.call_waiting(endpoint, params, bypass_cache).await;
        self.record_outcome(&result);
        result
    }

    fn health(&self) -> AdapterHealth {
        match self.breaker.state() {
            CircuitState::Closed => self.inner.health(),
            CircuitState::HalfOpen => AdapterHealth::Degraded,
            CircuitState::Open => AdapterHealth::Unavailable,
        }
    }

    fn metrics(&self) -> Option<&AdapterMetrics> {
        self.inner.metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_mock::MockAdapter;
    use fathom_types::CircuitBreakerConfig;

    #[tokio::test]
    async fn opens_after_repeated_upstream_errors() {
        let mock = Arc::new(MockAdapter::new("regulatory"));
        mock.set_error(
            "filings",
            FathomError::UpstreamError {
                status: 503,
                body: "unavailable".to_string(),
            },
        );
        let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 2,
            success_threshold: 1,
            recovery_timeout_ms: 60_000,
            half_open_requests: 1,
        }));
        let wrapped = CircuitBreakingAdapter::new(mock, breaker);
        let params = BTreeMap::new();
        let _ = wrapped.call("filings", &params, false).await;
        let _ = wrapped.call("filings", &params, false).await;
        let err = wrapped.call("filings", &params, false).await.unwrap_err();
        assert!(matches!(err, FathomError::CircuitOpen { .. }));
    }
}
