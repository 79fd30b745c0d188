//! Retry middleware: jittered exponential backoff over `FathomError`'s
//! retryable set.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use fathom_core::{Adapter, AdapterHealth, AdapterMetrics, SourcedResponse};
use fathom_types::{BackoffConfig, FathomError};
use rand::Rng;

pub struct RetryingAdapter {
    inner: Arc<dyn Adapter>,
    config: BackoffConfig,
}

impl RetryingAdapter {
    #[must_use]
    pub fn new(inner: Arc<dyn Adapter>, config: BackoffConfig) -> Self {
        Self { inner, config }
    }

    fn jittered_delay(&self, attempt: u32) -> std::time::Duration {
        let base = self.config.base_delay_for_attempt(attempt);
        let jitter_frac = self.config.jitter_fraction.clamp(0.0, 1.0);
        let jitter = rand::rng().random_range(-jitter_frac..=jitter_frac);
        let scaled = base.as_secs_f64() * (1.0 + jitter);
        std::time::Duration::from_secs_f64(scaled.max(0.0))
    }

    fn should_retry(&self, err: &FathomError, attempt: u32) -> bool {
        err.is_retryable() && attempt + 1 < self.config.max_attempts
    }

    fn exhausted(&self, last_err: FathomError) -> FathomError {
        FathomError::RetryExhausted {
            attempts: self.config.max_attempts,
            last: last_err.to_string(),
        }
    }
}

#[async_trait]
impl Adapter for RetryingAdapter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn call(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        bypass_cache: bool,
    ) -> Result<SourcedResponse, FathomError> {
        let mut last_err = None;
        for attempt in 0..self.config.max_attempts {
            match self.inner.call(endpoint, params, bypass_cache).await {
                Ok(response) => return Ok(response),
                Err(err) if self.should_retry(&err, attempt) => {
                    if let Some(metrics) = self.inner.metrics() {
                        metrics.record_retry();
                    }
                    tokio::time::sleep(self.jittered_delay(attempt)).await;
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(self.exhausted(last_err.expect("loop runs at least once")))
    }

    async fn call_waiting(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        bypass_cache: bool,
    ) -> Result<SourcedResponse, FathomError> {
        let mut last_err = None;
        for attempt in 0..self.config.max_attempts {
            match self.inner.call_waiting(endpoint, params, bypass_cache).await {
                Ok(response) => return Ok(response),
                Err(err) if self.should_retry(&err, attempt) => {
                    if let Some(metrics) = self.inner.metrics() {
                        metrics.record_retry();
                    }
                    tokio::time::sleep(self.jittered_delay(attempt)).await;
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(self.exhausted(last_err.expect("loop runs at least once")))
    }

    fn health(&self) -> AdapterHealth {
        self.inner.health()
    }

    fn metrics(&self) -> Option<&AdapterMetrics> {
        self.inner.metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_mock::MockAdapter;
    use fathom_types::SourceType;

    #[tokio::test]
    async fn succeeds_after_transient_failures_then_success() {
        let mock = Arc::new(MockAdapter::new("web_search"));
        mock.set_error_then_response(
            "search",
            2,
            FathomError::Timeout(1000),
            serde_json::json!({"results": []}),
            SourceType::WebSearch,
        );
        let retrying = RetryingAdapter::new(
            mock,
            BackoffConfig {
                max_attempts: 4,
                base_delay_ms: 1,
                max_delay_ms: 5,
                jitter_fraction: 0.0,
            },
        );
        let result = retrying.call("search", &BTreeMap::new(), false).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn exhausts_after_max_attempts() {
        let mock = Arc::new(MockAdapter::new("web_search"));
        mock.set_error("search", FathomError::Timeout(1000));
        let retrying = RetryingAdapter::new(
            mock,
            BackoffConfig {
                max_attempts: 2,
                base_delay_ms: 1,
                max_delay_ms: 2,
                jitter_fraction: 0.0,
            },
        );
        let err = retrying.call("search", &BTreeMap::new(), false).await.unwrap_err();
        assert!(matches!(err, FathomError::RetryExhausted { attempts: 2, .. }));
    }
}
