//! Rate-limiting middleware wrapping an `Adapter` with a `TokenBucket`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use fathom_core::{Adapter, AdapterHealth, AdapterMetrics, SourcedResponse, TokenBucket};
use fathom_types::FathomError;

/// Non-blocking on `call` (returns `RateLimitExceeded` immediately when no
/// token is available), blocking on `call_waiting` (awaits the bucket).
pub struct RateLimitedAdapter {
    inner: Arc<dyn Adapter>,
    bucket: Arc<TokenBucket>,
}

impl RateLimitedAdapter {
    #[must_use]
    pub fn new(inner: Arc<dyn Adapter>, bucket: Arc<TokenBucket>) -> Self {
        Self { inner, bucket }
    }
}

#[async_trait]
impl Adapter for RateLimitedAdapter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn call(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        bypass_cache: bool,
    ) -> Result<SourcedResponse, FathomError> {
        self.bucket
            .try_acquire()
            .map_err(|wait_ms| FathomError::RateLimitExceeded { wait_ms })?;
        self.inner.call(endpoint, params, bypass_cache).await
    }

    async fn call_waiting(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        bypass_cache: bool,
    ) -> Result<SourcedResponse, FathomError> {
        self.bucket.acquire().await;
        self.inner.call_waiting(endpoint, params, bypass_cache).await
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
    use fathom_types::{RateLimiterConfig, SourceType};

    #[tokio::test]
    async fn non_blocking_call_fails_fast_when_exhausted() {
        let mock = Arc::new(MockAdapter::new("finance"));
        mock.set_response("quote", serde_json::json!({}), SourceType::Finance);
        let bucket = Arc::new(TokenBucket::new(RateLimiterConfig::new(0.01, 1.0)));
        let wrapped = RateLimitedAdapter::new(mock, bucket);
        let params = BTreeMap::new();
        wrapped.call("quote", &params, false).await.unwrap();
        let err = wrapped.call("quote", &params, false).await.unwrap_err();
        assert!(matches!(err, FathomError::RateLimitExceeded { .. }));
    }
}
