//! Moka-backed response cache wrapping an `Adapter`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use fathom_core::{Adapter, AdapterHealth, AdapterMetrics, SourcedResponse};
use fathom_types::{CacheConfig, FathomError};
use moka::future::Cache;
use sha2::{Digest, Sha256};

/// Deterministic cache key: `sha256(adapter_name | endpoint | sorted params)`,
/// truncated to 32 hex characters. Sorting params first means argument
/// order never affects the key.
#[must_use]
pub fn cache_key(adapter_name: &str, endpoint: &str, params: &BTreeMap<String, String>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(adapter_name.as_bytes());
    hasher.update(b"|");
    hasher.update(endpoint.as_bytes());
    for (k, v) in params {
        hasher.update(b"|");
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
    }
    let digest = hasher.finalize();
    hex_prefix(&digest, 32)
}

fn hex_prefix(bytes: &[u8], chars: usize) -> String {
    let mut out = String::with_capacity(chars);
    for byte in bytes {
        if out.len() >= chars {
            break;
        }
        out.push_str(&format!("{byte:02x}"));
    }
    out.truncate(chars);
    out
}

/// Wraps an inner adapter with a moka TTL cache keyed on
/// `(adapter_name, endpoint, params)`. On a hit, the returned citation is
/// re-wrapped via `cache_citation` so `source_type` becomes `Cache` while
/// `original_citation` preserves true provenance, per the P0 mandate.
pub struct CachingAdapter {
    inner: Arc<dyn Adapter>,
    cache: Cache<String, SourcedResponse>,
}

impl CachingAdapter {
    #[must_use]
    pub fn new(inner: Arc<dyn Adapter>, config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(std::time::Duration::from_secs(config.ttl_seconds))
            .build();
        Self { inner, cache }
    }
}

#[async_trait]
impl Adapter for CachingAdapter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn call(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        bypass_cache: bool,
    ) -> Result<SourcedResponse, FathomError> {
        let key = cache_key(self.inner.name(), endpoint, params);
        if !bypass_cache {
            if let Some(hit) = self.cache.get(&key).await {
                if let Some(metrics) = self.inner.metrics() {
                    metrics.record_cache_hit();
                }
                let citation =
                    fathom_core::citation_service::cache_citation(hit.citation, key, Utc::now());
                return Ok(SourcedResponse {
                    data: hit.data,
                    citation,
                });
            }
            if let Some(metrics) = self.inner.metrics() {
                metrics.record_cache_miss();
            }
        }
        let response = self.inner.call(endpoint, params, bypass_cache).await?;
        self.cache.insert(key, response.clone()).await;
        Ok(response)
    }

    async fn call_waiting(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        bypass_cache: bool,
    ) -> Result<SourcedResponse, FathomError> {
        let key = cache_key(self.inner.name(), endpoint, params);
        if !bypass_cache {
            if let Some(hit) = self.cache.get(&key).await {
                let citation =
                    fathom_core::citation_service::cache_citation(hit.citation, key, Utc::now());
                return Ok(SourcedResponse {
                    data: hit.data,
                    citation,
                });
            }
        }
        let response = self.inner.call_waiting(endpoint, params, bypass_cache).await?;
        self.cache.insert(key, response.clone()).await;
        Ok(response)
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
    async fn second_call_with_same_params_hits_cache() {
        let mock = Arc::new(MockAdapter::new("traffic"));
        mock.set_response(
            "volume",
            serde_json::json!({"visits": 100}),
            SourceType::Traffic,
        );
        let caching = CachingAdapter::new(mock.clone(), CacheConfig::default());
        let params = BTreeMap::new();
        caching.call("volume", &params, false).await.unwrap();
        caching.call("volume", &params, false).await.unwrap();
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn bypass_cache_skips_the_lookup_and_refreshes_it() {
        let mock = Arc::new(MockAdapter::new("traffic"));
        mock.set_response(
            "volume",
            serde_json::json!({"visits": 100}),
            SourceType::Traffic,
        );
        let caching = CachingAdapter::new(mock.clone(), CacheConfig::default());
        let params = BTreeMap::new();
        caching.call("volume", &params, false).await.unwrap();
        caching.call("volume", &params, true).await.unwrap();
        assert_eq!(mock.call_count(), 2);
        caching.call("volume", &params, false).await.unwrap();
        assert_eq!(mock.call_count(), 2, "the bypassing call refreshed the cached entry");
    }

    #[test]
    fn cache_key_is_order_independent_over_params() {
        let mut a = BTreeMap::new();
        a.insert("b".to_string(), "2".to_string());
        a.insert("a".to_string(), "1".to_string());
        let mut b = BTreeMap::new();
        b.insert("a".to_string(), "1".to_string());
        b.insert("b".to_string(), "2".to_string());
        assert_eq!(cache_key("x", "y", &a), cache_key("x", "y", &b));
    }
}
