//! `SourceAdapter`: one struct implementing `fathom_core::Adapter`,
//! configured per source type by composing the three strategies from
//! `strategies.rs` with a base URL and citation metadata.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use fathom_core::{Adapter, AdapterHealth, AdapterMetrics, SourcedResponse};
use fathom_types::{FathomError, SourceType};

use crate::strategies::{ParseFn, RequestFn, UrlBuilderFn};

pub struct SourceAdapter {
    name: String,
    source_type: SourceType,
    base_url: String,
    api_version: Option<String>,
    client: reqwest::Client,
    build_url: UrlBuilderFn,
    request: RequestFn,
    parse: ParseFn,
    metrics: AdapterMetrics,
}

impl SourceAdapter {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source_type: SourceType,
        base_url: impl Into<String>,
        api_version: Option<String>,
        build_url: UrlBuilderFn,
        request: RequestFn,
        parse: ParseFn,
    ) -> Self {
        Self {
            name: name.into(),
            source_type,
            base_url: base_url.into(),
            api_version,
            client: reqwest::Client::new(),
            build_url,
            request,
            parse,
            metrics: AdapterMetrics::default(),
        }
    }
}

#[async_trait]
impl Adapter for SourceAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        _bypass_cache: bool,
    ) -> Result<SourcedResponse, FathomError> {
        let started = std::time::Instant::now();
        let url = (self.build_url)(&self.base_url, endpoint, params);
        let result = (self.request)(self.client.clone(), url.clone()).await;
        let latency_ms = started.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
        match result {
            Ok(raw) => match (self.parse)(&raw) {
                Ok((data, confidence)) => {
                    self.metrics.record_call(true, latency_ms);
                    let citation = fathom_core::citation_service::new_citation(
                        self.source_type,
                        &url,
                        Utc::now(),
                        Some(endpoint.to_string()),
                        self.api_version.clone(),
                        confidence,
                    )
                    .map_err(|e| FathomError::Other(e.to_string()))?;
                    Ok(SourcedResponse { data, citation })
                }
                Err(err) => {
                    self.metrics.record_call(false, latency_ms);
                    Err(err)
                }
            },
            Err(err) => {
                self.metrics.record_call(false, latency_ms);
                Err(err)
            }
        }
    }

    fn health(&self) -> AdapterHealth {
        if self.metrics.success_rate() >= 0.5 || self.metrics.total_calls.load(std::sync::atomic::Ordering::Relaxed) == 0 {
            AdapterHealth::Healthy
        } else {
            AdapterHealth::Degraded
        }
    }

    fn metrics(&self) -> Option<&AdapterMetrics> {
        Some(&self.metrics)
    }
}
