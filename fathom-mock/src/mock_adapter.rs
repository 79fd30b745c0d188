//! Programmable `Adapter` test double: queue canned responses or errors
//! and assert on call history, without touching a real upstream.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use fathom_core::{Adapter, AdapterHealth, SourcedResponse};
use fathom_types::{FathomError, SourceCitation, SourceType};
use serde_json::Value;

enum Behavior {
    Response(Value, SourceType),
    Error(FathomError),
    /// Fail with `err` for the first `remaining` calls, then return
    /// `response` on every call after.
    ErrorThenResponse {
        remaining: u32,
        err: FathomError,
        response: Value,
        source_type: SourceType,
    },
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub endpoint: String,
    pub params: BTreeMap<String, String>,
}

/// A fully deterministic `Adapter` whose per-endpoint behavior is set by
/// the test before exercising it. Every call is recorded so tests can
/// assert on call counts and argument shapes without depending on timing.
pub struct MockAdapter {
    name: String,
    behaviors: Mutex<BTreeMap<String, Behavior>>,
    call_count: AtomicU32,
    history: Mutex<Vec<RecordedCall>>,
}

impl MockAdapter {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviors: Mutex::new(BTreeMap::new()),
            call_count: AtomicU32::new(0),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn set_response(&self, endpoint: &str, data: Value, source_type: SourceType) {
        self.behaviors
            .lock()
            .expect("mock mutex poisoned")
            .insert(endpoint.to_string(), Behavior::Response(data, source_type));
    }

    pub fn set_error(&self, endpoint: &str, err: FathomError) {
        self.behaviors
            .lock()
            .expect("mock mutex poisoned")
            .insert(endpoint.to_string(), Behavior::Error(err));
    }

    /// Fail `err` for the first `fail_count` calls to `endpoint`, then
    /// succeed with `response` on every subsequent call.
    pub fn set_error_then_response(
        &self,
        endpoint: &str,
        fail_count: u32,
        err: FathomError,
        response: Value,
        source_type: SourceType,
    ) {
        self.behaviors.lock().expect("mock mutex poisoned").insert(
            endpoint.to_string(),
            Behavior::ErrorThenResponse {
                remaining: fail_count,
                err,
                response,
                source_type,
            },
        );
    }

    #[must_use]
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn history(&self) -> Vec<RecordedCall> {
        self.history.lock().expect("mock mutex poisoned").clone()
    }

    fn record(&self, endpoint: &str, params: &BTreeMap<String, String>) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.history
            .lock()
            .expect("mock mutex poisoned")
            .push(RecordedCall {
                endpoint: endpoint.to_string(),
                params: params.clone(),
            });
    }
}

#[async_trait]
impl Adapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        _bypass_cache: bool,
    ) -> Result<SourcedResponse, FathomError> {
        self.record(endpoint, params);
        let mut behaviors = self.behaviors.lock().expect("mock mutex poisoned");
        match behaviors.get_mut(endpoint) {
            Some(Behavior::Response(data, source_type)) => Ok(SourcedResponse {
                data: data.clone(),
                citation: citation_for(&self.name, endpoint, *source_type),
            }),
            Some(Behavior::Error(err)) => Err(err.clone()),
            Some(Behavior::ErrorThenResponse {
                remaining,
                err,
                response,
                source_type,
            }) => {
                if *remaining > 0 {
                    *remaining -= 1;
                    Err(err.clone())
                } else {
                    Ok(SourcedResponse {
                        data: response.clone(),
                        citation: citation_for(&self.name, endpoint, *source_type),
                    })
                }
            }
            None => Err(FathomError::DataNotFound(format!(
                "no mock behavior configured for endpoint {endpoint}"
            ))),
        }
    }

    fn health(&self) -> AdapterHealth {
        AdapterHealth::Healthy
    }
}

fn citation_for(adapter_name: &str, endpoint: &str, source_type: SourceType) -> SourceCitation {
    SourceCitation::new(
        source_type,
        &format!("https://mock.fathom.test/{adapter_name}/{endpoint}"),
        Utc::now(),
        Some(endpoint.to_string()),
        Some("mock-v1".to_string()),
        0.95,
    )
    .expect("mock citation url is always valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_endpoint_returns_data_not_found() {
        let mock = MockAdapter::new("traffic");
        let err = mock.call("volume", &BTreeMap::new(), false).await.unwrap_err();
        assert!(matches!(err, FathomError::DataNotFound(_)));
    }

    #[tokio::test]
    async fn records_every_call() {
        let mock = MockAdapter::new("finance");
        mock.set_response("quote", serde_json::json!({}), SourceType::Finance);
        mock.call("quote", &BTreeMap::new(), false).await.unwrap();
        mock.call("quote", &BTreeMap::new(), false).await.unwrap();
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.history().len(), 2);
    }
}
