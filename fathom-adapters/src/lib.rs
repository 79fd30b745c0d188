//! Concrete source adapters and the runtime that wraps each in the
//! caching/rate-limiting/circuit-breaking/retry stack from
//! `fathom-middleware`.

mod builder;
mod finance;
mod people;
mod regulatory;
mod source;
mod strategies;
mod tech_fingerprint;
mod traffic;
mod web_search;

pub use builder::{AdapterKind, AdapterRuntime, AdapterRuntimeBuilder};
pub use source::SourceAdapter;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn runtime_builds_all_six_adapters_and_serves_calls() {
        let runtime = AdapterRuntimeBuilder::new().build();
        for kind in AdapterKind::all() {
            let adapter = runtime.get(kind);
            assert_eq!(adapter.name(), kind.name());
        }
        let finance = runtime.get(AdapterKind::Finance);
        let result = finance.call("quote", &BTreeMap::new(), false).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn tech_fingerprint_response_is_cited() {
        let runtime = AdapterRuntimeBuilder::new().build();
        let adapter = runtime.get(AdapterKind::TechFingerprint);
        let mut params = BTreeMap::new();
        params.insert("domain".to_string(), "costco.com".to_string());
        let response = adapter.call("detect", &params, false).await.unwrap();
        assert!(response.citation.confidence_score > 0.0);
    }
}
