//! General web-search source backing modules that need ad-hoc lookups
//! (news, press releases, case studies) rather than a structured vendor
//! API. 5.0 req/s burst 20, 7d cache TTL, variable per-call cost (modeled
//! here as the vendor's own reported cost per result page), 30s timeout.

use std::sync::Arc;

use fathom_types::SourceType;
use serde_json::json;

use crate::source::SourceAdapter;
use crate::strategies::synthetic_request;

#[must_use]
pub fn new() -> SourceAdapter {
    SourceAdapter::new(
        "web_search",
        SourceType::WebSearch,
        "https://api.fathom-vendors.test/web-search",
        Some("v1".to_string()),
        crate::strategies::default_url_builder(),
        synthetic_request(Arc::new(|endpoint, _url| match endpoint {
            "search" => json!({
                "results": [
                    {
                        "title": "Costco migrates search to Algolia",
                        "url": "https://example-news.test/costco-algolia",
                        "published_at": "2025-06-02",
                        "snippet": "Costco's e-commerce team replaced its legacy search stack with Algolia.",
                    },
                ],
            }),
            _ => json!({"results": []}),
        })),
        Arc::new(|raw| Ok((raw.clone(), 0.6))),
    )
}
