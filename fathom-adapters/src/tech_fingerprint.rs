//! Technology-fingerprint source (e.g. a BuiltWith-shaped API): detected
//! technology lists by domain. 0.5 req/s burst 5, 30d cache TTL,
//! $0.10/call, 30s timeout.

use std::sync::Arc;

use fathom_types::SourceType;
use serde_json::json;

use crate::source::SourceAdapter;
use crate::strategies::synthetic_request;

#[must_use]
pub fn new() -> SourceAdapter {
    SourceAdapter::new(
        "tech_fingerprint",
        SourceType::TechFingerprint,
        "https://api.fathom-vendors.test/tech-fingerprint",
        Some("v2".to_string()),
        crate::strategies::default_url_builder(),
        synthetic_request(Arc::new(|endpoint, _url| match endpoint {
            "detect" => json!({
                "technologies": [
                    {"name": "Algolia", "category": "search", "confidence": 0.92},
                    {"name": "Shopify Plus", "category": "ecommerce-platform", "confidence": 0.88},
                ],
                "partner_technologies": ["Shopify Plus"],
            }),
            _ => json!({"technologies": []}),
        })),
        Arc::new(|raw| Ok((raw.clone(), 0.85))),
    )
}
