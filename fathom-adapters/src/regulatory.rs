//! Regulatory and compliance filings source (e.g. SEC/FTC/state-registry
//! shaped). 0.1 req/s burst 2, 90d cache TTL, free, 60s timeout: the
//! slowest and most heavily rate-limited adapter, reflecting real
//! registries' low request budgets.

use std::sync::Arc;

use fathom_types::SourceType;
use serde_json::json;

use crate::source::SourceAdapter;
use crate::strategies::synthetic_request;

#[must_use]
pub fn new() -> SourceAdapter {
    SourceAdapter::new(
        "regulatory",
        SourceType::RegulatoryFilings,
        "https://api.fathom-vendors.test/regulatory",
        Some("v1".to_string()),
        crate::strategies::default_url_builder(),
        synthetic_request(Arc::new(|endpoint, _url| match endpoint {
            "filings" => json!({
                "filings": [
                    {"type": "10-K", "filed_on": "2025-10-21", "jurisdiction": "US-SEC"},
                ],
                "sanctions_flags": [],
            }),
            _ => json!({"filings": []}),
        })),
        Arc::new(|raw| Ok((raw.clone(), 0.9))),
    )
}
