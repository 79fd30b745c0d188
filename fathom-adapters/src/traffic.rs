//! Web-traffic estimation source (SimilarWeb-shaped). 1.0 req/s burst 10,
//! 7d cache TTL, $0.08/call, 30s timeout.

use std::sync::Arc;

use fathom_types::SourceType;
use serde_json::json;

use crate::source::SourceAdapter;
use crate::strategies::synthetic_request;

#[must_use]
pub fn new() -> SourceAdapter {
    SourceAdapter::new(
        "traffic",
        SourceType::Traffic,
        "https://api.fathom-vendors.test/traffic",
        Some("v3".to_string()),
        crate::strategies::default_url_builder(),
        synthetic_request(Arc::new(|endpoint, _url| match endpoint {
            "estimate" => json!({
                "monthly_visits": 42_000_000,
                "visit_trend_pct_90d": 3.2,
                "top_geographies": [
                    {"country": "US", "share": 0.78},
                    {"country": "CA", "share": 0.09},
                ],
                "bounce_rate": 0.31,
            }),
            _ => json!({"monthly_visits": null}),
        })),
        Arc::new(|raw| Ok((raw.clone(), 0.8))),
    )
}
