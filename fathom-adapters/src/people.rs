//! People and hiring-signal source (job postings, role/headcount data).
//! The defaults below (2.0 req/s burst 10, 14d cache TTL, $0.05/call, 30s
//! timeout) are extrapolated from the nearest comparable source (traffic
//! estimation), recorded as such in DESIGN.md.

use std::sync::Arc;

use fathom_types::SourceType;
use serde_json::json;

use crate::source::SourceAdapter;
use crate::strategies::synthetic_request;

#[must_use]
pub fn new() -> SourceAdapter {
    SourceAdapter::new(
        "people",
        SourceType::PeopleNetwork,
        "https://api.fathom-vendors.test/people",
        Some("v1".to_string()),
        crate::strategies::default_url_builder(),
        synthetic_request(Arc::new(|endpoint, _url| match endpoint {
            "hiring" => json!({
                "open_roles": 184,
                "role_counts": {"engineering": 62, "sales": 41, "product": 18},
                "postings_trend_90d_pct": 11.0,
            }),
            "executives" => json!({
                "executives": [
                    {"name": "Jane Doe", "title": "VP Engineering", "tenure_months": 26},
                ],
            }),
            _ => json!({"open_roles": null}),
        })),
        Arc::new(|raw| Ok((raw.clone(), 0.7))),
    )
}
