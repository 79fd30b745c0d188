//! Public-markets financial data source (quotes and filed statements).
//! 1.67 req/s burst 10, 1d TTL for price endpoints / 90d for statement
//! endpoints, free, 30s timeout.

use std::sync::Arc;

use fathom_types::SourceType;
use serde_json::json;

use crate::source::SourceAdapter;
use crate::strategies::synthetic_request;

#[must_use]
pub fn new() -> SourceAdapter {
    SourceAdapter::new(
        "finance",
        SourceType::Finance,
        "https://api.fathom-vendors.test/finance",
        Some("v1".to_string()),
        crate::strategies::default_url_builder(),
        synthetic_request(Arc::new(|endpoint, _url| match endpoint {
            "quote" => json!({
                "ticker": "COST",
                "exchange": "NASDAQ",
                "price": 872.14,
                "market_cap": 386_500_000_000i64,
            }),
            "statements" => json!({
                "is_public": true,
                "fiscal_year_end": "2025-08-31",
                "revenue_usd": 254_000_000_000i64,
                "gross_margin_pct": 12.5,
                "operating_margin_pct": 3.6,
                "ebitda_margin_pct": 5.4,
            }),
            _ => json!({"is_public": null}),
        })),
        Arc::new(|raw| Ok((raw.clone(), 0.95))),
    )
}
