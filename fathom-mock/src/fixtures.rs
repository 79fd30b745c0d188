//! Deterministic fixture builders for end-to-end scheduler/module tests:
//! a large public retailer shape and a private-company shape.

use chrono::Utc;
use fathom_types::payloads::{
    BusinessModel, CompanyContext, FinancialProfile, MarginZone, Vertical,
};
use fathom_types::{ModulePayload, ModuleResult, ModuleStatus, SourceCitation, SourceType};

fn citation(source_type: SourceType, confidence: f64) -> SourceCitation {
    SourceCitation::new(
        source_type,
        "https://fixture.fathom.test/record",
        Utc::now(),
        None,
        None,
        confidence,
    )
    .expect("fixture citation url is always valid")
}

/// A large public retailer: resolvable ticker, high traffic, green margins.
/// Shaped after the `"costco.com"` end-to-end scenario.
#[must_use]
pub fn large_public_retailer_company_context(domain: &str) -> ModuleResult {
    let payload = CompanyContext {
        name: domain.trim_end_matches(".com").to_string(),
        ticker: Some("COST".to_string()),
        exchange: Some("NASDAQ".to_string()),
        headquarters: Some("Issaquah, WA".to_string()),
        vertical: Vertical::Commerce,
        sub_vertical: Some("Warehouse Club".to_string()),
        business_model: BusinessModel::B2C,
        employee_count: Some(300_000),
        store_count: Some(800),
        brands: vec!["Kirkland Signature".to_string()],
        founded_year: Some(1983),
        description: Some("Membership warehouse retailer.".to_string()),
        data_quality_score: 0.92,
    };
    ModuleResult {
        module_id: fathom_types::ModuleId::M01CompanyContext,
        domain: domain.to_string(),
        status: ModuleStatus::Success,
        data: Some(ModulePayload::CompanyContext(payload)),
        primary_citation: Some(citation(SourceType::CompanySite, 0.9)),
        supporting_citations: Vec::new(),
        executed_at: Utc::now(),
        duration_ms: 120,
        cached: false,
        error_message: None,
        error_type: None,
    }
}

/// A private company where ticker resolution fails: `is_public=false`,
/// `data_limitation_reason` populated, citation still present at reduced
/// confidence per the P0 mandate.
#[must_use]
pub fn private_company_financial_profile(domain: &str) -> ModuleResult {
    let payload = FinancialProfile {
        is_public: false,
        revenue_series: Vec::new(),
        revenue_cagr: None,
        net_income_series: Vec::new(),
        gross_margin: None,
        operating_margin: None,
        net_margin: None,
        ebitda_margin: None,
        margin_zone: MarginZone::Unknown,
        latest_revenue: None,
        ecommerce_share: None,
        ecommerce_revenue: None,
        addressable_search_revenue: None,
        roi_scenarios: Vec::new(),
        data_limitation_reason: Some(
            "no ticker resolvable; private-company financial data unavailable".to_string(),
        ),
    };
    ModuleResult {
        module_id: fathom_types::ModuleId::M04FinancialProfile,
        domain: domain.to_string(),
        status: ModuleStatus::Success,
        data: Some(ModulePayload::FinancialProfile(payload)),
        primary_citation: Some(citation(SourceType::WebSearch, 0.35)),
        supporting_citations: Vec::new(),
        executed_at: Utc::now(),
        duration_ms: 80,
        cached: false,
        error_message: None,
        error_type: None,
    }
}
