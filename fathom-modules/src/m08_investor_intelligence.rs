//! M08: InvestorIntelligence. Depends on M01, M04. Public-only deep
//! extraction of filings/earnings material; private companies (per M04)
//! are skipped with no adapter call.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Adapter, Module};
use fathom_types::payloads::{ExecutiveQuote, InvestorIntelligence, SearchPriorityLevel};
use fathom_types::{FathomError, ModuleId, ModulePayload, ModuleResult, ModuleStatus};

use crate::support::success;

const SEARCH_KEYWORDS: &[&str] = &["search experience", "site search", "product discovery"];
const RELEVANT_KEYWORDS: &[&str] = &["personalization", "artificial intelligence", "ai-powered"];
const TRANSFORM_KEYWORDS: &[&str] = &["digital transformation"];

fn classify(commitments: &[String], risk_factors: &[String]) -> SearchPriorityLevel {
    let text = commitments
        .iter()
        .chain(risk_factors.iter())
        .map(|s| s.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    if SEARCH_KEYWORDS.iter().any(|k| text.contains(k)) {
        SearchPriorityLevel::High
    } else if RELEVANT_KEYWORDS.iter().any(|k| text.contains(k)) {
        SearchPriorityLevel::Medium
    } else if TRANSFORM_KEYWORDS.iter().any(|k| text.contains(k)) {
        SearchPriorityLevel::Low
    } else {
        SearchPriorityLevel::Unknown
    }
}

pub struct InvestorIntelligenceModule {
    regulatory: Arc<dyn Adapter>,
}

impl InvestorIntelligenceModule {
    #[must_use]
    pub fn new(regulatory: Arc<dyn Adapter>) -> Self {
        Self { regulatory }
    }
}

#[async_trait]
impl Module for InvestorIntelligenceModule {
    fn id(&self) -> ModuleId {
        ModuleId::M08InvestorIntelligence
    }

    async fn execute(
        &self,
        domain: &str,
        context: &Context,
        force_refresh: bool,
    ) -> Result<ModuleResult, FathomError> {
        self.dependencies_satisfied(context)?;
        let started = Instant::now();

        let is_public = context
            .get(&ModuleId::M04FinancialProfile)
            .and_then(|r| r.data.as_ref())
            .map(|p| matches!(p, ModulePayload::FinancialProfile(f) if f.is_public))
            .unwrap_or(false);

        if !is_public {
            return Ok(ModuleResult {
                module_id: self.id(),
                domain: domain.to_string(),
                status: ModuleStatus::Skipped,
                data: None,
                primary_citation: None,
                supporting_citations: Vec::new(),
                executed_at: chrono::Utc::now(),
                duration_ms: started.elapsed().as_millis().try_into().unwrap_or(u64::MAX),
                cached: false,
                error_message: Some("not public; no filings to extract".to_string()),
                error_type: Some("DataNotFound".to_string()),
            });
        }

        let mut params = BTreeMap::new();
        params.insert("domain".to_string(), domain.to_string());
        let response = self.regulatory.call("filings", &params, force_refresh).await?;

        let commitments: Vec<String> = response.data["filings"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|f| f["type"].as_str())
            .map(|t| format!("filed {t}"))
            .collect();
        let risk_factors: Vec<String> = response.data["sanctions_flags"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect();

        let search_priority_level = classify(&commitments, &risk_factors);
        let quotes: Vec<ExecutiveQuote> = Vec::new();

        let payload = InvestorIntelligence {
            search_priority_level,
            quotes,
            commitments,
            risk_factors,
        };

        Ok(success(
            self.id(),
            domain,
            ModulePayload::InvestorIntelligence(payload),
            response.citation,
            Vec::new(),
            started,
        ))
    }
}
