//! M11: DisplacementAnalysis. Hard-depends on M02; reads M05
//! opportunistically when present, which it always is since M05 runs in
//! wave 2 and M11 in wave 3.

use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Module};
use fathom_types::payloads::{
    AlgoliaFitScore, DisplacementAnalysis, DisplacementDifficulty, DisplacementPriority, SearchProvider,
};
use fathom_types::{FathomError, ModuleId, ModulePayload, ModuleResult};

use crate::support::success;

const PARTNER_TABLE: &[&str] = &["Shopify Plus", "BigCommerce", "commercetools", "Salesforce Commerce Cloud"];

fn difficulty_for(provider: SearchProvider) -> DisplacementDifficulty {
    match provider {
        SearchProvider::Algolia => DisplacementDifficulty::NotApplicable,
        SearchProvider::Competitor => DisplacementDifficulty::Hard,
        SearchProvider::NativePlatform => DisplacementDifficulty::Moderate,
        SearchProvider::Unknown => DisplacementDifficulty::Easy,
    }
}

#[derive(Default)]
pub struct DisplacementAnalysisModule;

impl DisplacementAnalysisModule {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for DisplacementAnalysisModule {
    fn id(&self) -> ModuleId {
        ModuleId::M11DisplacementAnalysis
    }

    async fn execute(
        &self,
        domain: &str,
        context: &Context,
        _force_refresh: bool,
    ) -> Result<ModuleResult, FathomError> {
        self.dependencies_satisfied(context)?;
        let started = Instant::now();

        let tech_stack = context.get(&ModuleId::M02TechnologyStack).and_then(|r| r.data.as_ref());
        let (current_provider, partner_technologies) = match tech_stack {
            Some(ModulePayload::TechnologyStack(t)) => (t.search_provider, t.partner_technologies.clone()),
            _ => (SearchProvider::Unknown, Vec::new()),
        };

        let partner_cosell_opportunities: Vec<String> = partner_technologies
            .iter()
            .filter(|p| PARTNER_TABLE.iter().any(|known| known.eq_ignore_ascii_case(p)))
            .cloned()
            .collect();

        let displacement_difficulty = difficulty_for(current_provider);

        let first_mover = context
            .get(&ModuleId::M05CompetitorIntelligence)
            .and_then(|r| r.data.as_ref())
            .map(|p| matches!(p, ModulePayload::CompetitorIntelligence(c) if c.first_mover_opportunity))
            .unwrap_or(false);

        let technical = if current_provider == SearchProvider::Algolia { 0.0 } else { 7.0 };
        let business = if partner_cosell_opportunities.is_empty() { 5.0 } else { 8.0 };
        let timing = if first_mover { 8.0 } else { 5.0 };
        let overall = (technical + business + timing) / 3.0;

        let displacement_priority = if current_provider == SearchProvider::Algolia {
            DisplacementPriority::NotApplicable
        } else if overall >= 7.0 {
            DisplacementPriority::High
        } else if overall >= 4.0 {
            DisplacementPriority::Medium
        } else {
            DisplacementPriority::Low
        };

        let payload = DisplacementAnalysis {
            current_provider,
            displacement_difficulty,
            partner_cosell_opportunities,
            algolia_fit_score: AlgoliaFitScore {
                technical,
                business,
                timing,
                overall,
            },
            displacement_priority,
        };

        let citation = fathom_core::citation_service::new_citation(
            fathom_types::SourceType::Manual,
            &format!("https://fathom-internal.test/displacement/{domain}"),
            chrono::Utc::now(),
            None,
            None,
            0.75,
        )
        .map_err(|e| FathomError::Other(e.to_string()))?;

        Ok(success(
            self.id(),
            domain,
            ModulePayload::DisplacementAnalysis(payload),
            citation,
            Vec::new(),
            started,
        ))
    }
}
