//! M12: CaseStudyMatching. Depends on M01, M02. Ranks a fixed internal
//! library of case studies against the target's vertical and tech stack.

use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Module};
use fathom_types::payloads::{BusinessModel, CaseStudyMatch, CaseStudyMatching, SearchProvider, Vertical};
use fathom_types::{FathomError, ModuleId, ModulePayload, ModuleResult};

use crate::support::success;

struct CaseStudy {
    id: &'static str,
    vertical: Vertical,
    business_model: BusinessModel,
    displaced_provider: SearchProvider,
    use_case: &'static str,
}

const LIBRARY: &[CaseStudy] = &[
    CaseStudy {
        id: "retailer-algolia-migration",
        vertical: Vertical::Commerce,
        business_model: BusinessModel::B2C,
        displaced_provider: SearchProvider::Competitor,
        use_case: "faceted search migration off Elasticsearch",
    },
    CaseStudy {
        id: "marketplace-personalization",
        vertical: Vertical::Commerce,
        business_model: BusinessModel::B2B2C,
        displaced_provider: SearchProvider::NativePlatform,
        use_case: "personalized ranking for a multi-vendor catalog",
    },
    CaseStudy {
        id: "publisher-content-discovery",
        vertical: Vertical::Content,
        business_model: BusinessModel::B2C,
        displaced_provider: SearchProvider::Unknown,
        use_case: "recommendation-driven content discovery",
    },
    CaseStudy {
        id: "helpdesk-self-service-deflection",
        vertical: Vertical::Support,
        business_model: BusinessModel::B2B,
        displaced_provider: SearchProvider::NativePlatform,
        use_case: "self-service ticket deflection via search",
    },
];

fn score_and_reason(target_vertical: Vertical, target_model: BusinessModel, target_provider: SearchProvider, case: &CaseStudy) -> (f64, String) {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    if case.vertical == target_vertical {
        score += 0.5;
        reasons.push(format!("same vertical ({target_vertical:?})"));
    }
    if case.business_model == target_model {
        score += 0.2;
        reasons.push("same business model".to_string());
    }
    if case.displaced_provider == target_provider {
        score += 0.3;
        reasons.push(format!("displaced the same provider ({target_provider:?})"));
    }

    let reason = if reasons.is_empty() {
        format!("use case: {}", case.use_case)
    } else {
        format!("{}, use case: {}", reasons.join(", "), case.use_case)
    };
    (score, reason)
}

#[derive(Default)]
pub struct CaseStudyMatchingModule;

impl CaseStudyMatchingModule {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for CaseStudyMatchingModule {
    fn id(&self) -> ModuleId {
        ModuleId::M12CaseStudyMatching
    }

    async fn execute(
        &self,
        domain: &str,
        context: &Context,
        _force_refresh: bool,
    ) -> Result<ModuleResult, FathomError> {
        self.dependencies_satisfied(context)?;
        let started = Instant::now();

        let (vertical, business_model) = match context
            .get(&ModuleId::M01CompanyContext)
            .and_then(|r| r.data.as_ref())
        {
            Some(ModulePayload::CompanyContext(c)) => (c.vertical, c.business_model),
            _ => (Vertical::Other, BusinessModel::B2C),
        };
        let search_provider = match context
            .get(&ModuleId::M02TechnologyStack)
            .and_then(|r| r.data.as_ref())
        {
            Some(ModulePayload::TechnologyStack(t)) => t.search_provider,
            _ => SearchProvider::Unknown,
        };

        let mut matches: Vec<CaseStudyMatch> = LIBRARY
            .iter()
            .map(|case| {
                let (score, reason) = score_and_reason(vertical, business_model, search_provider, case);
                CaseStudyMatch {
                    case_study_id: case.id.to_string(),
                    score,
                    reason,
                }
            })
            .filter(|m| m.score > 0.0)
            .collect();
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        let payload = CaseStudyMatching { matches };

        let citation = fathom_core::citation_service::new_citation(
            fathom_types::SourceType::Manual,
            &format!("https://fathom-internal.test/case-studies/{domain}"),
            chrono::Utc::now(),
            None,
            None,
            0.8,
        )
        .map_err(|e| FathomError::Other(e.to_string()))?;

        Ok(success(
            self.id(),
            domain,
            ModulePayload::CaseStudyMatching(payload),
            citation,
            Vec::new(),
            started,
        ))
    }
}
