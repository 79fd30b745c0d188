//! M02: TechnologyStack. No declared dependencies.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Adapter, Module};
use fathom_types::payloads::{
    DetectedTechnology, DisplacementPriority, SearchProvider, TechSpendTier, TechnologyStack,
};
use fathom_types::{FathomError, ModuleId, ModulePayload};

use crate::support::success;

const KNOWN_COMPETITORS: &[&str] = &["constructor", "elasticsearch", "coveo", "searchspring", "bloomreach"];

pub struct TechnologyStackModule {
    tech_fingerprint: Arc<dyn Adapter>,
}

impl TechnologyStackModule {
    #[must_use]
    pub fn new(tech_fingerprint: Arc<dyn Adapter>) -> Self {
        Self { tech_fingerprint }
    }

    fn classify_search_provider(technologies: &[DetectedTechnology]) -> SearchProvider {
        for tech in technologies {
            let lower = tech.name.to_ascii_lowercase();
            if lower.contains("algolia") {
                return SearchProvider::Algolia;
            }
            if KNOWN_COMPETITORS.iter().any(|c| lower.contains(c)) {
                return SearchProvider::Competitor;
            }
            if lower.contains("native") || tech.category == "native-search" {
                return SearchProvider::NativePlatform;
            }
        }
        SearchProvider::Unknown
    }

    fn classify_displacement_priority(provider: SearchProvider) -> DisplacementPriority {
        match provider {
            SearchProvider::Algolia => DisplacementPriority::None,
            SearchProvider::Competitor => DisplacementPriority::High,
            SearchProvider::NativePlatform => DisplacementPriority::Medium,
            SearchProvider::Unknown => DisplacementPriority::Low,
        }
    }

    fn classify_spend_tier(technology_count: usize) -> TechSpendTier {
        match technology_count {
            0..=2 => TechSpendTier::Under10k,
            3..=5 => TechSpendTier::From10to25k,
            6..=9 => TechSpendTier::From25to50k,
            10..=15 => TechSpendTier::From50to100k,
            _ => TechSpendTier::Over100k,
        }
    }
}

#[async_trait]
impl Module for TechnologyStackModule {
    fn id(&self) -> ModuleId {
        ModuleId::M02TechnologyStack
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
        let response = self.tech_fingerprint.call("detect", &params, force_refresh).await?;

        let technologies: Vec<DetectedTechnology> = response.data["technologies"]
            .as_array()
            .into_iter()
            .flatten()
            .map(|t| DetectedTechnology {
                name: t["name"].as_str().unwrap_or_default().to_string(),
                category: t["category"].as_str().unwrap_or_default().to_string(),
                confidence: t["confidence"].as_f64().unwrap_or(0.0),
                first_seen: None,
                last_seen: None,
            })
            .collect();

        let partner_technologies: Vec<String> = response.data["partner_technologies"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();

        let search_provider = Self::classify_search_provider(&technologies);
        let has_algolia = search_provider == SearchProvider::Algolia;
        let displacement_priority = Self::classify_displacement_priority(search_provider);
        let tech_spend_tier = Self::classify_spend_tier(technologies.len());

        let payload = TechnologyStack {
            technologies,
            search_provider,
            has_algolia,
            partner_technologies,
            displacement_priority,
            tech_spend_tier,
        };

        Ok(success(
            self.id(),
            domain,
            ModulePayload::TechnologyStack(payload),
            response.citation,
            Vec::new(),
            started,
        ))
    }
}
