//! M05: CompetitorIntelligence. Depends on M01 (vertical, for the
//! positioning template) and M02 (this company's own search provider, for
//! wording the statement).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Adapter, Module};
use fathom_types::payloads::{Competitor, CompetitorTally, SearchProvider};
use fathom_types::{FathomError, ModuleId, ModulePayload, ModuleResult};

use crate::support::success;

pub struct CompetitorIntelligenceModule {
    web_search: Arc<dyn Adapter>,
    tech_fingerprint: Arc<dyn Adapter>,
}

impl CompetitorIntelligenceModule {
    #[must_use]
    pub fn new(web_search: Arc<dyn Adapter>, tech_fingerprint: Arc<dyn Adapter>) -> Self {
        Self {
            web_search,
            tech_fingerprint,
        }
    }

    fn tally(competitors: &[Competitor]) -> CompetitorTally {
        let mut tally = CompetitorTally::default();
        for c in competitors {
            match c.search_provider {
                SearchProvider::Algolia => tally.algolia_users += 1,
                SearchProvider::Competitor => tally.other_users += 1,
                SearchProvider::NativePlatform => tally.native_users += 1,
                SearchProvider::Unknown => tally.unknown_users += 1,
            }
        }
        tally
    }
}

#[async_trait]
impl Module for CompetitorIntelligenceModule {
    fn id(&self) -> ModuleId {
        ModuleId::M05CompetitorIntelligence
    }

    async fn execute(
        &self,
        domain: &str,
        context: &Context,
        force_refresh: bool,
    ) -> Result<ModuleResult, FathomError> {
        self.dependencies_satisfied(context)?;
        let started = Instant::now();

        let mut params = BTreeMap::new();
        params.insert("q".to_string(), format!("{domain} competitors similar sites"));
        let search = self.web_search.call("search", &params, force_refresh).await?;

        let candidate_domains: Vec<String> = search.data["results"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|r| r["url"].as_str())
            .map(str::to_string)
            .collect();

        let mut competitors = Vec::new();
        for candidate in candidate_domains.iter().take(10) {
            let mut p = BTreeMap::new();
            p.insert("domain".to_string(), candidate.clone());
            let detect = self.tech_fingerprint.call("detect", &p, force_refresh).await?;
            let has_algolia = detect.data["technologies"]
                .as_array()
                .into_iter()
                .flatten()
                .any(|t| t["name"].as_str().unwrap_or_default().eq_ignore_ascii_case("algolia"));
            competitors.push(Competitor {
                domain: candidate.clone(),
                search_provider: if has_algolia {
                    SearchProvider::Algolia
                } else {
                    SearchProvider::Unknown
                },
            });
        }

        let tally = Self::tally(&competitors);
        let first_mover_opportunity = tally.algolia_users == 0;

        let vertical_name = context
            .get(&ModuleId::M01CompanyContext)
            .and_then(|r| r.data.as_ref())
            .map(|p| match p {
                ModulePayload::CompanyContext(c) => format!("{:?}", c.vertical),
                other => format!("{:?}", other.module_id()),
            })
            .unwrap_or_else(|| "its".to_string());

        let positioning_statement = if first_mover_opportunity {
            format!(
                "No {vertical_name} competitor in this landscape has adopted Algolia yet, leaving a first-mover opening."
            )
        } else {
            format!(
                "{} of {} tracked competitors in this {vertical_name} landscape already run Algolia.",
                tally.algolia_users,
                competitors.len()
            )
        };

        let payload = fathom_types::payloads::CompetitorIntelligence {
            competitors,
            tally,
            first_mover_opportunity,
            positioning_statement,
        };

        Ok(success(
            self.id(),
            domain,
            ModulePayload::CompetitorIntelligence(payload),
            search.citation,
            Vec::new(),
            started,
        ))
    }
}
