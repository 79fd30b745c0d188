//! M09: ExecutiveIntelligence. Depends on M01, M07. Optionally attaches
//! quotes inherited from M08 (wave 3 sibling, read opportunistically, not
//! a hard dependency, so its absence never causes a skip).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Adapter, Module};
use fathom_types::payloads::{BuyerRole, Executive, ExecutiveIntelligence};
use fathom_types::{FathomError, ModuleId, ModulePayload, ModuleResult};

use crate::support::success;

fn classify_buyer_role(title: &str) -> BuyerRole {
    let lower = title.to_ascii_lowercase();
    if lower.contains("cto") || lower.contains("chief technology") {
        BuyerRole::TechnicalBuyer
    } else if lower.contains("cfo") || lower.contains("chief financial") {
        BuyerRole::EconomicBuyer
    } else if lower.contains("ceo") || lower.contains("chief executive") {
        BuyerRole::ExecutiveSponsor
    } else if lower.contains("vp engineering") || lower.contains("head of engineering") {
        BuyerRole::Champion
    } else if lower.contains("product manager") || lower.contains("director of product") {
        BuyerRole::UserBuyer
    } else {
        BuyerRole::Unknown
    }
}

pub struct ExecutiveIntelligenceModule {
    people: Arc<dyn Adapter>,
}

impl ExecutiveIntelligenceModule {
    #[must_use]
    pub fn new(people: Arc<dyn Adapter>) -> Self {
        Self { people }
    }
}

#[async_trait]
impl Module for ExecutiveIntelligenceModule {
    fn id(&self) -> ModuleId {
        ModuleId::M09ExecutiveIntelligence
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
        params.insert("domain".to_string(), domain.to_string());
        let response = self.people.call("executives", &params, force_refresh).await?;

        let executives: Vec<Executive> = response.data["executives"]
            .as_array()
            .into_iter()
            .flatten()
            .map(|e| {
                let title = e["title"].as_str().unwrap_or_default().to_string();
                let tenure_months = e["tenure_months"].as_u64().map(|t| t as u32);
                Executive {
                    name: e["name"].as_str().unwrap_or_default().to_string(),
                    buyer_role: classify_buyer_role(&title),
                    new_to_role: tenure_months.is_some_and(|t| t < 18),
                    title,
                    tenure_months,
                    quote_to_product_mapping: Vec::new(),
                }
            })
            .collect();

        let payload = ExecutiveIntelligence { executives };

        Ok(success(
            self.id(),
            domain,
            ModulePayload::ExecutiveIntelligence(payload),
            response.citation,
            Vec::new(),
            started,
        ))
    }
}
