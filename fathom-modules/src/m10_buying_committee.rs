//! M10: BuyingCommittee. Depends on M01, M06, M09. Pure synthesis: no
//! adapter call, just projection of M09's executives into committee
//! slots.

use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Module};
use fathom_types::payloads::{BuyerRole, BuyingCommittee, Executive};
use fathom_types::{FathomError, ModuleId, ModulePayload, ModuleResult};

use crate::support::success;

#[derive(Default)]
pub struct BuyingCommitteeModule;

impl BuyingCommitteeModule {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for BuyingCommitteeModule {
    fn id(&self) -> ModuleId {
        ModuleId::M10BuyingCommittee
    }

    async fn execute(
        &self,
        domain: &str,
        context: &Context,
        _force_refresh: bool,
    ) -> Result<ModuleResult, FathomError> {
        self.dependencies_satisfied(context)?;
        let started = Instant::now();

        let executives: Vec<Executive> = context
            .get(&ModuleId::M09ExecutiveIntelligence)
            .and_then(|r| r.data.as_ref())
            .map(|p| match p {
                ModulePayload::ExecutiveIntelligence(e) => e.executives.clone(),
                _ => Vec::new(),
            })
            .unwrap_or_default();

        let mut executive_sponsor = None;
        let mut economic_buyer = None;
        let mut technical_buyer = None;
        let mut champion = None;
        let mut user_buyers = Vec::new();
        let mut technical_evaluators = Vec::new();

        for exec in executives {
            match exec.buyer_role {
                BuyerRole::ExecutiveSponsor => executive_sponsor.get_or_insert(exec),
                BuyerRole::EconomicBuyer => economic_buyer.get_or_insert(exec),
                BuyerRole::TechnicalBuyer => technical_buyer.get_or_insert(exec),
                BuyerRole::Champion => champion.get_or_insert(exec),
                BuyerRole::UserBuyer => {
                    user_buyers.push(exec);
                    continue;
                }
                BuyerRole::Unknown => {
                    technical_evaluators.push(exec);
                    continue;
                }
            };
        }

        let filled = [&executive_sponsor, &economic_buyer, &technical_buyer, &champion]
            .iter()
            .filter(|slot| slot.is_some())
            .count();
        let committee_completeness_score = filled as f64 / 4.0;

        let mut engagement_readiness_score: f64 = 0.0;
        let mut engagement_sequence = Vec::new();
        if champion.is_some() {
            engagement_readiness_score += 0.4;
            engagement_sequence.push("Champion".to_string());
        }
        if technical_buyer.is_some() {
            engagement_readiness_score += 0.2;
            engagement_sequence.push("Technical Buyer".to_string());
        }
        if economic_buyer.is_some() {
            engagement_readiness_score += 0.1;
            engagement_sequence.push("Economic Buyer".to_string());
        }
        if executive_sponsor.is_some() {
            engagement_sequence.push("Executive Sponsor".to_string());
        }
        if engagement_sequence.len() >= 2 {
            engagement_readiness_score += 0.3;
        }

        let payload = BuyingCommittee {
            executive_sponsor,
            economic_buyer,
            technical_buyer,
            champion,
            user_buyers,
            technical_evaluators,
            committee_completeness_score,
            engagement_readiness_score: engagement_readiness_score.min(1.0),
            engagement_sequence,
        };

        let citation = fathom_core::citation_service::new_citation(
            fathom_types::SourceType::Manual,
            &format!("https://fathom-internal.test/committee/{domain}"),
            chrono::Utc::now(),
            None,
            None,
            0.8,
        )
        .map_err(|e| FathomError::Other(e.to_string()))?;

        Ok(success(
            self.id(),
            domain,
            ModulePayload::BuyingCommittee(payload),
            citation,
            Vec::new(),
            started,
        ))
    }
}
