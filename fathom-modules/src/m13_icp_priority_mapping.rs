//! M13: IcpPriorityMapping. Depends on M01, M02, M03, M04, M05. Composite
//! lead score in [0,100], weighted 40/30/20/10 across vertical tier,
//! traffic volume, tech spend, and partner tech.

use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Module};
use fathom_types::payloads::{
    IcpPriorityMapping, IcpTier, PriorityStatus, ScoreBreakdown, TechSpendTier, Vertical,
};
use fathom_types::{FathomError, ModuleId, ModulePayload, ModuleResult};

use crate::support::success;

fn tier_for(vertical: Vertical) -> IcpTier {
    match vertical {
        Vertical::Commerce => IcpTier::Tier1Commerce,
        Vertical::Content => IcpTier::Tier2Content,
        Vertical::Support | Vertical::Other => IcpTier::Tier3Support,
    }
}

fn vertical_tier_points(tier: IcpTier) -> f64 {
    match tier {
        IcpTier::Tier1Commerce => 40.0,
        IcpTier::Tier2Content => 25.0,
        IcpTier::Tier3Support => 15.0,
    }
}

fn tech_spend_points(tier: TechSpendTier) -> f64 {
    match tier {
        TechSpendTier::Over100k => 20.0,
        TechSpendTier::From50to100k => 15.0,
        TechSpendTier::From25to50k => 10.0,
        TechSpendTier::From10to25k => 5.0,
        TechSpendTier::Under10k => 2.0,
        TechSpendTier::Unknown => 0.0,
    }
}

#[derive(Default)]
pub struct IcpPriorityMappingModule;

impl IcpPriorityMappingModule {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for IcpPriorityMappingModule {
    fn id(&self) -> ModuleId {
        ModuleId::M13IcpPriorityMapping
    }

    async fn execute(
        &self,
        domain: &str,
        context: &Context,
        _force_refresh: bool,
    ) -> Result<ModuleResult, FathomError> {
        self.dependencies_satisfied(context)?;
        let started = Instant::now();

        let vertical = match context.get(&ModuleId::M01CompanyContext).and_then(|r| r.data.as_ref()) {
            Some(ModulePayload::CompanyContext(c)) => c.vertical,
            _ => Vertical::Other,
        };
        let (tech_spend_tier, partner_count) = match context
            .get(&ModuleId::M02TechnologyStack)
            .and_then(|r| r.data.as_ref())
        {
            Some(ModulePayload::TechnologyStack(t)) => (t.tech_spend_tier, t.partner_technologies.len()),
            _ => (TechSpendTier::Unknown, 0),
        };
        let traffic_volume_points = match context.get(&ModuleId::M03TrafficAnalysis).and_then(|r| r.data.as_ref()) {
            Some(ModulePayload::TrafficAnalysis(t)) => f64::from(t.icp_score_contribution),
            _ => 0.0,
        };

        let tier = tier_for(vertical);
        let score_breakdown = ScoreBreakdown {
            vertical_tier: vertical_tier_points(tier),
            traffic_volume: traffic_volume_points,
            tech_spend: tech_spend_points(tech_spend_tier),
            partner_tech: (partner_count as f64 * 5.0).min(10.0),
        };
        let lead_score = score_breakdown.sum().clamp(0.0, 100.0);
        let priority_status = PriorityStatus::from_score(lead_score);

        let payload = IcpPriorityMapping {
            lead_score,
            tier,
            priority_status,
            score_breakdown,
        };

        let citation = fathom_core::citation_service::new_citation(
            fathom_types::SourceType::Manual,
            &format!("https://fathom-internal.test/icp/{domain}"),
            chrono::Utc::now(),
            None,
            None,
            0.85,
        )
        .map_err(|e| FathomError::Other(e.to_string()))?;

        Ok(success(
            self.id(),
            domain,
            ModulePayload::IcpPriorityMapping(payload),
            citation,
            Vec::new(),
            started,
        ))
    }

    fn validate_output(&self, result: &fathom_types::ModuleResult) -> Result<(), FathomError> {
        if result.status == fathom_types::ModuleStatus::Success && result.primary_citation.is_none() {
            return Err(FathomError::SourceCitationMissing);
        }
        if let Some(ModulePayload::IcpPriorityMapping(mapping)) = &result.data {
            if !(0.0..=100.0).contains(&mapping.lead_score) {
                return Err(FathomError::Other(format!(
                    "lead_score {} out of [0,100]",
                    mapping.lead_score
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest::proptest! {
        #[test]
        fn lead_score_never_exceeds_the_sum_of_its_components_before_clamping(
            vertical_tier in 0.0f64..40.0,
            traffic_volume in 0.0f64..30.0,
            tech_spend in 0.0f64..20.0,
            partner_tech in 0.0f64..10.0,
        ) {
            let breakdown = ScoreBreakdown { vertical_tier, traffic_volume, tech_spend, partner_tech };
            let lead_score = breakdown.sum().clamp(0.0, 100.0);
            proptest::prop_assert!((breakdown.sum() - lead_score).abs() < 1.0);
        }

        #[test]
        fn priority_banding_matches_the_documented_thresholds(score in 0.0f64..100.0) {
            let status = PriorityStatus::from_score(score);
            let expected = if score >= 80.0 {
                PriorityStatus::Hot
            } else if score >= 60.0 {
                PriorityStatus::Warm
            } else if score >= 40.0 {
                PriorityStatus::Cool
            } else {
                PriorityStatus::Cold
            };
            proptest::prop_assert_eq!(status, expected);
        }
    }
}
