//! M14: SignalScoring. Depends on M06, M07, M08. M13 sits in the same wave
//! (wave 4) and is not yet in `context` when this executes, so `final` is
//! derived purely from this module's own adjusted composite rather than
//! blended with M13's actual lead score; `priority_status` reuses the same
//! banding function as M13 so the two stay numerically consistent without
//! a same-wave read.

use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Module};
use fathom_types::payloads::{CompositeScore, HiringIntensity, PriorityStatus, SearchPriorityLevel, SignalQuality, SignalScoring};
use fathom_types::{FathomError, ModuleId, ModulePayload, ModuleResult};

use crate::support::success;

fn budget_points(level: SearchPriorityLevel) -> f64 {
    match level {
        SearchPriorityLevel::High => 40.0,
        SearchPriorityLevel::Medium => 25.0,
        SearchPriorityLevel::Low => 10.0,
        SearchPriorityLevel::Unknown => 0.0,
    }
}

fn pain_points(intensity: HiringIntensity) -> f64 {
    match intensity {
        HiringIntensity::High => 40.0,
        HiringIntensity::Moderate => 20.0,
        HiringIntensity::Low => 5.0,
    }
}

#[derive(Default)]
pub struct SignalScoringModule;

impl SignalScoringModule {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for SignalScoringModule {
    fn id(&self) -> ModuleId {
        ModuleId::M14SignalScoring
    }

    async fn execute(
        &self,
        domain: &str,
        context: &Context,
        _force_refresh: bool,
    ) -> Result<ModuleResult, FathomError> {
        self.dependencies_satisfied(context)?;
        let started = Instant::now();

        let budget = match context.get(&ModuleId::M08InvestorIntelligence).and_then(|r| r.data.as_ref()) {
            Some(ModulePayload::InvestorIntelligence(i)) => budget_points(i.search_priority_level),
            _ => 0.0,
        };
        let pain = match context.get(&ModuleId::M06HiringSignals).and_then(|r| r.data.as_ref()) {
            Some(ModulePayload::HiringSignals(h)) => pain_points(h.overall_hiring_intensity),
            _ => 0.0,
        };
        let (timing, negative_signals) = match context
            .get(&ModuleId::M07StrategicContext)
            .and_then(|r| r.data.as_ref())
        {
            Some(ModulePayload::StrategicContext(s)) => (f64::from(s.timing_score).clamp(0.0, 100.0), s.caution_signals.len()),
            _ => (0.0, 0),
        };

        let negative = negative_signals as f64 * 10.0;
        let raw = budget + pain + timing;
        let adjusted = (raw - negative).clamp(0.0, 100.0);
        let r#final = adjusted;

        let priority_status = PriorityStatus::from_score(r#final);
        let has_all_three = budget > 0.0 && pain > 0.0 && timing > 0.0;

        let payload = SignalScoring {
            composite: CompositeScore { raw, adjusted, r#final },
            signal_quality: SignalQuality {
                budget,
                pain,
                timing,
                negative,
                has_all_three,
            },
            priority_status,
        };

        let citation = fathom_core::citation_service::new_citation(
            fathom_types::SourceType::Manual,
            &format!("https://fathom-internal.test/signal-scoring/{domain}"),
            chrono::Utc::now(),
            None,
            None,
            0.8,
        )
        .map_err(|e| FathomError::Other(e.to_string()))?;

        Ok(success(
            self.id(),
            domain,
            ModulePayload::SignalScoring(payload),
            citation,
            Vec::new(),
            started,
        ))
    }

    fn validate_output(&self, result: &ModuleResult) -> Result<(), FathomError> {
        if result.status == fathom_types::ModuleStatus::Success && result.primary_citation.is_none() {
            return Err(FathomError::SourceCitationMissing);
        }
        if let Some(ModulePayload::SignalScoring(scoring)) = &result.data {
            if !(0.0..=100.0).contains(&scoring.composite.r#final) {
                return Err(FathomError::Other(format!(
                    "composite.final {} out of [0,100]",
                    scoring.composite.r#final
                )));
            }
            if scoring.priority_status != PriorityStatus::from_score(scoring.composite.r#final) {
                return Err(FathomError::Other(
                    "priority_status does not match composite.final banding".to_string(),
                ));
            }
        }
        Ok(())
    }
}
