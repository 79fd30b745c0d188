//! M07: StrategicContext. Depends on M01. Synthesizes initiatives and
//! trigger events from a news/press search, then scores timing against
//! what wave 1 has already settled (M02's displacement signal, M04's
//! margin zone). M05/M06 run in the same wave as M07 and are not yet in
//! `context` when this executes, so their signals are not available here
//! even though they touch similar timing themes; only the hard
//! dependency graph is load-bearing.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Adapter, Module};
use fathom_types::payloads::{
    DisplacementPriority, MarginZone, StrategicContext, TimingConfidence, TimingOverall,
};
use fathom_types::{FathomError, ModuleId, ModulePayload, ModuleResult};

use crate::support::success;

pub struct StrategicContextModule {
    web_search: Arc<dyn Adapter>,
}

impl StrategicContextModule {
    #[must_use]
    pub fn new(web_search: Arc<dyn Adapter>) -> Self {
        Self { web_search }
    }
}

#[async_trait]
impl Module for StrategicContextModule {
    fn id(&self) -> ModuleId {
        ModuleId::M07StrategicContext
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
        params.insert("q".to_string(), format!("{domain} strategic initiatives news"));
        let search = self.web_search.call("search", &params, force_refresh).await?;

        let initiatives: Vec<String> = search.data["results"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|r| r["title"].as_str())
            .map(str::to_string)
            .collect();
        let trigger_events = initiatives.clone();
        let caution_signals: Vec<String> = initiatives
            .iter()
            .filter(|t| {
                let lower = t.to_ascii_lowercase();
                lower.contains("lawsuit") || lower.contains("layoff") || lower.contains("recall")
            })
            .cloned()
            .collect();
        let ai_signal = initiatives
            .iter()
            .any(|t| t.to_ascii_lowercase().contains("ai"));

        let displacement_priority = context
            .get(&ModuleId::M02TechnologyStack)
            .and_then(|r| r.data.as_ref())
            .map(|p| match p {
                ModulePayload::TechnologyStack(t) => t.displacement_priority,
                _ => DisplacementPriority::Low,
            })
            .unwrap_or(DisplacementPriority::Low);
        let first_mover_signal = displacement_priority == DisplacementPriority::High;

        let red_margin = context
            .get(&ModuleId::M04FinancialProfile)
            .and_then(|r| r.data.as_ref())
            .map(|p| matches!(p, ModulePayload::FinancialProfile(f) if f.margin_zone == MarginZone::Red))
            .unwrap_or(false);

        let high_trigger_count = initiatives.len().min(3);

        let mut score: i32 = 50;
        score += 15 * i32::try_from(high_trigger_count).unwrap_or(0);
        if first_mover_signal {
            score += 10;
        }
        if ai_signal {
            score += 10;
        }
        if initiatives.len() >= 2 {
            score += 10;
        }
        score -= 10 * i32::try_from(caution_signals.len()).unwrap_or(0);
        if red_margin {
            score -= 10;
        }
        let score = score.clamp(0, 120);

        let timing_overall = match score {
            s if s >= 80 => TimingOverall::Excellent,
            s if s >= 60 => TimingOverall::Good,
            s if s >= 40 => TimingOverall::Neutral,
            _ => TimingOverall::Poor,
        };
        let timing_confidence = match score {
            s if s >= 60 => TimingConfidence::High,
            s if s >= 40 => TimingConfidence::Medium,
            _ => TimingConfidence::Low,
        };

        let synthesis = format!(
            "{domain} shows a {timing_overall:?} timing window (score {score}); {} recent initiative(s) tracked, displacement priority {displacement_priority:?}.",
            initiatives.len(),
        );

        let payload = StrategicContext {
            initiatives,
            trigger_events,
            caution_signals,
            timing_score: score,
            timing_overall,
            timing_confidence,
            synthesis,
        };

        Ok(success(
            self.id(),
            domain,
            ModulePayload::StrategicContext(payload),
            search.citation,
            Vec::new(),
            started,
        ))
    }
}
