//! M03: TrafficAnalysis. No declared dependencies.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Adapter, Module};
use fathom_types::payloads::{GeographyShare, SourceMix, TrafficAnalysis, TrafficTier};
use fathom_types::{FathomError, ModuleId, ModulePayload};

use crate::support::success;

fn classify_tier(monthly_visits: u64) -> (TrafficTier, u8) {
    match monthly_visits {
        v if v >= 50_000_000 => (TrafficTier::Over50m, 30),
        v if v >= 10_000_000 => (TrafficTier::From10mTo50m, 25),
        v if v >= 1_000_000 => (TrafficTier::From1mTo10m, 15),
        v if v >= 100_000 => (TrafficTier::From100kTo1m, 10),
        _ => (TrafficTier::Under100k, 5),
    }
}

pub struct TrafficAnalysisModule {
    traffic: Arc<dyn Adapter>,
}

impl TrafficAnalysisModule {
    #[must_use]
    pub fn new(traffic: Arc<dyn Adapter>) -> Self {
        Self { traffic }
    }
}

#[async_trait]
impl Module for TrafficAnalysisModule {
    fn id(&self) -> ModuleId {
        ModuleId::M03TrafficAnalysis
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
        let response = self.traffic.call("estimate", &params, force_refresh).await?;

        let monthly_visits = response.data["monthly_visits"].as_u64().unwrap_or(0);
        let top_geography: Vec<GeographyShare> = response.data["top_geographies"]
            .as_array()
            .into_iter()
            .flatten()
            .map(|g| GeographyShare {
                country: g["country"].as_str().unwrap_or_default().to_string(),
                share: g["share"].as_f64().unwrap_or(0.0),
            })
            .collect();

        let (traffic_tier, icp_score_contribution) = classify_tier(monthly_visits);

        let payload = TrafficAnalysis {
            monthly_visits,
            bounce_rate: response.data["bounce_rate"].as_f64().unwrap_or(0.0),
            pages_per_visit: response.data["pages_per_visit"].as_f64().unwrap_or(0.0),
            avg_duration_seconds: response.data["avg_duration_seconds"].as_f64().unwrap_or(0.0),
            mobile_share: response.data["mobile_share"].as_f64().unwrap_or(0.0),
            mom_trend: response.data["mom_trend"].as_f64().unwrap_or(0.0),
            yoy_trend: response.data["visit_trend_pct_90d"].as_f64().unwrap_or(0.0),
            source_mix: SourceMix::default(),
            top_geography,
            top_keywords: Vec::new(),
            global_rank: None,
            traffic_tier,
            icp_score_contribution,
        };

        Ok(success(
            self.id(),
            domain,
            ModulePayload::TrafficAnalysis(payload),
            response.citation,
            Vec::new(),
            started,
        ))
    }
}
