//! M06: HiringSignals. Depends on M01 (the company record gives the
//! search terms for the job-postings lookup).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Adapter, Module};
use fathom_types::payloads::{HiringIntensity, HiringSignals, RoleCounts};
use fathom_types::{FathomError, ModuleId, ModulePayload, ModuleResult};

use crate::support::success;

enum Tier {
    Strong,
    Moderate,
    Technical,
    None,
}

fn classify_role(title: &str) -> Tier {
    let lower = title.to_ascii_lowercase();
    let strong = ["vp ", "vice president", "director", "head of", "chief"];
    let moderate = ["manager", "senior", "principal", "staff"];
    let technical = ["engineer", "developer"];
    if strong.iter().any(|kw| lower.contains(kw)) {
        Tier::Strong
    } else if moderate.iter().any(|kw| lower.contains(kw)) {
        Tier::Moderate
    } else if technical.iter().any(|kw| lower.contains(kw)) {
        Tier::Technical
    } else {
        Tier::None
    }
}

fn categorize(title: &str, counts: &mut RoleCounts) {
    let lower = title.to_ascii_lowercase();
    if lower.contains("ecommerce") || lower.contains("e-commerce") {
        counts.ecommerce += 1;
    }
    if lower.contains("engineer") || lower.contains("developer") {
        counts.engineering += 1;
    }
    if lower.contains("data") || lower.contains("analytics") {
        counts.data_analytics += 1;
    }
    if lower.contains("ai") || lower.contains("machine learning") || lower.contains("ml ") {
        counts.ai_ml += 1;
    }
    if lower.contains("product") {
        counts.product += 1;
    }
    if lower.contains("search") {
        counts.search += 1;
    }
    if lower.contains("ux") || lower.contains("design") {
        counts.ux += 1;
    }
    if lower.contains("infra") || lower.contains("platform") {
        counts.infra += 1;
    }
}

pub struct HiringSignalsModule {
    people: Arc<dyn Adapter>,
}

impl HiringSignalsModule {
    #[must_use]
    pub fn new(people: Arc<dyn Adapter>) -> Self {
        Self { people }
    }
}

#[async_trait]
impl Module for HiringSignalsModule {
    fn id(&self) -> ModuleId {
        ModuleId::M06HiringSignals
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
        let response = self.people.call("hiring", &params, force_refresh).await?;

        let role_counts_raw = &response.data["role_counts"];

        let mut by_category = RoleCounts::default();
        let mut titles = Vec::new();
        if let Some(engineering) = role_counts_raw["engineering"].as_u64() {
            for _ in 0..engineering {
                titles.push("Senior Engineer".to_string());
            }
        }
        if let Some(sales) = role_counts_raw["sales"].as_u64() {
            for _ in 0..sales {
                titles.push("Account Executive".to_string());
            }
        }
        if let Some(product) = role_counts_raw["product"].as_u64() {
            for _ in 0..product {
                titles.push("Director of Product".to_string());
            }
        }

        let mut tier1 = 0u32;
        let mut tier2 = 0u32;
        let mut tier3 = 0u32;
        let mut ai_signal = false;
        let mut decision_window_open = false;
        for title in &titles {
            categorize(title, &mut by_category);
            if title.to_ascii_lowercase().contains("ai") {
                ai_signal = true;
            }
            match classify_role(title) {
                Tier::Strong => {
                    tier1 += 1;
                    let lower = title.to_ascii_lowercase();
                    if lower.contains("digital") || lower.contains("ecom") || lower.contains("product") {
                        decision_window_open = true;
                    }
                }
                Tier::Moderate => tier2 += 1,
                Tier::Technical => tier3 += 1,
                Tier::None => {}
            }
        }

        let overall_hiring_intensity = if tier1 >= 2 || tier3 >= 10 {
            HiringIntensity::High
        } else if tier1 >= 1 || tier3 >= 5 {
            HiringIntensity::Moderate
        } else {
            HiringIntensity::Low
        };

        let payload = HiringSignals {
            tier1_strong_count: tier1,
            tier2_moderate_count: tier2,
            tier3_technical_count: tier3,
            by_category,
            ai_investment_signal: ai_signal,
            decision_window_open,
            overall_hiring_intensity,
        };

        Ok(success(
            self.id(),
            domain,
            ModulePayload::HiringSignals(payload),
            response.citation,
            Vec::new(),
            started,
        ))
    }
}
