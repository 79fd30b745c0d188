//! M15: StrategicBrief. Alone in the final wave; every other module is a
//! hard dependency, so every read from `context` here is safe regardless
//! of which wave the source module nominally belongs to.

use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Module};
use fathom_types::payloads::{
    BusinessModel, ExecutiveQuote, MarginZone, StrategicBrief, Vertical,
};
use fathom_types::{FathomError, ModuleId, ModulePayload, ModuleResult};

use crate::support::success;

fn payload_of<'a>(context: &'a Context, id: ModuleId) -> Option<&'a ModulePayload> {
    context.get(&id).and_then(|r| r.data.as_ref())
}

#[derive(Default)]
pub struct StrategicBriefModule;

impl StrategicBriefModule {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for StrategicBriefModule {
    fn id(&self) -> ModuleId {
        ModuleId::M15StrategicBrief
    }

    async fn execute(
        &self,
        domain: &str,
        context: &Context,
        _force_refresh: bool,
    ) -> Result<ModuleResult, FathomError> {
        self.dependencies_satisfied(context)?;
        let started = Instant::now();

        let company = payload_of(context, ModuleId::M01CompanyContext);
        let tech = payload_of(context, ModuleId::M02TechnologyStack);
        let traffic = payload_of(context, ModuleId::M03TrafficAnalysis);
        let finance = payload_of(context, ModuleId::M04FinancialProfile);
        let competitors = payload_of(context, ModuleId::M05CompetitorIntelligence);
        let hiring = payload_of(context, ModuleId::M06HiringSignals);
        let strategic = payload_of(context, ModuleId::M07StrategicContext);
        let investor = payload_of(context, ModuleId::M08InvestorIntelligence);
        let executives = payload_of(context, ModuleId::M09ExecutiveIntelligence);
        let committee = payload_of(context, ModuleId::M10BuyingCommittee);
        let displacement = payload_of(context, ModuleId::M11DisplacementAnalysis);
        let case_studies = payload_of(context, ModuleId::M12CaseStudyMatching);
        let icp = payload_of(context, ModuleId::M13IcpPriorityMapping);
        let signals = payload_of(context, ModuleId::M14SignalScoring);

        let (name, vertical, business_model) = match company {
            Some(ModulePayload::CompanyContext(c)) => (
                c.name.clone(),
                c.vertical,
                c.business_model,
            ),
            _ => (domain.to_string(), Vertical::Other, BusinessModel::B2C),
        };

        let lead_score = match icp {
            Some(ModulePayload::IcpPriorityMapping(i)) => i.lead_score,
            _ => 0.0,
        };
        let traffic_tier_desc = match traffic {
            Some(ModulePayload::TrafficAnalysis(t)) => format!("{:?} monthly traffic ({} visits)", t.traffic_tier, t.monthly_visits),
            _ => "unknown traffic volume".to_string(),
        };

        let sixty_second_story = format!(
            "{name} is a {business_model:?} {vertical:?} business with {traffic_tier_desc}. Lead score {lead_score:.0}/100."
        );

        let mut timing_signals = Vec::new();
        if let Some(ModulePayload::StrategicContext(s)) = strategic {
            timing_signals.extend(s.initiatives.iter().cloned());
            timing_signals.extend(s.trigger_events.iter().cloned());
        }

        let mut quotes: Vec<ExecutiveQuote> = Vec::new();
        if let Some(ModulePayload::InvestorIntelligence(i)) = investor {
            quotes.extend(i.quotes.iter().cloned());
        }
        if let Some(ModulePayload::ExecutiveIntelligence(e)) = executives {
            for exec in &e.executives {
                for (_, quote) in &exec.quote_to_product_mapping {
                    quotes.push(ExecutiveQuote {
                        speaker_name: exec.name.clone(),
                        speaker_title: exec.title.clone(),
                        quote: quote.clone(),
                    });
                }
            }
        }

        let people_section = match committee {
            Some(ModulePayload::BuyingCommittee(c)) => {
                let champion = c.champion.as_ref().map(|e| e.name.as_str()).unwrap_or("no identified champion");
                let hiring_note = match hiring {
                    Some(ModulePayload::HiringSignals(h)) => format!("{:?} hiring intensity", h.overall_hiring_intensity),
                    _ => "hiring intensity unknown".to_string(),
                };
                format!(
                    "Committee completeness {:.0}%, champion: {champion}. {hiring_note}.",
                    c.committee_completeness_score * 100.0
                )
            }
            _ => "buying committee not resolved".to_string(),
        };

        let money_section = match finance {
            Some(ModulePayload::FinancialProfile(f)) => {
                if f.is_public {
                    format!(
                        "Public company, margin zone {:?}, est. e-commerce revenue ${:.0}, addressable search revenue ${:.0}.",
                        f.margin_zone,
                        f.ecommerce_revenue.unwrap_or(0.0),
                        f.addressable_search_revenue.unwrap_or(0.0)
                    )
                } else {
                    format!(
                        "Private company; financial profile limited ({}).",
                        f.data_limitation_reason.as_deref().unwrap_or("no public filings")
                    )
                }
            }
            _ => "financial profile unavailable".to_string(),
        };

        let mut gaps = Vec::new();
        for id in ModuleId::ALL {
            if id == ModuleId::M15StrategicBrief {
                continue;
            }
            if let Some(result) = context.get(&id) {
                if !result.is_success() {
                    gaps.push(format!(
                        "{}: {}",
                        id.slug(),
                        result.error_message.clone().unwrap_or_else(|| "incomplete".to_string())
                    ));
                }
            }
        }
        if let Some(ModulePayload::FinancialProfile(f)) = finance {
            if !f.is_public {
                if let Some(reason) = &f.data_limitation_reason {
                    gaps.push(format!("financials: {reason}"));
                }
            }
        }

        let competitive_landscape = match (competitors, displacement) {
            (Some(ModulePayload::CompetitorIntelligence(c)), Some(ModulePayload::DisplacementAnalysis(d))) => format!(
                "{} of {} tracked competitors use Algolia. Current provider: {:?}, displacement priority {:?}.",
                c.tally.algolia_users,
                c.competitors.len(),
                d.current_provider,
                d.displacement_priority
            ),
            _ => "competitive landscape not resolved".to_string(),
        };

        let best_case_study = match case_studies {
            Some(ModulePayload::CaseStudyMatching(m)) => m.matches.first().map(|c| c.case_study_id.clone()),
            _ => None,
        };
        let margin_note = match finance {
            Some(ModulePayload::FinancialProfile(f)) if f.margin_zone == MarginZone::Red => {
                " with margin pressure making a search-driven conversion lift the likely budget-owner argument"
            }
            _ => "",
        };
        let the_angle = format!(
            "Lead with {}{margin_note}.",
            best_case_study
                .map(|id| format!("the {id} case study"))
                .unwrap_or_else(|| "a first-principles displacement pitch".to_string())
        );

        let priority_note = match signals {
            Some(ModulePayload::SignalScoring(s)) => format!(" Signal priority: {:?}.", s.priority_status),
            _ => String::new(),
        };
        let the_angle = format!("{the_angle}{priority_note}");

        let mut sources_bibliography: Vec<String> = Vec::new();
        for id in ModuleId::ALL {
            if id == ModuleId::M15StrategicBrief {
                continue;
            }
            if let Some(result) = context.get(&id) {
                if let Some(citation) = &result.primary_citation {
                    sources_bibliography.push(citation.source_url.to_string());
                }
                for citation in &result.supporting_citations {
                    sources_bibliography.push(citation.source_url.to_string());
                }
            }
        }
        sources_bibliography.sort();
        sources_bibliography.dedup();

        let payload = StrategicBrief {
            sixty_second_story,
            timing_signals,
            quotes,
            people_section,
            money_section,
            gaps,
            competitive_landscape,
            the_angle,
            sources_bibliography,
        };

        let citation = fathom_core::citation_service::new_citation(
            fathom_types::SourceType::Manual,
            &format!("https://fathom-internal.test/brief/{domain}"),
            chrono::Utc::now(),
            None,
            None,
            0.7,
        )
        .map_err(|e| FathomError::Other(e.to_string()))?;

        let supporting: Vec<_> = ModuleId::ALL
            .into_iter()
            .filter(|&id| id != ModuleId::M15StrategicBrief)
            .filter_map(|id| context.get(&id).and_then(|r| r.primary_citation.clone()))
            .collect();

        Ok(success(
            self.id(),
            domain,
            ModulePayload::StrategicBrief(payload),
            citation,
            supporting,
            started,
        ))
    }
}
