//! Constructs a `Module` instance for every `ModuleId`, wiring each to the
//! adapters it needs out of a shared `AdapterRuntime`.

use std::sync::Arc;

use fathom_adapters::AdapterKind;
use fathom_core::Module;
use fathom_types::ModuleId;

use crate::{
    m01_company_context::CompanyContextModule, m02_technology_stack::TechnologyStackModule,
    m03_traffic_analysis::TrafficAnalysisModule, m04_financial_profile::FinancialProfileModule,
    m05_competitor_intelligence::CompetitorIntelligenceModule, m06_hiring_signals::HiringSignalsModule,
    m07_strategic_context::StrategicContextModule, m08_investor_intelligence::InvestorIntelligenceModule,
    m09_executive_intelligence::ExecutiveIntelligenceModule, m10_buying_committee::BuyingCommitteeModule,
    m11_displacement_analysis::DisplacementAnalysisModule, m12_case_study_matching::CaseStudyMatchingModule,
    m13_icp_priority_mapping::IcpPriorityMappingModule, m14_signal_scoring::SignalScoringModule,
    m15_strategic_brief::StrategicBriefModule,
};

/// All fifteen modules, constructed once per job against a shared
/// `AdapterRuntime`. Callers look a module up by `ModuleId` to execute it.
pub struct ModuleRegistry {
    modules: Vec<(ModuleId, Arc<dyn Module>)>,
}

impl ModuleRegistry {
    #[must_use]
    pub fn build(adapters: &fathom_adapters::AdapterRuntime) -> Self {
        let modules: Vec<(ModuleId, Arc<dyn Module>)> = vec![
            (
                ModuleId::M01CompanyContext,
                Arc::new(CompanyContextModule::new(
                    adapters.get(AdapterKind::WebSearch),
                    adapters.get(AdapterKind::Finance),
                )) as Arc<dyn Module>,
            ),
            (
                ModuleId::M02TechnologyStack,
                Arc::new(TechnologyStackModule::new(adapters.get(AdapterKind::TechFingerprint))),
            ),
            (
                ModuleId::M03TrafficAnalysis,
                Arc::new(TrafficAnalysisModule::new(adapters.get(AdapterKind::Traffic))),
            ),
            (
                ModuleId::M04FinancialProfile,
                Arc::new(FinancialProfileModule::new(adapters.get(AdapterKind::Finance))),
            ),
            (
                ModuleId::M05CompetitorIntelligence,
                Arc::new(CompetitorIntelligenceModule::new(
                    adapters.get(AdapterKind::WebSearch),
                    adapters.get(AdapterKind::TechFingerprint),
                )),
            ),
            (
                ModuleId::M06HiringSignals,
                Arc::new(HiringSignalsModule::new(adapters.get(AdapterKind::People))),
            ),
            (
                ModuleId::M07StrategicContext,
                Arc::new(StrategicContextModule::new(adapters.get(AdapterKind::WebSearch))),
            ),
            (
                ModuleId::M08InvestorIntelligence,
                Arc::new(InvestorIntelligenceModule::new(adapters.get(AdapterKind::Regulatory))),
            ),
            (
                ModuleId::M09ExecutiveIntelligence,
                Arc::new(ExecutiveIntelligenceModule::new(adapters.get(AdapterKind::People))),
            ),
            (ModuleId::M10BuyingCommittee, Arc::new(BuyingCommitteeModule::new())),
            (
                ModuleId::M11DisplacementAnalysis,
                Arc::new(DisplacementAnalysisModule::new()),
            ),
            (ModuleId::M12CaseStudyMatching, Arc::new(CaseStudyMatchingModule::new())),
            (ModuleId::M13IcpPriorityMapping, Arc::new(IcpPriorityMappingModule::new())),
            (ModuleId::M14SignalScoring, Arc::new(SignalScoringModule::new())),
            (ModuleId::M15StrategicBrief, Arc::new(StrategicBriefModule::new())),
        ];
        debug_assert_eq!(modules.len(), 15, "registry must hold exactly 15 modules");
        Self { modules }
    }

    #[must_use]
    pub fn get(&self, id: ModuleId) -> Arc<dyn Module> {
        self.modules
            .iter()
            .find(|(m, _)| *m == id)
            .map(|(_, module)| module.clone())
            .unwrap_or_else(|| unreachable!("every ModuleId is registered at build time"))
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ModuleId, Arc<dyn Module>)> {
        self.modules.iter()
    }
}
