//! The fifteen intelligence-enrichment modules, M01 through M15, plus the
//! registry that wires each to the adapters it needs.

mod m01_company_context;
mod m02_technology_stack;
mod m03_traffic_analysis;
mod m04_financial_profile;
mod m05_competitor_intelligence;
mod m06_hiring_signals;
mod m07_strategic_context;
mod m08_investor_intelligence;
mod m09_executive_intelligence;
mod m10_buying_committee;
mod m11_displacement_analysis;
mod m12_case_study_matching;
mod m13_icp_priority_mapping;
mod m14_signal_scoring;
mod m15_strategic_brief;
mod registry;
mod support;

pub use m01_company_context::CompanyContextModule;
pub use m02_technology_stack::TechnologyStackModule;
pub use m03_traffic_analysis::TrafficAnalysisModule;
pub use m04_financial_profile::FinancialProfileModule;
pub use m05_competitor_intelligence::CompetitorIntelligenceModule;
pub use m06_hiring_signals::HiringSignalsModule;
pub use m07_strategic_context::StrategicContextModule;
pub use m08_investor_intelligence::InvestorIntelligenceModule;
pub use m09_executive_intelligence::ExecutiveIntelligenceModule;
pub use m10_buying_committee::BuyingCommitteeModule;
pub use m11_displacement_analysis::DisplacementAnalysisModule;
pub use m12_case_study_matching::CaseStudyMatchingModule;
pub use m13_icp_priority_mapping::IcpPriorityMappingModule;
pub use m14_signal_scoring::SignalScoringModule;
pub use m15_strategic_brief::StrategicBriefModule;
pub use registry::ModuleRegistry;

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_adapters::AdapterRuntimeBuilder;
    use fathom_core::Module;

    #[test]
    fn registry_builds_all_fifteen_modules() {
        let adapters = AdapterRuntimeBuilder::new().build();
        let registry = ModuleRegistry::build(&adapters);
        for id in fathom_types::ModuleId::ALL {
            let module = registry.get(id);
            assert_eq!(module.id(), id);
        }
    }

    #[tokio::test]
    async fn m01_executes_against_live_adapters() {
        let adapters = AdapterRuntimeBuilder::new().build();
        let registry = ModuleRegistry::build(&adapters);
        let module = registry.get(fathom_types::ModuleId::M01CompanyContext);
        let context = std::collections::HashMap::new();
        let result = module.execute("costco.com", &context, false).await.unwrap();
        assert!(result.is_success());
        assert!(result.primary_citation.is_some());
    }
}
