//! Module identity, per-module result envelope, and job/batch envelopes.
//!
//! `ModulePayload` is a sum type over the fifteen concrete per-module
//! output shapes, so each module's result is statically typed rather than
//! a free-form string-keyed map.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::citation::SourceCitation;

/// One of the fifteen fixed intelligence modules, identified the way the
/// wire format and persisted records name them (`mNN_<name>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleId {
    M01CompanyContext,
    M02TechnologyStack,
    M03TrafficAnalysis,
    M04FinancialProfile,
    M05CompetitorIntelligence,
    M06HiringSignals,
    M07StrategicContext,
    M08InvestorIntelligence,
    M09ExecutiveIntelligence,
    M10BuyingCommittee,
    M11DisplacementAnalysis,
    M12CaseStudyMatching,
    M13IcpPriorityMapping,
    M14SignalScoring,
    M15StrategicBrief,
}

impl ModuleId {
    /// All fifteen modules in a fixed, stable order (wave order, then
    /// declaration order within a wave). Used by the registry's
    /// completeness assertion and by `JobSpec::default_modules`.
    pub const ALL: [Self; 15] = [
        Self::M01CompanyContext,
        Self::M02TechnologyStack,
        Self::M03TrafficAnalysis,
        Self::M04FinancialProfile,
        Self::M05CompetitorIntelligence,
        Self::M06HiringSignals,
        Self::M07StrategicContext,
        Self::M08InvestorIntelligence,
        Self::M09ExecutiveIntelligence,
        Self::M10BuyingCommittee,
        Self::M11DisplacementAnalysis,
        Self::M12CaseStudyMatching,
        Self::M13IcpPriorityMapping,
        Self::M14SignalScoring,
        Self::M15StrategicBrief,
    ];

    /// Canonical `mNN_<name>` wire identifier.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::M01CompanyContext => "m01_company_context",
            Self::M02TechnologyStack => "m02_technology_stack",
            Self::M03TrafficAnalysis => "m03_traffic_analysis",
            Self::M04FinancialProfile => "m04_financial_profile",
            Self::M05CompetitorIntelligence => "m05_competitor_intelligence",
            Self::M06HiringSignals => "m06_hiring_signals",
            Self::M07StrategicContext => "m07_strategic_context",
            Self::M08InvestorIntelligence => "m08_investor_intelligence",
            Self::M09ExecutiveIntelligence => "m09_executive_intelligence",
            Self::M10BuyingCommittee => "m10_buying_committee",
            Self::M11DisplacementAnalysis => "m11_displacement_analysis",
            Self::M12CaseStudyMatching => "m12_case_study_matching",
            Self::M13IcpPriorityMapping => "m13_icp_priority_mapping",
            Self::M14SignalScoring => "m14_signal_scoring",
            Self::M15StrategicBrief => "m15_strategic_brief",
        }
    }

    /// Parse a wire identifier back into a `ModuleId`.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.slug() == slug)
    }

    /// Declared hard prerequisites, per the wave DAG. An empty slice means
    /// no prerequisite (eligible for wave 1).
    #[must_use]
    pub const fn depends_on(self) -> &'static [Self] {
        match self {
            Self::M01CompanyContext
            | Self::M02TechnologyStack
            | Self::M03TrafficAnalysis
            | Self::M04FinancialProfile => &[],
            Self::M05CompetitorIntelligence => {
                &[Self::M01CompanyContext, Self::M02TechnologyStack]
            }
            Self::M06HiringSignals => &[Self::M01CompanyContext],
            Self::M07StrategicContext => &[Self::M01CompanyContext],
            Self::M08InvestorIntelligence => &[Self::M01CompanyContext, Self::M04FinancialProfile],
            Self::M09ExecutiveIntelligence => {
                &[Self::M01CompanyContext, Self::M07StrategicContext]
            }
            Self::M10BuyingCommittee => &[
                Self::M01CompanyContext,
                Self::M06HiringSignals,
                Self::M09ExecutiveIntelligence,
            ],
            Self::M11DisplacementAnalysis => {
                &[Self::M02TechnologyStack, Self::M05CompetitorIntelligence]
            }
            Self::M12CaseStudyMatching => &[Self::M01CompanyContext, Self::M02TechnologyStack],
            Self::M13IcpPriorityMapping => &[
                Self::M01CompanyContext,
                Self::M02TechnologyStack,
                Self::M03TrafficAnalysis,
                Self::M04FinancialProfile,
                Self::M05CompetitorIntelligence,
            ],
            Self::M14SignalScoring => &[
                Self::M06HiringSignals,
                Self::M07StrategicContext,
                Self::M08InvestorIntelligence,
            ],
            // "Depends on ALL" is expanded explicitly at the type level so the
            // graph stays a DAG by construction; `WaveDefinitions` additionally
            // asserts this equals `ModuleId::ALL` minus M15 itself.
            Self::M15StrategicBrief => &[
                Self::M01CompanyContext,
                Self::M02TechnologyStack,
                Self::M03TrafficAnalysis,
                Self::M04FinancialProfile,
                Self::M05CompetitorIntelligence,
                Self::M06HiringSignals,
                Self::M07StrategicContext,
                Self::M08InvestorIntelligence,
                Self::M09ExecutiveIntelligence,
                Self::M10BuyingCommittee,
                Self::M11DisplacementAnalysis,
                Self::M12CaseStudyMatching,
                Self::M13IcpPriorityMapping,
                Self::M14SignalScoring,
            ],
        }
    }
}

/// Lifecycle status of one module's execution within a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
    Timeout,
}

/// Per-module typed payload. One variant per module; the scheduler never
/// constructs these, modules do, and `EnrichmentResult::results` stores
/// them keyed by `ModuleId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModulePayload {
    CompanyContext(crate::payloads::CompanyContext),
    TechnologyStack(crate::payloads::TechnologyStack),
    TrafficAnalysis(crate::payloads::TrafficAnalysis),
    FinancialProfile(crate::payloads::FinancialProfile),
    CompetitorIntelligence(crate::payloads::CompetitorIntelligence),
    HiringSignals(crate::payloads::HiringSignals),
    StrategicContext(crate::payloads::StrategicContext),
    InvestorIntelligence(crate::payloads::InvestorIntelligence),
    ExecutiveIntelligence(crate::payloads::ExecutiveIntelligence),
    BuyingCommittee(crate::payloads::BuyingCommittee),
    DisplacementAnalysis(crate::payloads::DisplacementAnalysis),
    CaseStudyMatching(crate::payloads::CaseStudyMatching),
    IcpPriorityMapping(crate::payloads::IcpPriorityMapping),
    SignalScoring(crate::payloads::SignalScoring),
    StrategicBrief(crate::payloads::StrategicBrief),
}

impl ModulePayload {
    /// The module that produced this payload, used by the scheduler to
    /// validate a module returned the variant matching its own identity.
    #[must_use]
    pub const fn module_id(&self) -> ModuleId {
        match self {
            Self::CompanyContext(_) => ModuleId::M01CompanyContext,
            Self::TechnologyStack(_) => ModuleId::M02TechnologyStack,
            Self::TrafficAnalysis(_) => ModuleId::M03TrafficAnalysis,
            Self::FinancialProfile(_) => ModuleId::M04FinancialProfile,
            Self::CompetitorIntelligence(_) => ModuleId::M05CompetitorIntelligence,
            Self::HiringSignals(_) => ModuleId::M06HiringSignals,
            Self::StrategicContext(_) => ModuleId::M07StrategicContext,
            Self::InvestorIntelligence(_) => ModuleId::M08InvestorIntelligence,
            Self::ExecutiveIntelligence(_) => ModuleId::M09ExecutiveIntelligence,
            Self::BuyingCommittee(_) => ModuleId::M10BuyingCommittee,
            Self::DisplacementAnalysis(_) => ModuleId::M11DisplacementAnalysis,
            Self::CaseStudyMatching(_) => ModuleId::M12CaseStudyMatching,
            Self::IcpPriorityMapping(_) => ModuleId::M13IcpPriorityMapping,
            Self::SignalScoring(_) => ModuleId::M14SignalScoring,
            Self::StrategicBrief(_) => ModuleId::M15StrategicBrief,
        }
    }
}

/// The per-module output envelope every module execution produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleResult {
    pub module_id: ModuleId,
    pub domain: String,
    pub status: ModuleStatus,
    pub data: Option<ModulePayload>,
    pub primary_citation: Option<SourceCitation>,
    pub supporting_citations: Vec<SourceCitation>,
    pub executed_at: chrono::DateTime<chrono::Utc>,
    pub duration_ms: u64,
    pub cached: bool,
    pub error_message: Option<String>,
    pub error_type: Option<String>,
}

impl ModuleResult {
    #[must_use]
    pub fn skipped(
        module_id: ModuleId,
        domain: impl Into<String>,
        reason: impl Into<String>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            module_id,
            domain: domain.into(),
            status: ModuleStatus::Skipped,
            data: None,
            primary_citation: None,
            supporting_citations: Vec::new(),
            executed_at: now,
            duration_ms: 0,
            cached: false,
            error_message: Some(reason.into()),
            error_type: Some("DependencyNotMet".to_string()),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, ModuleStatus::Success)
    }
}

/// Inputs to one enrichment execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    pub domain: String,
    pub modules: Option<Vec<ModuleId>>,
    pub force_refresh: bool,
    pub priority: u8,
}

impl JobSpec {
    /// Normalize a bare domain into a job requesting every module at
    /// default priority. Domain canonicalization (lowercasing, stripping
    /// a leading `www.` and scheme) happens here so every downstream
    /// consumer sees a consistent key.
    #[must_use]
    pub fn new(domain: impl AsRef<str>) -> Self {
        Self {
            domain: Self::canonicalize(domain.as_ref()),
            modules: None,
            force_refresh: false,
            priority: 5,
        }
    }

    #[must_use]
    pub fn canonicalize(domain: &str) -> String {
        let d = domain.trim().to_ascii_lowercase();
        let d = d
            .strip_prefix("https://")
            .or_else(|| d.strip_prefix("http://"))
            .unwrap_or(&d);
        let d = d.strip_prefix("www.").unwrap_or(d);
        d.trim_end_matches('/').to_string()
    }

    #[must_use]
    pub fn modules_or_default(&self) -> Vec<ModuleId> {
        self.modules.clone().unwrap_or_else(|| ModuleId::ALL.to_vec())
    }
}

/// Aggregated outcome of one wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveStatus {
    Completed,
    Partial,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveResult {
    pub wave_number: u8,
    pub status: WaveStatus,
    pub module_ids: Vec<ModuleId>,
    pub duration: Duration,
}

/// Overall job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Partial,
    Failed,
    Cancelled,
}

/// The job envelope returned by `orchestrate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub job_id: uuid::Uuid,
    pub domain: String,
    pub status: JobStatus,
    pub waves: Vec<WaveResult>,
    pub completed_modules: Vec<ModuleId>,
    pub failed_modules: Vec<ModuleId>,
    pub skipped_modules: Vec<ModuleId>,
    pub results: HashMap<ModuleId, ModuleResult>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    pub errors: Vec<String>,
    pub api_call_count: u64,
    pub retry_count: u64,
}

impl EnrichmentResult {
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let completed = self.completed_modules.len();
        let denom = completed + self.failed_modules.len() + self.skipped_modules.len();
        if denom == 0 {
            0.0
        } else {
            completed as f64 / denom as f64
        }
    }

    #[must_use]
    pub const fn has_partial_results(&self) -> bool {
        !self.completed_modules.is_empty()
    }
}
