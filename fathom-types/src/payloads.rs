//! Concrete per-module output shapes.
//!
//! One struct per module, referenced by `ModulePayload`. Field sets follow
//! the module semantics directly; enums encode the fixed classification
//! vocabularies (tiers, bands, statuses) each module must emit.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessModel {
    B2B,
    B2C,
    B2B2C,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vertical {
    Commerce,
    Content,
    Support,
    Other,
}

/// M01: from the bare domain, the base company record every later module
/// reads from `context`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyContext {
    pub name: String,
    pub ticker: Option<String>,
    pub exchange: Option<String>,
    pub headquarters: Option<String>,
    pub vertical: Vertical,
    pub sub_vertical: Option<String>,
    pub business_model: BusinessModel,
    pub employee_count: Option<u64>,
    pub store_count: Option<u64>,
    pub brands: Vec<String>,
    pub founded_year: Option<u16>,
    pub description: Option<String>,
    pub data_quality_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchProvider {
    Algolia,
    Competitor,
    NativePlatform,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplacementPriority {
    None,
    High,
    Medium,
    Low,
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechSpendTier {
    Over100k,
    From50to100k,
    From25to50k,
    From10to25k,
    Under10k,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedTechnology {
    pub name: String,
    pub category: String,
    pub confidence: f64,
    pub first_seen: Option<chrono::DateTime<chrono::Utc>>,
    pub last_seen: Option<chrono::DateTime<chrono::Utc>>,
}

/// M02: detected stack plus the derived search-provider/displacement facts
/// every later competitive-intelligence module depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnologyStack {
    pub technologies: Vec<DetectedTechnology>,
    pub search_provider: SearchProvider,
    pub has_algolia: bool,
    pub partner_technologies: Vec<String>,
    pub displacement_priority: DisplacementPriority,
    pub tech_spend_tier: TechSpendTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficTier {
    Over50m,
    From10mTo50m,
    From1mTo10m,
    From100kTo1m,
    Under100k,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMix {
    pub direct: f64,
    pub organic: f64,
    pub paid: f64,
    pub social: f64,
    pub referral: f64,
    pub email: f64,
    pub display: f64,
}

impl SourceMix {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.direct
            + self.organic
            + self.paid
            + self.social
            + self.referral
            + self.email
            + self.display
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeographyShare {
    pub country: String,
    pub share: f64,
}

/// M03: traffic volume/engagement/mix plus the ICP-relevant `traffic_tier`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficAnalysis {
    pub monthly_visits: u64,
    pub bounce_rate: f64,
    pub pages_per_visit: f64,
    pub avg_duration_seconds: f64,
    pub mobile_share: f64,
    pub mom_trend: f64,
    pub yoy_trend: f64,
    pub source_mix: SourceMix,
    pub top_geography: Vec<GeographyShare>,
    pub top_keywords: Vec<String>,
    pub global_rank: Option<u64>,
    pub traffic_tier: TrafficTier,
    pub icp_score_contribution: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginZone {
    Green,
    Yellow,
    Red,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiScenario {
    pub name: String,
    pub lift: f64,
    pub annual_impact: f64,
}

/// M04: financial profile. Private companies still emit this with
/// `is_public=false` and a populated `data_limitation_reason`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialProfile {
    pub is_public: bool,
    pub revenue_series: Vec<f64>,
    pub revenue_cagr: Option<f64>,
    pub net_income_series: Vec<f64>,
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub net_margin: Option<f64>,
    pub ebitda_margin: Option<f64>,
    pub margin_zone: MarginZone,
    pub latest_revenue: Option<f64>,
    pub ecommerce_share: Option<f64>,
    pub ecommerce_revenue: Option<f64>,
    pub addressable_search_revenue: Option<f64>,
    pub roi_scenarios: Vec<RoiScenario>,
    pub data_limitation_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitorTally {
    pub algolia_users: u32,
    pub constructor_users: u32,
    pub elasticsearch_users: u32,
    pub coveo_users: u32,
    pub native_users: u32,
    pub other_users: u32,
    pub unknown_users: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competitor {
    pub domain: String,
    pub search_provider: SearchProvider,
}

/// M05: competitive landscape and first-mover signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorIntelligence {
    pub competitors: Vec<Competitor>,
    pub tally: CompetitorTally,
    pub first_mover_opportunity: bool,
    pub positioning_statement: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiringIntensity {
    High,
    Moderate,
    Low,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleCounts {
    pub ecommerce: u32,
    pub engineering: u32,
    pub data_analytics: u32,
    pub ai_ml: u32,
    pub product: u32,
    pub search: u32,
    pub ux: u32,
    pub infra: u32,
}

/// M06: tiered hiring-signal classification of currently open roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiringSignals {
    pub tier1_strong_count: u32,
    pub tier2_moderate_count: u32,
    pub tier3_technical_count: u32,
    pub by_category: RoleCounts,
    pub ai_investment_signal: bool,
    pub decision_window_open: bool,
    pub overall_hiring_intensity: HiringIntensity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingOverall {
    Excellent,
    Good,
    Neutral,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingConfidence {
    High,
    Medium,
    Low,
}

/// M07: synthesized initiatives, triggers, caution signals, and the
/// derived timing assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategicContext {
    pub initiatives: Vec<String>,
    pub trigger_events: Vec<String>,
    pub caution_signals: Vec<String>,
    pub timing_score: i32,
    pub timing_overall: TimingOverall,
    pub timing_confidence: TimingConfidence,
    pub synthesis: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPriorityLevel {
    High,
    Medium,
    Low,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutiveQuote {
    pub speaker_name: String,
    pub speaker_title: String,
    pub quote: String,
}

/// M08: public-only filings/earnings extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorIntelligence {
    pub search_priority_level: SearchPriorityLevel,
    pub quotes: Vec<ExecutiveQuote>,
    pub commitments: Vec<String>,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyerRole {
    ExecutiveSponsor,
    EconomicBuyer,
    TechnicalBuyer,
    Champion,
    UserBuyer,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Executive {
    pub name: String,
    pub title: String,
    pub buyer_role: BuyerRole,
    pub tenure_months: Option<u32>,
    pub new_to_role: bool,
    pub quote_to_product_mapping: Vec<(String, String)>,
}

/// M09: executive profiles with buyer-role classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutiveIntelligence {
    pub executives: Vec<Executive>,
}

/// M10: buying committee projected from M09.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyingCommittee {
    pub executive_sponsor: Option<Executive>,
    pub economic_buyer: Option<Executive>,
    pub technical_buyer: Option<Executive>,
    pub champion: Option<Executive>,
    pub user_buyers: Vec<Executive>,
    pub technical_evaluators: Vec<Executive>,
    pub committee_completeness_score: f64,
    pub engagement_readiness_score: f64,
    pub engagement_sequence: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgoliaFitScore {
    pub technical: f64,
    pub business: f64,
    pub timing: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplacementDifficulty {
    Easy,
    Moderate,
    Hard,
    NotApplicable,
}

/// M11: current-provider classification and displacement/co-sell
/// opportunity assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplacementAnalysis {
    pub current_provider: SearchProvider,
    pub displacement_difficulty: DisplacementDifficulty,
    pub partner_cosell_opportunities: Vec<String>,
    pub algolia_fit_score: AlgoliaFitScore,
    pub displacement_priority: DisplacementPriority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseStudyMatch {
    pub case_study_id: String,
    pub score: f64,
    pub reason: String,
}

/// M12: internal case studies ranked against the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseStudyMatching {
    pub matches: Vec<CaseStudyMatch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IcpTier {
    Tier1Commerce,
    Tier2Content,
    Tier3Support,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityStatus {
    Hot,
    Warm,
    Cool,
    Cold,
}

impl PriorityStatus {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Hot
        } else if score >= 60.0 {
            Self::Warm
        } else if score >= 40.0 {
            Self::Cool
        } else {
            Self::Cold
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub vertical_tier: f64,
    pub traffic_volume: f64,
    pub tech_spend: f64,
    pub partner_tech: f64,
}

impl ScoreBreakdown {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.vertical_tier + self.traffic_volume + self.tech_spend + self.partner_tech
    }
}

/// M13: composite ICP lead score in `[0,100]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcpPriorityMapping {
    pub lead_score: f64,
    pub tier: IcpTier,
    pub priority_status: PriorityStatus,
    pub score_breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompositeScore {
    pub raw: f64,
    pub adjusted: f64,
    pub r#final: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalQuality {
    pub budget: f64,
    pub pain: f64,
    pub timing: f64,
    pub negative: f64,
    pub has_all_three: bool,
}

/// M14: aggregated budget/pain/timing/negative signal scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalScoring {
    pub composite: CompositeScore,
    pub signal_quality: SignalQuality,
    pub priority_status: PriorityStatus,
}

/// M15: the final synthesized brief. Depends on all other modules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategicBrief {
    pub sixty_second_story: String,
    pub timing_signals: Vec<String>,
    pub quotes: Vec<ExecutiveQuote>,
    pub people_section: String,
    pub money_section: String,
    pub gaps: Vec<String>,
    pub competitive_landscape: String,
    pub the_angle: String,
    pub sources_bibliography: Vec<String>,
}
