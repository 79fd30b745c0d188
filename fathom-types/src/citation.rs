//! Source-citation & freshness model (the "P0 mandate").
//!
//! Every data value the engine produces carries one of these. The types
//! here are pure data; the operations that construct and classify them
//! live in `fathom_core::citation_service` so that `fathom-types` stays a
//! leaf crate with no behavior beyond validation at construction time.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Closed set of provenance categories a citation can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    TechFingerprint,
    Traffic,
    Finance,
    RegulatoryFilings,
    WebSearch,
    PeopleNetwork,
    CompanySite,
    Press,
    EarningsTranscript,
    InvestorPresentation,
    News,
    Manual,
    Cache,
}

impl SourceType {
    /// Short identifier used as the rate-limiter/circuit-breaker/cache
    /// registry key for the adapter fronting this source type.
    #[must_use]
    pub const fn adapter_name(self) -> &'static str {
        match self {
            Self::TechFingerprint => "tech_fingerprint",
            Self::Traffic => "traffic",
            Self::Finance => "finance",
            Self::RegulatoryFilings => "regulatory",
            Self::WebSearch => "web_search",
            Self::PeopleNetwork => "people",
            Self::CompanySite => "company_site",
            Self::Press => "press",
            Self::EarningsTranscript => "earnings_transcript",
            Self::InvestorPresentation => "investor_presentation",
            Self::News => "news",
            Self::Manual => "manual",
            Self::Cache => "cache",
        }
    }
}

/// Freshness classification derived from a citation's age and source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessStatus {
    Fresh,
    Stale,
    Expired,
    Unknown,
}

/// Per-`source_type` freshness windows, in days, with `fresh < stale <
/// expired`. Process-wide configuration, not per-citation state.
#[derive(Debug, Clone)]
pub struct FreshnessPolicy {
    windows: HashMap<SourceType, FreshnessWindow>,
}

#[derive(Debug, Clone, Copy)]
struct FreshnessWindow {
    fresh_days: f64,
    stale_days: f64,
    expired_days: f64,
}

/// 60-second clock-skew tolerance applied uniformly at classification time.
pub const CLOCK_SKEW_TOLERANCE_SECS: i64 = 60;

impl FreshnessPolicy {
    /// finance=1/7/30, traffic=7/30/90, tech-fingerprint=30/90/180,
    /// regulatory=90/180/365 days (fresh/stale/expired), with the remaining
    /// source types filled in at comparable tiers.
    #[must_use]
    pub fn defaults() -> Self {
        let mut windows = HashMap::new();
        let mut set = |st: SourceType, fresh: f64, stale: f64, expired: f64| {
            windows.insert(
                st,
                FreshnessWindow {
                    fresh_days: fresh,
                    stale_days: stale,
                    expired_days: expired,
                },
            );
        };
        set(SourceType::Finance, 1.0, 7.0, 30.0);
        set(SourceType::Traffic, 7.0, 30.0, 90.0);
        set(SourceType::TechFingerprint, 30.0, 90.0, 180.0);
        set(SourceType::RegulatoryFilings, 90.0, 180.0, 365.0);
        set(SourceType::EarningsTranscript, 90.0, 180.0, 365.0);
        set(SourceType::InvestorPresentation, 90.0, 180.0, 365.0);
        set(SourceType::Press, 30.0, 90.0, 365.0);
        set(SourceType::News, 30.0, 90.0, 365.0);
        set(SourceType::PeopleNetwork, 7.0, 30.0, 90.0);
        set(SourceType::CompanySite, 30.0, 90.0, 365.0);
        set(SourceType::WebSearch, 7.0, 30.0, 90.0);
        set(SourceType::Manual, 30.0, 90.0, 180.0);
        set(SourceType::Cache, 1.0, 7.0, 30.0);
        Self { windows }
    }

    /// Classify an age (in fractional days) for a source type. Returns
    /// `Unknown` if the source type has no policy entry.
    #[must_use]
    pub fn classify_age(&self, source_type: SourceType, age_days: f64) -> FreshnessStatus {
        let Some(w) = self.windows.get(&source_type) else {
            return FreshnessStatus::Unknown;
        };
        let tolerance_days = CLOCK_SKEW_TOLERANCE_SECS as f64 / 86_400.0;
        if age_days <= w.fresh_days + tolerance_days {
            FreshnessStatus::Fresh
        } else if age_days <= w.stale_days {
            FreshnessStatus::Stale
        } else {
            FreshnessStatus::Expired
        }
    }

    /// Verify `fresh_days < stale_days < expired_days` for every entry.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.windows
            .values()
            .all(|w| w.fresh_days < w.stale_days && w.stale_days < w.expired_days)
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::defaults()
    }
}

/// The atomic provenance record. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub source_type: SourceType,
    #[serde(with = "url_serde")]
    pub source_url: Url,
    pub retrieved_at: DateTime<Utc>,
    pub api_endpoint: Option<String>,
    pub api_version: Option<String>,
    pub cache_key: Option<String>,
    pub notes: Option<String>,
    pub confidence_score: f64,
    pub original_citation: Option<Box<SourceCitation>>,
}

mod url_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use url::Url;

    pub fn serialize<S: Serializer>(url: &Url, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(url.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Url, D::Error> {
        let raw = String::deserialize(d)?;
        Url::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Error constructing a `SourceCitation` at the system boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CitationError {
    #[error("invalid source url: {0}")]
    InvalidUrl(String),
    #[error("confidence_score {0} out of [0,1]")]
    ConfidenceOutOfRange(f64),
    #[error("cache citation must carry an original_citation with source_type != cache")]
    MissingOrNestedOriginal,
}

impl SourceCitation {
    /// Construct and validate a new citation. `retrieved_at` is the
    /// caller-supplied instant (normally "now"); kept explicit rather than
    /// defaulted so tests can control time deterministically.
    pub fn new(
        source_type: SourceType,
        source_url: &str,
        retrieved_at: DateTime<Utc>,
        api_endpoint: Option<String>,
        api_version: Option<String>,
        confidence_score: f64,
    ) -> Result<Self, CitationError> {
        let source_url =
            Url::parse(source_url).map_err(|e| CitationError::InvalidUrl(e.to_string()))?;
        if !source_url.has_host() {
            return Err(CitationError::InvalidUrl(source_url.into()));
        }
        if !(0.0..=1.0).contains(&confidence_score) {
            return Err(CitationError::ConfidenceOutOfRange(confidence_score));
        }
        Ok(Self {
            source_type,
            source_url,
            retrieved_at,
            api_endpoint,
            api_version,
            cache_key: None,
            notes: None,
            confidence_score,
            original_citation: None,
        })
    }

    /// Wrap an existing citation as a cache hit: `source_type` becomes
    /// `Cache`, `original_citation` preserves true origin, `retrieved_at`
    /// is the cache-hit instant.
    #[must_use]
    pub fn into_cache_wrapped(self, cache_key: String, retrieved_at: DateTime<Utc>) -> Self {
        let confidence_score = self.confidence_score;
        let source_url = self.source_url.clone();
        Self {
            source_type: SourceType::Cache,
            source_url,
            retrieved_at,
            api_endpoint: self.api_endpoint.clone(),
            api_version: self.api_version.clone(),
            cache_key: Some(cache_key),
            notes: Some(format!(
                "cached from {:?} at {}",
                self.source_type, self.retrieved_at
            )),
            confidence_score,
            original_citation: Some(Box::new(self)),
        }
    }

    /// Age in fractional days relative to `now`.
    #[must_use]
    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        (now - self.retrieved_at).num_milliseconds() as f64 / 86_400_000.0
    }

    /// Structural validity independent of freshness: confidence bounded,
    /// and if `cache`, carries a non-nested original.
    #[must_use]
    pub fn is_structurally_valid(&self) -> bool {
        let confidence_ok = (0.0..=1.0).contains(&self.confidence_score);
        let cache_ok = match self.source_type {
            SourceType::Cache => self
                .original_citation
                .as_ref()
                .is_some_and(|o| o.source_type != SourceType::Cache),
            _ => true,
        };
        confidence_ok && cache_ok
    }
}

/// A single value paired with its mandatory citation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcedValue<T> {
    pub value: T,
    pub citation: SourceCitation,
    pub field_name: Option<String>,
    pub unit: Option<String>,
}

impl<T> SourcedValue<T> {
    #[must_use]
    pub fn new(value: T, citation: SourceCitation) -> Self {
        Self {
            value,
            citation,
            field_name: None,
            unit: None,
        }
    }

    #[must_use]
    pub fn with_field(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// A value derived from multiple sources: one primary citation plus zero or
/// more supporting citations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiSourcedValue<T> {
    pub value: T,
    pub primary_citation: SourceCitation,
    pub supporting_citations: Vec<SourceCitation>,
    pub aggregation_method: String,
}

impl<T> MultiSourcedValue<T> {
    #[must_use]
    pub fn new(value: T, primary_citation: SourceCitation) -> Self {
        Self {
            value,
            primary_citation,
            supporting_citations: Vec::new(),
            aggregation_method: "primary_with_validation".to_string(),
        }
    }

    #[must_use]
    pub fn all_citations(&self) -> Vec<&SourceCitation> {
        std::iter::once(&self.primary_citation)
            .chain(self.supporting_citations.iter())
            .collect()
    }
}

/// Summary produced by `fathom_core::citation_service::validate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub fresh_count: usize,
    pub stale_count: usize,
    pub expired_count: usize,
    pub unknown_count: usize,
}
