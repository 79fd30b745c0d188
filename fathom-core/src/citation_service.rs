//! Free functions operating on `fathom_types::citation` shapes: the single
//! public operation set (`new_citation`/`cache_citation`/`classify`/
//! `validate`) every module and adapter goes through rather than
//! constructing or inspecting citations by hand.

use chrono::{DateTime, Utc};
use fathom_types::{
    CitationError, FreshnessPolicy, FreshnessStatus, SourceCitation, SourceType, ValidationResult,
};

/// Construct a new citation at the point a value is retrieved from a
/// vendor. `now` is passed explicitly so call sites (and tests) control the
/// clock rather than reaching for a global.
pub fn new_citation(
    source_type: SourceType,
    source_url: &str,
    now: DateTime<Utc>,
    api_endpoint: Option<String>,
    api_version: Option<String>,
    confidence_score: f64,
) -> Result<SourceCitation, CitationError> {
    SourceCitation::new(
        source_type,
        source_url,
        now,
        api_endpoint,
        api_version,
        confidence_score,
    )
}

/// Wrap a citation retrieved from cache, preserving the original source
/// type/url/confidence under `original_citation`.
#[must_use]
pub fn cache_citation(original: SourceCitation, cache_key: String, now: DateTime<Utc>) -> SourceCitation {
    original.into_cache_wrapped(cache_key, now)
}

/// Classify a citation's freshness against `policy`, applying the clock-skew
/// tolerance uniformly (see DESIGN.md's Open Question decision). This is the
/// single place freshness is computed; nothing else in the workspace reads
/// `age_days` directly to make a freshness decision.
#[must_use]
pub fn classify(
    citation: &SourceCitation,
    policy: &FreshnessPolicy,
    now: DateTime<Utc>,
) -> FreshnessStatus {
    policy.classify_age(citation.source_type, citation.age_days(now))
}

/// Validate a batch of citations (as collected for an `EnrichmentResult` or
/// a `StrategicBrief`'s bibliography): structural soundness plus freshness
/// tally.
#[must_use]
pub fn validate(citations: &[SourceCitation], policy: &FreshnessPolicy, now: DateTime<Utc>) -> ValidationResult {
    let mut result = ValidationResult {
        is_valid: true,
        ..ValidationResult::default()
    };
    for citation in citations {
        if !citation.is_structurally_valid() {
            result.is_valid = false;
            result.errors.push(format!(
                "citation for {} is structurally invalid",
                citation.source_url
            ));
            continue;
        }
        match classify(citation, policy, now) {
            FreshnessStatus::Fresh => result.fresh_count += 1,
            FreshnessStatus::Stale => {
                result.stale_count += 1;
                result
                    .warnings
                    .push(format!("citation for {} is stale", citation.source_url));
            }
            FreshnessStatus::Expired => {
                result.expired_count += 1;
                result.is_valid = false;
                result
                    .errors
                    .push(format!("citation for {} is expired", citation.source_url));
            }
            FreshnessStatus::Unknown => result.unknown_count += 1,
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn citation_aged(days: f64, source_type: SourceType, now: DateTime<Utc>) -> SourceCitation {
        let retrieved_at = now - ChronoDuration::milliseconds((days * 86_400_000.0) as i64);
        SourceCitation::new(
            source_type,
            "https://example.com/api",
            retrieved_at,
            None,
            None,
            0.9,
        )
        .unwrap()
    }

    #[test]
    fn fresh_finance_citation_classifies_fresh() {
        let now = Utc::now();
        let policy = FreshnessPolicy::defaults();
        let citation = citation_aged(0.1, SourceType::Finance, now);
        assert_eq!(classify(&citation, &policy, now), FreshnessStatus::Fresh);
    }

    #[test]
    fn old_finance_citation_classifies_expired() {
        let now = Utc::now();
        let policy = FreshnessPolicy::defaults();
        let citation = citation_aged(60.0, SourceType::Finance, now);
        assert_eq!(classify(&citation, &policy, now), FreshnessStatus::Expired);
    }

    #[test]
    fn validate_flags_expired_as_invalid() {
        let now = Utc::now();
        let policy = FreshnessPolicy::defaults();
        let citations = vec![citation_aged(60.0, SourceType::Finance, now)];
        let result = validate(&citations, &policy, now);
        assert!(!result.is_valid);
        assert_eq!(result.expired_count, 1);
    }

    #[test]
    fn cache_wrap_preserves_original() {
        let now = Utc::now();
        let original = citation_aged(1.0, SourceType::Traffic, now);
        let original_type = original.source_type;
        let wrapped = cache_citation(original, "abc123".to_string(), now);
        assert_eq!(wrapped.source_type, SourceType::Cache);
        assert_eq!(
            wrapped.original_citation.as_ref().unwrap().source_type,
            original_type
        );
    }

    #[test]
    fn freshness_policy_windows_are_monotonic() {
        assert!(FreshnessPolicy::defaults().is_monotonic());
    }

    proptest::proptest! {
        #[test]
        fn confidence_score_outside_unit_interval_is_always_rejected(score in proptest::prelude::any::<f64>()) {
            let now = Utc::now();
            let result = new_citation(SourceType::Finance, "https://example.com/api", now, None, None, score);
            if (0.0..=1.0).contains(&score) {
                proptest::prop_assert!(result.is_ok());
            } else {
                proptest::prop_assert!(result.is_err());
            }
        }

        #[test]
        fn classify_is_deterministic_for_a_fixed_age(age_days in 0.0f64..400.0) {
            let now = Utc::now();
            let policy = FreshnessPolicy::defaults();
            let citation = citation_aged(age_days, SourceType::Finance, now);
            let first = classify(&citation, &policy, now);
            let second = classify(&citation, &policy, now);
            proptest::prop_assert_eq!(first, second);
        }

        #[test]
        fn cache_wrapped_citation_is_never_doubly_wrapped(age_days in 0.0f64..30.0) {
            let now = Utc::now();
            let original = citation_aged(age_days, SourceType::WebSearch, now);
            let wrapped = cache_citation(original, "k".to_string(), now);
            proptest::prop_assert!(wrapped.is_structurally_valid());
            proptest::prop_assert_ne!(
                wrapped.original_citation.as_ref().unwrap().source_type,
                SourceType::Cache
            );
        }
    }
}
