//! Shared helpers every module's `execute` leans on: building a success
//! `ModuleResult` from a computed payload plus citation, and keyword
//! scoring used by several modules' classification rules.

use chrono::Utc;
use fathom_types::{ModuleId, ModulePayload, ModuleResult, ModuleStatus, SourceCitation};

pub fn success(
    module_id: ModuleId,
    domain: &str,
    payload: ModulePayload,
    primary_citation: SourceCitation,
    supporting_citations: Vec<SourceCitation>,
    started: std::time::Instant,
) -> ModuleResult {
    ModuleResult {
        module_id,
        domain: domain.to_string(),
        status: ModuleStatus::Success,
        data: Some(payload),
        primary_citation: Some(primary_citation),
        supporting_citations,
        executed_at: Utc::now(),
        duration_ms: started.elapsed().as_millis().try_into().unwrap_or(u64::MAX),
        cached: false,
        error_message: None,
        error_type: None,
    }
}

/// Score `text` against a keyword -> weight map, case-insensitively,
/// summing the weight of every keyword that appears as a substring.
pub fn keyword_score(text: &str, table: &[(&str, f64)]) -> f64 {
    let lower = text.to_ascii_lowercase();
    table
        .iter()
        .filter(|(kw, _)| lower.contains(kw))
        .map(|(_, weight)| weight)
        .sum()
}
