//! Shared data transfer objects for the fathom intelligence-enrichment
//! engine: source citations, module identities and payloads, job/batch
//! envelopes, and engine configuration.
//!
//! This crate is deliberately inert: it defines shapes and the handful of
//! pure-data invariants that can be checked without I/O (confidence bounds,
//! freshness windows, the wave DAG). Behavior that needs a clock, a cache,
//! or a network call lives in `fathom-core` and above.

pub mod citation;
pub mod config;
pub mod error;
pub mod module;
pub mod payloads;
pub mod wave;

pub use citation::{
    CitationError, FreshnessPolicy, FreshnessStatus, MultiSourcedValue, SourceCitation,
    SourceType, SourcedValue, ValidationResult, CLOCK_SKEW_TOLERANCE_SECS,
};
pub use config::{BackoffConfig, CacheConfig, CircuitBreakerConfig, EngineConfig, RateLimiterConfig};
pub use error::FathomError;
pub use module::{
    EnrichmentResult, JobSpec, JobStatus, ModuleId, ModulePayload, ModuleResult, ModuleStatus,
    WaveResult, WaveStatus,
};
