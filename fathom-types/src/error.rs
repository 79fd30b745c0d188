use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error taxonomy for the fathom workspace.
///
/// Every fallible operation in the adapter runtime, module framework, and
/// wave scheduler returns one of these kinds. The scheduler never raises;
/// it converts adapter/module errors into `ModuleResult` status instead,
/// but still needs a concrete type to carry the reason.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq)]
#[non_exhaustive]
pub enum FathomError {
    /// The adapter's token bucket had no tokens available and the caller
    /// used the non-blocking `call` path.
    #[error("rate limit exceeded, wait {wait_ms}ms")]
    RateLimitExceeded {
        /// Milliseconds until a token becomes available.
        wait_ms: u64,
    },

    /// The adapter's circuit breaker is open for this resource.
    #[error("circuit open, recover in {recover_in_ms}ms")]
    CircuitOpen {
        /// Milliseconds until the breaker allows a half-open probe.
        recover_in_ms: u64,
    },

    /// All retry attempts for a call were exhausted.
    #[error("retry exhausted after {attempts} attempts: {last}")]
    RetryExhausted {
        /// Number of attempts made, including the first.
        attempts: u32,
        /// Human-readable description of the last failure.
        last: String,
    },

    /// The upstream vendor returned an error response.
    #[error("upstream error {status}: {body}")]
    UpstreamError {
        /// HTTP-ish status code (0 for transport-level failures).
        status: u16,
        /// Truncated response body, for diagnostics.
        body: String,
    },

    /// P0 violation: a parser produced output with no citation attached.
    #[error("source citation missing (P0 violation)")]
    SourceCitationMissing,

    /// Benign: the module ran but the underlying data does not exist.
    #[error("data not found: {0}")]
    DataNotFound(String),

    /// A module's declared dependency is absent or did not succeed.
    #[error("dependency not met: {0}")]
    DependencyNotMet(String),

    /// A per-call, per-module, or per-job deadline elapsed.
    #[error("timed out after {0}ms")]
    Timeout(u64),

    /// The caller cancelled the job. Not surfaced as a module failure.
    #[error("cancelled")]
    Cancelled,

    /// Invalid input argument to a public entry point.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Opaque/unexpected error, carrying the originating exception's tag.
    #[error("{0}")]
    Other(String),
}

impl FathomError {
    /// Short tag used as `ModuleResult::error_type` when a module fails.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::RateLimitExceeded { .. } => "RateLimitExceeded",
            Self::CircuitOpen { .. } => "CircuitOpen",
            Self::RetryExhausted { .. } => "RetryExhausted",
            Self::UpstreamError { .. } => "UpstreamError",
            Self::SourceCitationMissing => "SourceCitationMissing",
            Self::DataNotFound(_) => "DataNotFound",
            Self::DependencyNotMet(_) => "DependencyNotMet",
            Self::Timeout(_) => "Timeout",
            Self::Cancelled => "Cancelled",
            Self::InvalidArg(_) => "InvalidArg",
            Self::Other(_) => "Other",
        }
    }

    /// Whether this error kind is retryable at the adapter boundary.
    ///
    /// Transport-level errors, timeouts, and a fixed set of server status
    /// codes are retryable; everything else (including `SourceCitationMissing`,
    /// which must never be retried) is not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::UpstreamError { status, .. } => matches!(
                *status,
                0 | 429 | 500 | 502 | 503 | 504
            ),
            _ => false,
        }
    }

    /// True if this error is benign from the caller's perspective: the
    /// scheduler reflects it in `EnrichmentResult` without treating it as
    /// an actionable operational failure.
    #[must_use]
    pub const fn is_benign(&self) -> bool {
        matches!(self, Self::DataNotFound(_) | Self::DependencyNotMet(_))
    }
}
