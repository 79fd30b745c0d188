//! fathom-core
//!
//! The `Adapter`/`Module` trait surface and the resilience primitives
//! (token-bucket and sliding-window rate limiting, a three-state circuit
//! breaker, and the citation service) that the middleware and module
//! layers build on.
#![allow(missing_docs)]

/// The `Adapter` trait, `SourcedResponse`, and `AdapterMetrics`.
pub mod adapter;
/// Three-state circuit breaker and its per-adapter registry.
pub mod circuit_breaker;
/// Citation construction, freshness classification, and validation.
pub mod citation_service;
/// The `Module` trait and execution context.
pub mod module;
/// Token-bucket and sliding-window rate limiters and their registries.
pub mod rate_limiter;

pub use adapter::{Adapter, AdapterHealth, AdapterMetrics, SourcedResponse};
pub use circuit_breaker::{BreakerRegistry, CircuitBreaker, CircuitState};
pub use module::{Context, Module};
pub use rate_limiter::{LimiterRegistry, SlidingWindowLimiter, TokenBucket};
