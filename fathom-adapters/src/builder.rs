//! `AdapterRuntimeBuilder`: constructs the six source adapters and wraps
//! each in the caching/rate-limiting/circuit-breaking/retry stack, sharing
//! one pair of limiter/breaker registries across all of them so state
//! persists across calls within a job and across jobs in a batch.

use std::collections::HashMap;
use std::sync::Arc;

use fathom_core::{Adapter, BreakerRegistry, LimiterRegistry};
use fathom_middleware::AdapterStack;
use fathom_types::{BackoffConfig, CacheConfig, CircuitBreakerConfig, RateLimiterConfig};

/// The six source-type adapter slots a `Module` can request by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    TechFingerprint,
    Traffic,
    Finance,
    Regulatory,
    WebSearch,
    People,
}

impl AdapterKind {
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::TechFingerprint,
            Self::Traffic,
            Self::Finance,
            Self::Regulatory,
            Self::WebSearch,
            Self::People,
        ]
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TechFingerprint => "tech_fingerprint",
            Self::Traffic => "traffic",
            Self::Finance => "finance",
            Self::Regulatory => "regulatory",
            Self::WebSearch => "web_search",
            Self::People => "people",
        }
    }

    fn raw_adapter(self) -> Arc<dyn Adapter> {
        match self {
            Self::TechFingerprint => Arc::new(crate::tech_fingerprint::new()),
            Self::Traffic => Arc::new(crate::traffic::new()),
            Self::Finance => Arc::new(crate::finance::new()),
            Self::Regulatory => Arc::new(crate::regulatory::new()),
            Self::WebSearch => Arc::new(crate::web_search::new()),
            Self::People => Arc::new(crate::people::new()),
        }
    }

    /// Rate-limiter and cache-TTL defaults from the per-source-type table.
    /// `People` is an extrapolation, not a table row (see `people.rs`).
    fn stack(self) -> AdapterStack {
        let (rate, ttl_days) = match self {
            Self::TechFingerprint => (RateLimiterConfig::TECH_FINGERPRINT, 30),
            Self::Traffic => (RateLimiterConfig::TRAFFIC, 7),
            Self::Finance => (RateLimiterConfig::FINANCE, 1),
            Self::Regulatory => (RateLimiterConfig::REGULATORY, 90),
            Self::WebSearch => (RateLimiterConfig::WEB_SEARCH, 7),
            Self::People => (RateLimiterConfig::PEOPLE, 14),
        };
        AdapterStack::new(
            rate,
            CircuitBreakerConfig::default(),
            CacheConfig {
                ttl_seconds: ttl_days * 86_400,
                ..CacheConfig::default()
            },
            BackoffConfig::default(),
        )
    }
}

/// Built adapter runtime: one fully-wrapped `Arc<dyn Adapter>` per kind,
/// keyed by name so modules can look theirs up without knowing the
/// concrete type.
pub struct AdapterRuntime {
    adapters: HashMap<&'static str, Arc<dyn Adapter>>,
}

impl AdapterRuntime {
    #[must_use]
    pub fn get(&self, kind: AdapterKind) -> Arc<dyn Adapter> {
        self.adapters
            .get(kind.name())
            .cloned()
            .unwrap_or_else(|| unreachable!("every AdapterKind is registered at build time"))
    }
}

#[derive(Default)]
pub struct AdapterRuntimeBuilder {
    limiters: Option<LimiterRegistry>,
    breakers: Option<BreakerRegistry>,
}

impl AdapterRuntimeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply shared registries instead of letting `build` create fresh
    /// ones, so multiple runtimes (e.g. in tests) can share rate-limit
    /// state deliberately.
    #[must_use]
    pub fn with_registries(mut self, limiters: LimiterRegistry, breakers: BreakerRegistry) -> Self {
        self.limiters = Some(limiters);
        self.breakers = Some(breakers);
        self
    }

    #[must_use]
    pub fn build(self) -> AdapterRuntime {
        let limiters = self.limiters.unwrap_or_default();
        let breakers = self.breakers.unwrap_or_default();
        let mut adapters = HashMap::with_capacity(6);
        for kind in AdapterKind::all() {
            let wrapped = kind.stack().wrap(kind.raw_adapter(), &limiters, &breakers);
            adapters.insert(kind.name(), wrapped);
        }
        AdapterRuntime { adapters }
    }
}
