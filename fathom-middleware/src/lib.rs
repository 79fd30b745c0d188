//! Composable `Arc<dyn Adapter>` middleware: a moka-backed cache, a
//! token-bucket rate limiter, a three-state circuit breaker, and jittered
//! retry, composed in a fixed order by `AdapterStack`.

mod builder;
mod caching;
mod circuit_breaking;
mod rate_limiting;
mod retrying;

pub use builder::AdapterStack;
pub use caching::{cache_key, CachingAdapter};
pub use circuit_breaking::CircuitBreakingAdapter;
pub use rate_limiting::RateLimitedAdapter;
pub use retrying::RetryingAdapter;
