//! The `Module` trait every intelligence module implements.

use async_trait::async_trait;
use fathom_types::{FathomError, ModuleId, ModuleResult, ModuleStatus};
use std::collections::HashMap;

/// Map of predecessor results visible to a module at execution time, keyed
/// by the producing module's id. Only modules that reached `success` are
/// guaranteed present; a module must check its own `depends_on()` against
/// this map before doing any upstream I/O.
pub type Context = HashMap<ModuleId, ModuleResult>;

#[async_trait]
pub trait Module: Send + Sync {
    fn id(&self) -> ModuleId;

    /// Declared hard prerequisites; defaults to `ModuleId::depends_on`, the
    /// static wave-table entry for this module's id. Overridable only for
    /// tests that want to exercise a module in isolation.
    fn depends_on(&self) -> &'static [ModuleId] {
        self.id().depends_on()
    }

    /// Per-module execution timeout; the scheduler wraps this in
    /// `tokio::time::timeout` and converts expiry into `status=timeout`.
    fn timeout_seconds(&self) -> u64 {
        120
    }

    /// Run this module. Implementations must check `context` for every
    /// declared dependency before making any adapter call and return
    /// `Err(FathomError::DependencyNotMet)` if one is missing or did not
    /// succeed; the scheduler converts that specific error into a
    /// `skipped` result rather than a `failed` one. `force_refresh` comes
    /// from the job's `JobSpec` and should be forwarded as `bypass_cache`
    /// on every adapter call the module makes.
    async fn execute(
        &self,
        domain: &str,
        context: &Context,
        force_refresh: bool,
    ) -> Result<ModuleResult, FathomError>;

    /// Verify a module's own declared dependencies are satisfied in
    /// `context`, for use at the top of `execute`.
    fn dependencies_satisfied(&self, context: &Context) -> Result<(), FathomError> {
        for dep in self.depends_on() {
            match context.get(dep) {
                Some(result) if result.is_success() => {}
                _ => {
                    return Err(FathomError::DependencyNotMet(format!(
                        "{} requires {} to have succeeded",
                        self.id().slug(),
                        dep.slug()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Per-module schema check run against a module's own output right
    /// after `execute` returns a success. Enforces P0 (`primary_citation`
    /// present) by default; a module overrides this to add field-level
    /// invariants on its own `ModulePayload` variant. The scheduler treats
    /// a validation failure the same as an execution failure.
    fn validate_output(&self, result: &ModuleResult) -> Result<(), FathomError> {
        if result.status == ModuleStatus::Success && result.primary_citation.is_none() {
            return Err(FathomError::SourceCitationMissing);
        }
        Ok(())
    }
}
