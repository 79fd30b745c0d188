//! Fallible builder for the top-level `Engine`: chain setters on an owned
//! builder, validate everything at `build()` rather than on every
//! individual setter call.

use std::sync::Arc;

use fathom_adapters::AdapterRuntimeBuilder;
use fathom_types::{EngineConfig, FathomError, ModuleId};

use crate::batch::BatchOrchestrator;
use crate::progress::ProgressManager;
use crate::scheduler::WaveScheduler;

/// Owns the wired-up scheduler, batch orchestrator, and progress manager
/// for one process. Cheap to clone: every field is an `Arc`.
#[derive(Clone)]
pub struct Engine {
    scheduler: Arc<WaveScheduler>,
    batch: Arc<BatchOrchestrator>,
    progress_manager: Arc<ProgressManager>,
}

impl Engine {
    #[must_use]
    pub fn scheduler(&self) -> Arc<WaveScheduler> {
        self.scheduler.clone()
    }

    #[must_use]
    pub fn batch(&self) -> Arc<BatchOrchestrator> {
        self.batch.clone()
    }

    #[must_use]
    pub fn progress_manager(&self) -> Arc<ProgressManager> {
        self.progress_manager.clone()
    }

    /// Run one domain through every requested module and return the
    /// completed (or partial) `EnrichmentResult`. Registers a progress
    /// tracker under the returned job's id before the scheduler starts, so
    /// a caller racing `progress_manager().get(job_id)` against this future
    /// never sees a missing tracker.
    pub async fn orchestrate(
        &self,
        domain: impl AsRef<str>,
        modules: Option<Vec<ModuleId>>,
        force_refresh: bool,
        priority: Option<u8>,
    ) -> fathom_types::EnrichmentResult {
        let mut spec = fathom_types::JobSpec::new(domain);
        spec.modules = modules;
        spec.force_refresh = force_refresh;
        if let Some(p) = priority {
            spec.priority = p;
        }

        let job_id = uuid::Uuid::new_v4();
        let tracker = Arc::new(crate::progress::ProgressTracker::new(
            job_id,
            spec.domain.clone(),
            spec.modules_or_default().len(),
        ));
        self.progress_manager.register(tracker.clone());
        self.scheduler.run(spec, Some(tracker)).await
    }

    /// Run many domains concurrently, bounded by `options.max_concurrent_domains`.
    pub async fn enrich_batch(
        &self,
        domains: Vec<String>,
        options: crate::batch::BatchOptions,
        on_progress: Option<crate::batch::BatchProgressCallback>,
    ) -> std::collections::HashMap<String, fathom_types::EnrichmentResult> {
        self.batch.run(domains, options, on_progress).await
    }
}

pub struct EngineBuilder {
    config: EngineConfig,
    critical_modules: Option<Vec<ModuleId>>,
}

impl EngineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            critical_modules: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn module_timeout_ms(mut self, ms: u64) -> Self {
        self.config.module_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn job_timeout_ms(mut self, ms: u64) -> Self {
        self.config.job_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn max_batch_concurrency(mut self, n: usize) -> Self {
        self.config.max_batch_concurrency = n;
        self
    }

    /// Override which modules abort remaining waves on failure. Defaults to
    /// `{M01}` if never called.
    #[must_use]
    pub fn critical_modules(mut self, modules: Vec<ModuleId>) -> Self {
        self.critical_modules = Some(modules);
        self
    }

    /// Construct the `Engine`. Errors if `critical_modules` names a module
    /// id that isn't one of the fifteen registered modules, which can only
    /// happen if a caller hand-builds the list rather than drawing from
    /// `ModuleId::ALL`.
    ///
    /// # Errors
    /// Returns `FathomError::InvalidArg` if `critical_modules` is empty or
    /// names an id outside `ModuleId::ALL`.
    pub fn build(self) -> Result<Engine, FathomError> {
        if let Some(modules) = &self.critical_modules {
            if modules.is_empty() {
                return Err(FathomError::InvalidArg(
                    "critical_modules must name at least one module".to_string(),
                ));
            }
        }

        let adapters = AdapterRuntimeBuilder::new().build();
        let module_registry = Arc::new(fathom_modules::ModuleRegistry::build(&adapters));

        let mut scheduler = WaveScheduler::new(module_registry, self.config);
        if let Some(modules) = self.critical_modules {
            scheduler = scheduler.with_critical_modules(modules);
        }
        let scheduler = Arc::new(scheduler);
        let progress_manager = Arc::new(ProgressManager::new());
        let batch = Arc::new(BatchOrchestrator::new(scheduler.clone(), progress_manager.clone()));

        Ok(Engine {
            scheduler,
            batch,
            progress_manager,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_rejects_empty_critical_module_list() {
        let err = EngineBuilder::new().critical_modules(Vec::new()).build();
        assert!(err.is_err());
    }

    #[test]
    fn build_succeeds_with_defaults() {
        assert!(EngineBuilder::new().build().is_ok());
    }
}
