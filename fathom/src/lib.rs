//! Parallel intelligence-enrichment engine.
//!
//! Builds an [`Engine`] wiring the fifteen intelligence modules in
//! `fathom-modules` to a shared [`fathom_adapters::AdapterRuntime`], then
//! runs a [`WaveScheduler`] that executes them wave by wave with a join
//! barrier between waves. [`Engine::orchestrate`] and
//! [`Engine::enrich_batch`] are the two public entry points; everything
//! else (progress tracking, circuit breaking, retries) is plumbing behind
//! them.
#![warn(missing_docs)]

mod batch;
mod builder;
mod progress;
mod scheduler;

pub use batch::{BatchOptions, BatchOrchestrator, BatchProgressCallback};
pub use builder::{Engine, EngineBuilder};
pub use progress::{
    JobProgress, ModuleProgress, ModuleProgressState, ProgressEvent, ProgressManager,
    ProgressTracker, WaveProgress, DEFAULT_RETENTION_SECONDS,
};
pub use scheduler::{build_plan, default_critical_modules, WaveScheduler};

pub use fathom_types::{
    EnrichmentResult, EngineConfig, FathomError, JobSpec, JobStatus, ModuleId, ModulePayload,
    ModuleResult, ModuleStatus, WaveResult, WaveStatus,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn orchestrate_returns_a_job_registered_with_the_progress_manager() {
        let engine = EngineBuilder::new().build().expect("default config builds");
        let result = engine.orchestrate("costco.com", None, false, None).await;
        assert!(engine.progress_manager().get(result.job_id).is_some());
    }

    #[tokio::test]
    async fn orchestrate_with_a_single_module_runs_exactly_one_wave() {
        let engine = EngineBuilder::new().build().expect("default config builds");
        let result = engine
            .orchestrate("costco.com", Some(vec![ModuleId::M01CompanyContext]), false, None)
            .await;
        assert_eq!(result.waves.len(), 1);
        assert!(
            result.completed_modules.contains(&ModuleId::M01CompanyContext)
                || result.failed_modules.contains(&ModuleId::M01CompanyContext)
        );
    }

    #[tokio::test]
    async fn enrich_batch_returns_one_result_per_domain() {
        let engine = EngineBuilder::new().build().expect("default config builds");
        let domains = vec!["costco.com".to_string(), "shopify-merchant.example".to_string()];
        let results = engine
            .enrich_batch(domains.clone(), BatchOptions::default(), None)
            .await;
        assert_eq!(results.len(), domains.len());
    }
}
