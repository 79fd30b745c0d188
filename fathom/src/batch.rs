//! Batch orchestration across many domains: fan out one job per domain,
//! join with isolation so one domain's failure cannot cancel its siblings,
//! and collect every result rather than short-circuiting the whole batch.

use std::collections::HashMap;
use std::sync::Arc;

use fathom_types::{EnrichmentResult, JobSpec};
use tokio::sync::Semaphore;

/// Per-batch overrides applied to every domain's `JobSpec`.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub modules: Option<Vec<fathom_types::ModuleId>>,
    pub force_refresh: bool,
    pub priority: u8,
    pub max_concurrent_domains: Option<usize>,
}

const DEFAULT_MAX_CONCURRENT_DOMAINS: usize = 5;

/// Invoked after each domain finishes, with `(domain, completed_count, total)`.
pub type BatchProgressCallback = Box<dyn Fn(&str, usize, usize) + Send + Sync>;

pub struct BatchOrchestrator {
    scheduler: Arc<crate::scheduler::WaveScheduler>,
    progress_manager: Arc<crate::progress::ProgressManager>,
}

impl BatchOrchestrator {
    #[must_use]
    pub fn new(
        scheduler: Arc<crate::scheduler::WaveScheduler>,
        progress_manager: Arc<crate::progress::ProgressManager>,
    ) -> Self {
        Self {
            scheduler,
            progress_manager,
        }
    }

    /// Run every domain under a semaphore bounding concurrent in-flight
    /// jobs. A domain that errors or times out is isolated: it lands in the
    /// result map with whatever partial `EnrichmentResult` the scheduler
    /// produced, and every other domain keeps running.
    pub async fn run(
        &self,
        domains: Vec<String>,
        options: BatchOptions,
        on_progress: Option<BatchProgressCallback>,
    ) -> HashMap<String, EnrichmentResult> {
        use futures::stream::{FuturesUnordered, StreamExt};

        let total = domains.len();
        let max_concurrent = options
            .max_concurrent_domains
            .unwrap_or(DEFAULT_MAX_CONCURRENT_DOMAINS)
            .max(1);
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let on_progress = on_progress.map(Arc::new);

        let mut futs = FuturesUnordered::new();
        for domain in domains {
            let semaphore = semaphore.clone();
            let scheduler = self.scheduler.clone();
            let progress_manager = self.progress_manager.clone();
            let modules = options.modules.clone();
            let force_refresh = options.force_refresh;
            let priority = options.priority;

            futs.push(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("semaphore is never closed while the batch is running");

                let mut spec = JobSpec::new(&domain);
                spec.modules = modules;
                spec.force_refresh = force_refresh;
                spec.priority = priority;

                let tracker = Arc::new(crate::progress::ProgressTracker::new(
                    uuid::Uuid::new_v4(),
                    spec.domain.clone(),
                    spec.modules_or_default().len(),
                ));
                progress_manager.register(tracker.clone());

                scheduler.run(spec, Some(tracker)).await
            });
        }

        let mut results = HashMap::with_capacity(total);
        let mut completed = 0usize;
        while let Some(result) = futs.next().await {
            completed += 1;
            if let Some(cb) = &on_progress {
                cb(&result.domain, completed, total);
            }
            results.insert(result.domain.clone(), result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_types::EngineConfig;

    fn dummy_scheduler() -> Arc<crate::scheduler::WaveScheduler> {
        let runtime = fathom_adapters::AdapterRuntimeBuilder::new().build();
        let registry = Arc::new(fathom_modules::ModuleRegistry::build(&runtime));
        Arc::new(crate::scheduler::WaveScheduler::new(registry, EngineConfig::default()))
    }

    #[tokio::test]
    async fn batch_isolates_per_domain_results() {
        let orchestrator = BatchOrchestrator::new(dummy_scheduler(), Arc::new(crate::progress::ProgressManager::new()));
        let domains = vec!["costco.com".to_string(), "example-startup.io".to_string()];
        let results = orchestrator
            .run(domains.clone(), BatchOptions::default(), None)
            .await;
        assert_eq!(results.len(), domains.len());
        for domain in &domains {
            let canonical = JobSpec::canonicalize(domain);
            assert!(results.contains_key(&canonical));
        }
    }

    #[tokio::test]
    async fn batch_progress_callback_fires_once_per_domain() {
        let orchestrator = BatchOrchestrator::new(dummy_scheduler(), Arc::new(crate::progress::ProgressManager::new()));
        let calls = Arc::new(std::sync::Mutex::new(0usize));
        let calls_clone = calls.clone();
        let callback: BatchProgressCallback = Box::new(move |_domain, _completed, _total| {
            *calls_clone.lock().expect("mutex poisoned") += 1;
        });
        orchestrator
            .run(vec!["a.com".to_string(), "b.com".to_string()], BatchOptions::default(), Some(callback))
            .await;
        assert_eq!(*calls.lock().expect("mutex poisoned"), 2);
    }
}
