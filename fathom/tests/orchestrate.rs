//! End-to-end coverage of `Engine::orchestrate` against the deterministic
//! synthetic adapters in `fathom-adapters`: one behavior per test, built
//! against the real wiring rather than mocks.

use fathom::{EngineBuilder, JobStatus, ModuleId};

#[tokio::test]
async fn full_run_completes_all_fifteen_modules_in_five_waves() {
    let engine = EngineBuilder::new().build().expect("default config builds");
    let result = engine.orchestrate("costco.com", None, false, None).await;

    assert_eq!(result.waves.len(), 5);
    assert_eq!(result.completed_modules.len(), ModuleId::ALL.len());
    assert!(result.failed_modules.is_empty());
    assert_eq!(result.status, JobStatus::Completed);
    assert!(result.results.contains_key(&ModuleId::M15StrategicBrief));
}

#[tokio::test]
async fn domain_is_canonicalized_before_the_job_runs() {
    let engine = EngineBuilder::new().build().expect("default config builds");
    let result = engine
        .orchestrate("HTTPS://WWW.Costco.com/", Some(vec![ModuleId::M01CompanyContext]), false, None)
        .await;
    assert_eq!(result.domain, "costco.com");
}

#[tokio::test]
async fn requesting_a_downstream_module_alone_pulls_in_no_upstream_work() {
    let engine = EngineBuilder::new().build().expect("default config builds");
    // M15 depends on all fourteen others; requesting it alone still only
    // plans the one module the caller named, surfacing its own
    // DependencyNotMet as a skip rather than the scheduler chasing deps.
    let result = engine
        .orchestrate("costco.com", Some(vec![ModuleId::M15StrategicBrief]), false, None)
        .await;
    assert_eq!(result.waves.len(), 1);
    assert!(result.skipped_modules.contains(&ModuleId::M15StrategicBrief));
}

#[tokio::test]
async fn progress_manager_reflects_a_completed_job() {
    let engine = EngineBuilder::new().build().expect("default config builds");
    let result = engine.orchestrate("costco.com", None, false, None).await;
    let progress = engine
        .progress_manager()
        .get(result.job_id)
        .expect("tracker was registered before the job ran");
    assert_eq!(progress.status, JobStatus::Completed);
    assert!((progress.overall_percent - 100.0).abs() < f64::EPSILON);
}
