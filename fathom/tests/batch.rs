//! End-to-end coverage of `Engine::enrich_batch`: bulk fan-out, per-domain
//! isolation, and results keyed by canonical domain.

use std::sync::{Arc, Mutex};

use fathom::{BatchOptions, EngineBuilder, JobStatus, ModuleId};

#[tokio::test]
async fn batch_runs_every_domain_independently() {
    let engine = EngineBuilder::new().build().expect("default config builds");
    let domains = vec![
        "costco.com".to_string(),
        "a-private-saas-startup.example".to_string(),
        "another-merchant.example".to_string(),
    ];
    let options = BatchOptions {
        modules: Some(vec![ModuleId::M01CompanyContext, ModuleId::M02TechnologyStack]),
        ..Default::default()
    };
    let results = engine.enrich_batch(domains.clone(), options, None).await;

    assert_eq!(results.len(), domains.len());
    for domain in &domains {
        let result = results.get(domain).expect("every requested domain has a result");
        assert_eq!(result.status, JobStatus::Completed);
    }
}

#[tokio::test]
async fn batch_progress_callback_reports_a_running_total() {
    let engine = EngineBuilder::new().build().expect("default config builds");
    let seen_totals: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_totals_clone = seen_totals.clone();

    let callback: fathom::BatchProgressCallback = Box::new(move |_domain, completed, total| {
        assert_eq!(total, 3);
        seen_totals_clone.lock().expect("mutex poisoned").push(completed);
    });

    let domains = vec!["a.example".to_string(), "b.example".to_string(), "c.example".to_string()];
    engine.enrich_batch(domains, BatchOptions::default(), Some(callback)).await;

    let totals = seen_totals.lock().expect("mutex poisoned");
    assert_eq!(totals.len(), 3);
    assert!(totals.contains(&3), "the final callback must report all three domains done");
}

#[tokio::test]
async fn batch_respects_max_concurrent_domains() {
    let engine = EngineBuilder::new().build().expect("default config builds");
    let options = BatchOptions {
        modules: Some(vec![ModuleId::M01CompanyContext]),
        max_concurrent_domains: Some(1),
        ..Default::default()
    };
    let domains = vec!["one.example".to_string(), "two.example".to_string()];
    let results = engine.enrich_batch(domains.clone(), options, None).await;
    assert_eq!(results.len(), 2);
}
