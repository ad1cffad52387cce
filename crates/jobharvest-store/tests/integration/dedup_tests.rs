use jobharvest_core::dedup::DedupRegistry;
use jobharvest_core::harvest::{HarvestService, TracingHarvestReporter};
use jobharvest_core::pacing::PacingConfig;
use jobharvest_core::retry::RetryPolicy;
use jobharvest_core::testutil::{MockExtractor, MockFetcher};
use jobharvest_core::traits::RecordStore;
use jobharvest_store::{CsvStore, JsonStore};
use tokio_util::sync::CancellationToken;

use crate::integration::common::{job, temp_output};

fn seeds() -> Vec<String> {
    vec![
        "https://jobs.example.com/1?utm_source=x".to_string(),
        "https://jobs.example.com/2".to_string(),
    ]
}

fn service() -> HarvestService<MockFetcher, MockExtractor> {
    HarvestService::new(
        MockFetcher::with_responses(vec![]),
        MockExtractor::with_titles(&["Rust Engineer", "Go Engineer"]),
    )
    .with_retry(RetryPolicy::immediate(1))
    .with_pacing(PacingConfig::none())
}

#[tokio::test]
async fn second_cycle_saves_nothing_new() {
    let (store, config, _dir) = temp_output();
    let cancel = CancellationToken::new();

    let mut registry = store.bootstrap_registry();
    assert!(registry.is_empty());
    let first = service()
        .run_cycle(&seeds(), &mut registry, &store, &cancel, &TracingHarvestReporter)
        .await
        .unwrap();
    assert_eq!(first.saved, 2);

    // Fresh process: registry rebuilt from disk.
    let mut registry = store.bootstrap_registry();
    assert_eq!(registry.len(), 2);
    let second = service()
        .run_cycle(&seeds(), &mut registry, &store, &cancel, &TracingHarvestReporter)
        .await
        .unwrap();
    assert_eq!(second.extracted, 2);
    assert_eq!(second.unique, 0);
    assert_eq!(second.saved, 0);

    let saved = JsonStore::new(config.json_path()).load().unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].source_url, "https://jobs.example.com/1");
    assert_eq!(CsvStore::new(config.csv_path()).load().unwrap().len(), 2);
}

#[test]
fn registry_from_disk_matches_saved_hashes() {
    let (store, _config, _dir) = temp_output();
    let a = job("Platform Engineer", "Acme", "Remote", "today");
    let b = job("Platform Engineer", "Acme", "Remote", "yesterday");
    store.save(std::slice::from_ref(&a)).unwrap();

    let mut registry: DedupRegistry = store.bootstrap_registry();
    assert!(registry.is_duplicate(&a));
    assert!(!registry.is_duplicate(&b));
    assert_eq!(registry.filter_unique(vec![a, b.clone()]), vec![b]);
}
