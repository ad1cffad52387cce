use jobharvest_core::models::{JobRecord, OutputFormat};
use jobharvest_store::{OutputStore, StoreConfig};
use tempfile::TempDir;

/// Output store rooted in a fresh temp dir with every format enabled.
///
/// Keep the `TempDir` alive for the test duration; dropping it deletes the
/// files.
pub fn temp_output() -> (OutputStore, StoreConfig, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path().join("data"), &OutputFormat::all()).unwrap();
    (OutputStore::new(config.clone()), config, dir)
}

pub fn job(title: &str, company: &str, location: &str, date_posted: &str) -> JobRecord {
    JobRecord {
        job_title: title.into(),
        company: company.into(),
        location: location.into(),
        date_posted: date_posted.into(),
        job_description: "This is a full-time remote position".into(),
        ..JobRecord::new(&format!(
            "https://jobs.example.com/{}",
            title.to_lowercase().replace(' ', "-")
        ))
    }
    .classify()
}
