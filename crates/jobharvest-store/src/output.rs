//! Fan-out over the configured encodings.
//!
//! Each encoding is merged and rewritten independently: one failing file
//! never stops the others, and there is no reconciliation between them.

use jobharvest_core::dedup::DedupRegistry;
use jobharvest_core::models::{JobRecord, OutputFormat};
use jobharvest_core::traits::RecordStore;
use jobharvest_core::AppError;
use tracing::{error, info};

use crate::config::StoreConfig;
use crate::csv_store::CsvStore;
use crate::excel_store::ExcelStore;
use crate::json_store::JsonStore;

pub struct OutputStore {
    config: StoreConfig,
    stores: Vec<Box<dyn RecordStore>>,
}

impl OutputStore {
    pub fn new(config: StoreConfig) -> Self {
        let stores = config
            .formats()
            .iter()
            .map(|format| -> Box<dyn RecordStore> {
                match format {
                    OutputFormat::Csv => Box::new(CsvStore::new(config.csv_path())),
                    OutputFormat::Json => Box::new(JsonStore::new(config.json_path())),
                    OutputFormat::Excel => Box::new(ExcelStore::new(config.xlsx_path())),
                }
            })
            .collect();
        Self { config, stores }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Seed a registry from the persisted CSV and JSON files, whichever exist,
    /// regardless of which encodings this run writes.
    pub fn bootstrap_registry(&self) -> DedupRegistry {
        let csv = CsvStore::new(self.config.csv_path());
        let json = JsonStore::new(self.config.json_path());
        let sources: [&dyn RecordStore; 2] = [&csv, &json];
        DedupRegistry::bootstrap(&sources)
    }
}

impl RecordStore for OutputStore {
    /// Records from the first configured encoding.
    fn load(&self) -> Result<Vec<JobRecord>, AppError> {
        match self.stores.first() {
            Some(store) => store.load(),
            None => Ok(Vec::new()),
        }
    }

    /// Append `records` to every encoding. Fails only when every encoding
    /// failed.
    fn save(&self, records: &[JobRecord]) -> Result<usize, AppError> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut failures = Vec::new();
        for store in &self.stores {
            match store.save(records) {
                Ok(count) => {
                    info!(format = store.name(), count, "Saved jobs");
                }
                Err(e) => {
                    error!(format = store.name(), error = %e, "Failed to save jobs");
                    failures.push(format!("{}: {e}", store.name()));
                }
            }
        }
        if failures.len() == self.stores.len() {
            return Err(AppError::StorageError(format!(
                "Every output format failed: {}",
                failures.join("; ")
            )));
        }
        Ok(records.len())
    }

    fn name(&self) -> &str {
        "output"
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn record(title: &str) -> JobRecord {
        JobRecord {
            job_title: title.into(),
            company: "Acme".into(),
            ..JobRecord::new("https://acme.com/jobs/1")
        }
    }

    #[test]
    fn writes_only_selected_formats() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path(), &[OutputFormat::Json]).unwrap();
        let store = OutputStore::new(config.clone());

        assert_eq!(store.save(&[record("A")]).unwrap(), 1);
        assert!(config.json_path().exists());
        assert!(!config.csv_path().exists());
        assert!(!config.xlsx_path().exists());
    }

    #[test]
    fn one_broken_format_does_not_block_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            StoreConfig::new(dir.path(), &[OutputFormat::Csv, OutputFormat::Json]).unwrap();
        fs::write(config.json_path(), "{ broken").unwrap();

        let store = OutputStore::new(config.clone());
        assert_eq!(store.save(&[record("A")]).unwrap(), 1);
        assert_eq!(CsvStore::new(config.csv_path()).load().unwrap().len(), 1);
        assert_eq!(fs::read_to_string(config.json_path()).unwrap(), "{ broken");
    }

    #[test]
    fn all_formats_failing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path(), &[OutputFormat::Json]).unwrap();
        fs::write(config.json_path(), "{ broken").unwrap();

        let err = OutputStore::new(config).save(&[record("A")]).unwrap_err();
        assert!(matches!(err, AppError::StorageError(_)));
    }

    #[test]
    fn registry_reads_csv_and_json_even_when_not_selected() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path(), &[OutputFormat::Excel]).unwrap();
        CsvStore::new(config.csv_path()).save(&[record("A")]).unwrap();
        JsonStore::new(config.json_path())
            .save(&[record("A"), record("B")])
            .unwrap();

        let registry = OutputStore::new(config).bootstrap_registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.is_duplicate(&record("B")));
    }
}
