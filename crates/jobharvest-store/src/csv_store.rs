use std::path::{Path, PathBuf};

use jobharvest_core::models::{COLUMNS, JobRecord};
use jobharvest_core::traits::RecordStore;
use jobharvest_core::AppError;
use tracing::debug;

use crate::atomic::{storage_error, write_atomic};

/// `jobs.csv`: header row plus one row per record, in [`COLUMNS`] order.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(&self, records: &[JobRecord]) -> Result<Vec<u8>, AppError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(COLUMNS)
            .map_err(|e| storage_error(&self.path, e))?;
        for record in records {
            writer
                .write_record(record.to_row())
                .map_err(|e| storage_error(&self.path, e))?;
        }
        writer
            .into_inner()
            .map_err(|e| storage_error(&self.path, e))
    }
}

impl RecordStore for CsvStore {
    fn load(&self) -> Result<Vec<JobRecord>, AppError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| storage_error(&self.path, e))?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| storage_error(&self.path, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| storage_error(&self.path, e))?;
            let cells: Vec<String> = row.iter().map(str::to_string).collect();
            if cells.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            records.push(JobRecord::from_row(&headers, &cells)?);
        }
        debug!(path = %self.path.display(), count = records.len(), "Loaded CSV jobs");
        Ok(records)
    }

    fn save(&self, records: &[JobRecord]) -> Result<usize, AppError> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut merged = self.load()?;
        merged.extend_from_slice(records);
        write_atomic(&self.path, &self.encode(&merged)?)?;
        Ok(records.len())
    }

    fn name(&self) -> &str {
        "csv"
    }
}
