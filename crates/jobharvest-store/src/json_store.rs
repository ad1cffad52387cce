use std::fs;
use std::path::{Path, PathBuf};

use jobharvest_core::models::JobRecord;
use jobharvest_core::traits::RecordStore;
use jobharvest_core::AppError;
use tracing::debug;

use crate::atomic::{storage_error, write_atomic};

/// `jobs.json`: a pretty-printed array of records.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonStore {
    fn load(&self) -> Result<Vec<JobRecord>, AppError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| storage_error(&self.path, e))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let records: Vec<JobRecord> =
            serde_json::from_str(&raw).map_err(|e| storage_error(&self.path, e))?;
        debug!(path = %self.path.display(), count = records.len(), "Loaded JSON jobs");
        Ok(records)
    }

    fn save(&self, records: &[JobRecord]) -> Result<usize, AppError> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut merged = self.load()?;
        merged.extend_from_slice(records);
        let mut bytes = serde_json::to_vec_pretty(&merged)?;
        bytes.push(b'\n');
        write_atomic(&self.path, &bytes)?;
        Ok(records.len())
    }

    fn name(&self) -> &str {
        "json"
    }
}
