use std::path::{Path, PathBuf};

use jobharvest_core::AppError;
use jobharvest_core::models::OutputFormat;

pub const CSV_FILE: &str = "jobs.csv";
pub const JSON_FILE: &str = "jobs.json";
pub const XLSX_FILE: &str = "jobs.xlsx";

/// Where output files live and which encodings are maintained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    output_dir: PathBuf,
    formats: Vec<OutputFormat>,
}

/// `data/` with every encoding enabled.
impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data"),
            formats: OutputFormat::all(),
        }
    }
}

impl StoreConfig {
    /// Duplicate formats are collapsed; an empty list is rejected.
    pub fn new(output_dir: impl Into<PathBuf>, formats: &[OutputFormat]) -> Result<Self, AppError> {
        let mut unique = Vec::with_capacity(formats.len());
        for format in formats {
            if !unique.contains(format) {
                unique.push(*format);
            }
        }
        if unique.is_empty() {
            return Err(AppError::ConfigError(
                "At least one output format is required".into(),
            ));
        }
        Ok(Self {
            output_dir: output_dir.into(),
            formats: unique,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(CSV_FILE)
    }

    pub fn json_path(&self) -> PathBuf {
        self.output_dir.join(JSON_FILE)
    }

    pub fn xlsx_path(&self) -> PathBuf {
        self.output_dir.join(XLSX_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.formats(), OutputFormat::all().as_slice());
        assert_eq!(config.csv_path(), PathBuf::from("data/jobs.csv"));
        assert_eq!(config.xlsx_path(), PathBuf::from("data/jobs.xlsx"));
    }

    #[test]
    fn empty_format_list_is_rejected() {
        assert!(matches!(
            StoreConfig::new("out", &[]),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn duplicate_formats_collapse_in_order() {
        let config = StoreConfig::new(
            "out",
            &[OutputFormat::Json, OutputFormat::Csv, OutputFormat::Json],
        )
        .unwrap();
        assert_eq!(config.formats(), &[OutputFormat::Json, OutputFormat::Csv]);
        assert_eq!(config.json_path(), PathBuf::from("out/jobs.json"));
    }
}
