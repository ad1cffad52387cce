use std::path::{Path, PathBuf};

use calamine::{Reader, Xlsx, open_workbook};
use jobharvest_core::models::{COLUMNS, JobRecord};
use jobharvest_core::traits::RecordStore;
use jobharvest_core::AppError;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::atomic::{storage_error, write_atomic};

pub const SHEET_NAME: &str = "Jobs";

/// Column width: longest cell plus padding, capped.
const WIDTH_PADDING: usize = 2;
const MAX_COLUMN_WIDTH: usize = 50;

/// Longest string a single XLSX cell may hold.
const MAX_CELL_CHARS: usize = 32_767;

/// `jobs.xlsx`: one "Jobs" sheet with a bold header row.
#[derive(Debug, Clone)]
pub struct ExcelStore {
    path: PathBuf,
}

fn truncate_cell(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

fn write_sheet(sheet: &mut Worksheet, records: &[JobRecord]) -> Result<(), XlsxError> {
    sheet.set_name(SHEET_NAME)?;
    let header = Format::new().set_bold();

    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.chars().count()).collect();
    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    for (row, record) in records.iter().enumerate() {
        for (col, cell) in record.to_row().iter().enumerate() {
            let cell = truncate_cell(cell);
            widths[col] = widths[col].max(cell.chars().count());
            sheet.write_string(row as u32 + 1, col as u16, cell)?;
        }
    }
    for (col, width) in widths.into_iter().enumerate() {
        let width = (width + WIDTH_PADDING).min(MAX_COLUMN_WIDTH);
        sheet.set_column_width(col as u16, width as f64)?;
    }
    Ok(())
}

impl ExcelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(&self, records: &[JobRecord]) -> Result<Vec<u8>, AppError> {
        let mut workbook = Workbook::new();
        write_sheet(workbook.add_worksheet(), records).map_err(|e| storage_error(&self.path, e))?;
        workbook
            .save_to_buffer()
            .map_err(|e| storage_error(&self.path, e))
    }
}

impl RecordStore for ExcelStore {
    fn load(&self) -> Result<Vec<JobRecord>, AppError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut workbook: Xlsx<_> =
            open_workbook(&self.path).map_err(|e| storage_error(&self.path, e))?;
        let names = workbook.sheet_names();
        let sheet = names
            .iter()
            .find(|name| name.as_str() == SHEET_NAME)
            .or_else(|| names.first())
            .cloned();
        let Some(sheet) = sheet else {
            return Ok(Vec::new());
        };
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| storage_error(&self.path, e))?;

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            return Ok(Vec::new());
        };
        let headers: Vec<String> = header_row
            .iter()
            .map(|c| c.to_string().trim().to_string())
            .collect();

        let mut records = Vec::new();
        for row in rows {
            let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            if cells.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            records.push(JobRecord::from_row(&headers, &cells)?);
        }
        debug!(path = %self.path.display(), count = records.len(), "Loaded XLSX jobs");
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
        "excel"
    }
}
