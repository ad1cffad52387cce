use std::fs;
use std::path::Path;

use calamine::{Reader, open_workbook_auto};
use jobharvest_core::AppError;
use jobharvest_core::util::normalize_url;
use tracing::info;

/// Read seed URLs from a `.txt`, `.csv` or `.xlsx`/`.xls` file.
///
/// Text files hold one URL per line (`#` starts a comment). Tabular files use
/// the `url` column, else the first column. Every URL is normalized; blanks
/// are dropped.
pub fn read_input_file(path: &Path) -> Result<Vec<String>, AppError> {
    if !path.exists() {
        return Err(AppError::ConfigError(format!(
            "Input file not found: {}",
            path.display()
        )));
    }
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let raw = match extension.as_str() {
        "txt" => read_lines(path)?,
        "csv" => read_csv(path)?,
        "xlsx" | "xls" => read_sheet(path)?,
        other => {
            return Err(AppError::ConfigError(format!(
                "Unsupported input format '.{other}' (expected .txt, .csv or .xlsx)"
            )));
        }
    };

    let urls: Vec<String> = raw
        .iter()
        .map(|url| normalize_url(url))
        .filter(|url| !url.is_empty())
        .collect();
    info!(path = %path.display(), count = urls.len(), "Read input URLs");
    Ok(urls)
}

/// Non-empty, non-comment lines of a text file.
pub fn read_lines(path: &Path) -> Result<Vec<String>, AppError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::ConfigError(format!("{}: {e}", path.display())))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Values of the URL column. A header cell that is itself a URL means the
/// file has no header row, so it is kept.
fn url_column(headers: Vec<String>, rows: impl Iterator<Item = Vec<String>>) -> Vec<String> {
    let column = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("url"));
    let mut urls = Vec::new();
    if column.is_none()
        && let Some(first) = headers.first()
        && first.trim().starts_with("http")
    {
        urls.push(first.trim().to_string());
    }
    let column = column.unwrap_or(0);
    urls.extend(
        rows.filter_map(|row| row.get(column).map(|cell| cell.trim().to_string()))
            .filter(|cell| !cell.is_empty()),
    );
    urls
}

fn read_csv(path: &Path) -> Result<Vec<String>, AppError> {
    let config_error = |e: csv::Error| AppError::ConfigError(format!("{}: {e}", path.display()));
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(config_error)?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(config_error)?
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(config_error)?;
    Ok(url_column(
        headers,
        rows.into_iter()
            .map(|row| row.iter().map(str::to_string).collect()),
    ))
}

fn read_sheet(path: &Path) -> Result<Vec<String>, AppError> {
    let config_error =
        |e: calamine::Error| AppError::ConfigError(format!("{}: {e}", path.display()));
    let mut workbook = open_workbook_auto(path).map_err(config_error)?;
    let Some(range) = workbook.worksheet_range_at(0) else {
        return Ok(Vec::new());
    };
    let range = range.map_err(config_error)?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>());
    let Some(headers) = rows.next() else {
        return Ok(Vec::new());
    };
    Ok(url_column(headers, rows))
}
