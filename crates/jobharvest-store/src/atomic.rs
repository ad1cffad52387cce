use std::fs;
use std::io::Write;
use std::path::Path;

use jobharvest_core::AppError;
use tempfile::NamedTempFile;

/// Replace `path` with `bytes` via a temp file in the same directory, so a
/// crash mid-write never leaves a truncated file behind.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| AppError::StorageError(format!("{}: {}", path.display(), e.error)))?;
    Ok(())
}

pub(crate) fn storage_error(path: &Path, error: impl std::fmt::Display) -> AppError {
    AppError::StorageError(format!("{}: {error}", path.display()))
}
