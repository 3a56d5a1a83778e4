//! File system helpers for descriptor files

use crate::error::{ConfigError, CreatorError, StorageError};
use crate::utils::error_helpers::convert_io_error;
use std::path::Path;

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists<P: AsRef<Path>>(path: P) -> crate::Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| ConfigError::InvalidValue {
            field: "directory_path".to_string(),
            value: path.to_string_lossy().to_string(),
            reason: format!("Failed to create directory: {}", e),
        })?;
    }
    Ok(())
}

pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String, StorageError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| convert_io_error(e, path))
}

/// Write `content` unless the file exists and `overwrite` is off.
///
/// Returns whether the file was written.
pub fn write_text<P: AsRef<Path>>(
    path: P,
    content: &str,
    overwrite: bool,
) -> Result<bool, CreatorError> {
    let path = path.as_ref();
    if path.exists() && !overwrite {
        log::debug!("Skipping existing file {}", path.display());
        return Ok(false);
    }
    std::fs::write(path, content).map_err(|source| CreatorError::Write {
        path: path.to_string_lossy().to_string(),
        source,
    })?;
    Ok(true)
}
