//! Pre-flight path validation for inputs and report destinations

use crate::error::{NcompareError, Result};
use std::path::{Path, PathBuf};

/// Require that `path` exists on disk.
pub fn ensure_valid_path_exists(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(NcompareError::PathNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}

/// Normalize an output path so it carries `suffix`.
///
/// A path without an extension gets `suffix` appended. A path whose extension
/// differs from `suffix` is rejected rather than silently rewritten.
pub fn ensure_valid_path_with_suffix(path: impl AsRef<Path>, suffix: &str) -> Result<PathBuf> {
    let path = path.as_ref();
    let wanted = suffix.trim_start_matches('.');
    if wanted.is_empty() {
        return Err(NcompareError::invalid_input("empty file suffix"));
    }

    match path.extension().and_then(|e| e.to_str()) {
        None => Ok(path.with_extension(wanted)),
        Some(ext) if ext.eq_ignore_ascii_case(wanted) => Ok(path.to_path_buf()),
        Some(_) => Err(NcompareError::PathWrongSuffix {
            path: path.to_path_buf(),
            expected: format!(".{wanted}"),
        }),
    }
}
