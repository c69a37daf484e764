//! File system helpers for the output tree.
//!
//! Every write goes through [`atomic_write`] (or its async twin
//! [`write_output`]) so a crashed or cancelled run never leaves a half
//! written table behind. Failures surface as [`LineageError::OutputError`]
//! carrying the offending path.

use crate::constants::MAX_PATH_LENGTH;
use crate::core::LineageError;
use std::fs;
use std::io::Write;
use std::path::Path;

fn output_error(path: &Path, reason: impl ToString) -> LineageError {
    LineageError::OutputError {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Create `path` and all missing parents.
pub fn ensure_dir(path: &Path) -> Result<(), LineageError> {
    if path.exists() && !path.is_dir() {
        return Err(output_error(path, "exists but is not a directory"));
    }
    fs::create_dir_all(path).map_err(|e| output_error(path, e))
}

/// Write bytes through a temporary sibling file and a rename.
///
/// Parent directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), LineageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }

    let mut temp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    {
        let mut file = fs::File::create(&temp_path).map_err(|e| output_error(&temp_path, e))?;
        file.write_all(content).map_err(|e| output_error(&temp_path, e))?;
        file.sync_all().map_err(|e| output_error(&temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| output_error(path, e))
}

/// Async variant of [`atomic_write`] for the command layer.
pub async fn write_output(path: &Path, content: Vec<u8>) -> Result<(), LineageError> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || atomic_write(&owned, &content))
        .await
        .map_err(|e| output_error(path, e))?
}

/// Reduce a display name to the characters safe in any file name.
///
/// Everything outside `[A-Za-z0-9]` is dropped; an empty result becomes `_`.
pub fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name.chars().filter(char::is_ascii_alphanumeric).collect();
    if stem.is_empty() { "_".to_string() } else { stem }
}

/// Reject output paths longer than the portable limit.
pub fn check_path_length(path: &Path) -> Result<(), LineageError> {
    let length = path.as_os_str().len();
    if length > MAX_PATH_LENGTH {
        return Err(output_error(
            path,
            format!(
                "path length {length} exceeds the limit of {MAX_PATH_LENGTH}; \
                 shorten the input path or the field names"
            ),
        ));
    }
    Ok(())
}
