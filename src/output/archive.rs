//! Zip archive of a finished output directory.

use crate::core::LineageError;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn archive_error(path: &Path, reason: impl ToString) -> LineageError {
    LineageError::OutputError {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// The sibling archive path of an output directory: `<dir>.zip`.
pub fn archive_path(dir: &Path) -> PathBuf {
    let mut name = dir.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".zip");
    dir.with_file_name(name)
}

/// Zip every file below `dir` into `destination`, keeping relative paths.
///
/// Returns the number of files stored.
pub fn zip_directory(dir: &Path, destination: &Path) -> Result<usize, LineageError> {
    let file = File::create(destination).map_err(|e| archive_error(destination, e))?;
    let mut writer = ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut stored = 0;
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| archive_error(dir, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir).map_err(|e| archive_error(entry.path(), e))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        writer.start_file(name, options).map_err(|e| archive_error(destination, e))?;
        let mut source = File::open(entry.path()).map_err(|e| archive_error(entry.path(), e))?;
        io::copy(&mut source, &mut writer).map_err(|e| archive_error(destination, e))?;
        stored += 1;
    }

    writer.finish().map_err(|e| archive_error(destination, e))?;
    debug!("Archived {} files into {}", stored, destination.display());
    Ok(stored)
}
