//! Writers for everything a run leaves on disk.
//!
//! ```text
//! <out>/
//! ├── summary.json
//! ├── Fields/
//! │   ├── fields.csv|json
//! │   └── dependencies.csv|json
//! └── Graphs/                  (optional)
//!     ├── <source>/<field>.dot
//!     └── Sheets/<sheet>.dot
//! ```
//!
//! Tables are rendered to memory first and then written atomically, so the
//! renderers stay free of I/O and easy to test.

pub mod archive;
pub mod csv_writer;
pub mod dot;
pub mod json_writer;
pub mod summary;

pub use archive::{archive_path, zip_directory};
pub use csv_writer::{write_dependencies_csv, write_fields_csv};
pub use dot::{GraphStats, field_graph, sheet_graph, write_graphs};
pub use json_writer::write_records_json;
pub use summary::{RunSummary, input_checksum};

use crate::aggregate::LineageTables;
use crate::config::OutputFormat;
use crate::constants::{FIELDS_DIR, SUMMARY_FILE};
use crate::core::LineageError;
use crate::utils::write_output;
use std::path::{Path, PathBuf};
use tracing::info;

/// Render the field table.
pub fn render_fields(
    tables: &LineageTables,
    format: OutputFormat,
) -> Result<Vec<u8>, LineageError> {
    let mut out = Vec::new();
    match format {
        OutputFormat::Csv => write_fields_csv(&mut out, &tables.fields)?,
        OutputFormat::Json => write_records_json(&mut out, &tables.fields)?,
    }
    Ok(out)
}

/// Render the dependency table.
pub fn render_dependencies(
    tables: &LineageTables,
    format: OutputFormat,
) -> Result<Vec<u8>, LineageError> {
    let mut out = Vec::new();
    match format {
        OutputFormat::Csv => write_dependencies_csv(&mut out, &tables.dependencies)?,
        OutputFormat::Json => write_records_json(&mut out, &tables.dependencies)?,
    }
    Ok(out)
}

/// Paths of both table files for a format.
pub fn table_paths(out_dir: &Path, format: OutputFormat) -> (PathBuf, PathBuf) {
    let dir = out_dir.join(FIELDS_DIR);
    (
        dir.join(format!("fields.{}", format.extension())),
        dir.join(format!("dependencies.{}", format.extension())),
    )
}

/// Write both tables below `<out_dir>/Fields`.
pub async fn write_tables(
    out_dir: &Path,
    tables: &LineageTables,
    format: OutputFormat,
) -> Result<(PathBuf, PathBuf), LineageError> {
    let (fields_path, dependencies_path) = table_paths(out_dir, format);
    write_output(&fields_path, render_fields(tables, format)?).await?;
    write_output(&dependencies_path, render_dependencies(tables, format)?).await?;
    info!("\t{} field rows written to {}", tables.fields.len(), fields_path.display());
    info!(
        "\t{} dependency rows written to {}",
        tables.dependencies.len(),
        dependencies_path.display()
    );
    Ok((fields_path, dependencies_path))
}

/// Write `summary.json` in `out_dir`.
pub async fn write_summary(out_dir: &Path, summary: &RunSummary) -> Result<PathBuf, LineageError> {
    let path = out_dir.join(SUMMARY_FILE);
    let mut content = serde_json::to_vec_pretty(summary)?;
    content.push(b'\n');
    write_output(&path, content).await?;
    Ok(path)
}
