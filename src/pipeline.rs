//! End-to-end analysis run.
//!
//! `analyze` drives the stages in order and logs each one through a
//! [`StepLog`]:
//!
//! 1. read and parse the workbook export
//! 2. build the catalog (dedup, ids, classification, normalization)
//! 3. resolve every field's backward and forward closure
//! 4. aggregate into the field and dependency tables
//! 5. write tables and summary, then optional graphs and archive
//!
//! Everything between reading the input and writing the output is pure.

use crate::aggregate::LineageTables;
use crate::catalog::Catalog;
use crate::config::LineageConfig;
use crate::constants::OUTPUT_DIR_SUFFIX;
use crate::core::LineageError;
use crate::model::RawWorkbook;
use crate::output::{self, RunSummary};
use crate::resolver::{FieldGraph, FieldLineage, resolve_all, resolve_all_parallel};
use crate::utils::{CancellationFlag, ensure_dir};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Numbered step logger: every call logs `STEP n: message` at info level.
#[derive(Debug, Default)]
pub struct StepLog {
    counter: AtomicUsize,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log the next step and return its rendered line.
    pub fn step(&self, message: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let line = format!("STEP {n}: {message}");
        info!("{}", line);
        line
    }

    /// Number of steps logged so far.
    pub fn count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }
}

/// Default output directory: `<input> Files` next to the input.
pub fn default_output_dir(input: &Path) -> PathBuf {
    let mut name = input.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(OUTPUT_DIR_SUFFIX);
    input.with_file_name(name)
}

/// A parsed workbook export together with its raw bytes.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub workbook: RawWorkbook,
    pub content: Vec<u8>,
}

/// Read and parse a workbook export.
pub async fn load_input(path: &Path) -> Result<LoadedInput, LineageError> {
    let content = tokio::fs::read(path).await.map_err(|e| LineageError::InputRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let text = String::from_utf8_lossy(&content);
    let workbook = RawWorkbook::from_json(&text, &path.display().to_string())?;
    Ok(LoadedInput { workbook, content })
}

/// Resolve all fields, in parallel when more than one worker is configured.
pub fn resolve(graph: &FieldGraph<'_>, workers: usize) -> Result<Vec<FieldLineage>, LineageError> {
    if workers > 1 { resolve_all_parallel(graph, workers) } else { resolve_all(graph) }
}

/// Inputs of one `analyze` run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub config: LineageConfig,
    pub show_progress: bool,
    pub cancel: CancellationFlag,
}

/// Where a run left its results.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub summary: RunSummary,
    pub out_dir: PathBuf,
    pub fields_path: PathBuf,
    pub dependencies_path: PathBuf,
    pub summary_path: PathBuf,
    pub archive_path: Option<PathBuf>,
}

/// Run the full analysis.
pub async fn run_analysis(request: &AnalysisRequest) -> Result<AnalysisReport> {
    let config = &request.config;
    config.validate()?;
    let steps = StepLog::new();

    steps.step("Read data sources and fields from the workbook export");
    let loaded = load_input(&request.input).await?;
    info!(
        "\t{} data sources, {} field rows",
        loaded.workbook.datasources.len(),
        loaded.workbook.field_count()
    );

    steps.step("Process fields");
    let catalog = Catalog::build(&loaded.workbook, &config.identity_options())
        .context("Failed to build the field catalog")?;
    info!("\t{} fields, {} worksheets", catalog.len(), catalog.sheets().len());

    steps.step("Process dependencies");
    let graph = FieldGraph::new(&catalog);
    let lineages = resolve(&graph, config.workers)?;
    let labels = catalog.label_map()?;
    let tables = LineageTables::build(&catalog, &lineages, &labels);
    info!(
        "\t{} dependency rows, {} unused fields",
        tables.dependencies.len(),
        tables.unused_count()
    );

    steps.step("Save table results");
    ensure_dir(&request.out_dir)?;
    let (fields_path, dependencies_path) =
        output::write_tables(&request.out_dir, &tables, config.format).await?;

    let mut summary = RunSummary::new(
        &request.input.display().to_string(),
        &loaded.content,
        config.seed,
        config.format,
        &catalog,
        &tables,
    );

    if config.graphs {
        steps.step("Create field and sheet dependency graphs");
        let stats = output::write_graphs(
            &catalog,
            &lineages,
            &request.out_dir,
            &request.cancel,
            request.show_progress,
        )?;
        summary.field_graphs = stats.field_graphs;
        summary.sheet_graphs = stats.sheet_graphs;
    }

    let summary_path = output::write_summary(&request.out_dir, &summary).await?;

    let archive_path = if config.archive {
        steps.step("Archive output directory");
        request.cancel.check()?;
        let destination = output::archive_path(&request.out_dir);
        let dir = request.out_dir.clone();
        let target = destination.clone();
        let stored = tokio::task::spawn_blocking(move || output::zip_directory(&dir, &target))
            .await
            .context("Archive task failed")??;
        info!("\t{} files archived to {}", stored, destination.display());
        Some(destination)
    } else {
        None
    };

    Ok(AnalysisReport {
        summary,
        out_dir: request.out_dir.clone(),
        fields_path,
        dependencies_path,
        summary_path,
        archive_path,
    })
}
