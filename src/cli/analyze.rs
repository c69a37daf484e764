//! Full lineage analysis of a workbook export.
//!
//! Reads the export, resolves every field and writes:
//!
//! - `<out>/Fields/fields.<ext>` and `<out>/Fields/dependencies.<ext>`
//! - `<out>/summary.json`
//! - `<out>/Graphs/...` with `--graphs`
//! - `<out>.zip` next to the directory with `--archive`
//!
//! The output directory defaults to `<input> Files` beside the input.

use super::CliConfig;
use crate::config::{ConfigOverrides, OutputFormat};
use crate::pipeline::{AnalysisRequest, default_output_dir, run_analysis};
use crate::utils::CancellationFlag;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

/// Command to analyze a workbook export.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeCommand {
    /// Workbook export (JSON) to analyze
    pub input: PathBuf,

    /// Output directory (defaults to "<input> Files")
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Table format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Seed of the identifier salt generator
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Write Graphviz DOT graphs per field and per sheet
    #[arg(long)]
    pub graphs: bool,

    /// Zip the output directory when done
    #[arg(long)]
    pub archive: bool,

    /// Worker threads for dependency resolution
    #[arg(short, long)]
    pub workers: Option<usize>,
}

impl AnalyzeCommand {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            seed: self.seed,
            format: self.format,
            graphs: self.graphs,
            archive: self.archive,
            workers: self.workers,
        }
    }

    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let config = cli
            .load_config()
            .await
            .context("Failed to load configuration")?
            .with_overrides(&self.overrides());

        let out_dir = self.out.clone().unwrap_or_else(|| default_output_dir(&self.input));
        let cancel = CancellationFlag::new();
        cancel.cancel_on_ctrl_c();

        let request = AnalysisRequest {
            input: self.input.clone(),
            out_dir,
            config,
            show_progress: cli.show_progress(),
            cancel,
        };

        let report = run_analysis(&request)
            .await
            .with_context(|| format!("Failed to analyze {}", self.input.display()))?;

        if cli.log_level.is_some() {
            let summary = &report.summary;
            println!(
                "{} {} fields, {} dependency rows, {} unused",
                "✓".green().bold(),
                summary.fields,
                summary.dependency_rows,
                summary.unused_fields.to_string().yellow()
            );
            println!("  {} {}", "fields:".bright_black(), report.fields_path.display());
            println!("  {} {}", "dependencies:".bright_black(), report.dependencies_path.display());
            if summary.field_graphs + summary.sheet_graphs > 0 {
                println!(
                    "  {} {} field / {} sheet graphs",
                    "graphs:".bright_black(),
                    summary.field_graphs,
                    summary.sheet_graphs
                );
            }
            if let Some(archive) = &report.archive_path {
                println!("  {} {}", "archive:".bright_black(), archive.display());
            }
        }
        Ok(())
    }
}
