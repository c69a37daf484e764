//! Validate a workbook export without writing any output.
//!
//! Checks performed:
//!
//! 1. The export parses and every field gets an identity
//! 2. Duplicate and parameter-echo rows (reported, never fatal)
//! 3. Qualified references to fields the workbook does not define (warnings)
//! 4. Cyclic dependencies between calculated fields (errors)
//!
//! With `--strict`, warnings fail validation too.
//!
//! # Examples
//!
//! ```bash
//! calclineage validate book.json
//! calclineage validate book.json --strict --format json
//! ```

use super::CliConfig;
use crate::calculation::unresolved_references;
use crate::catalog::Catalog;
use crate::identity::IdentityOptions;
use crate::model::RawWorkbook;
use crate::pipeline::load_input;
use crate::resolver::FieldGraph;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// Output format for validation results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ValidateFormat {
    /// Human-readable text with colors
    #[default]
    Text,
    /// Structured JSON
    Json,
}

/// Command to validate a workbook export.
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Workbook export (JSON) to validate
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ValidateFormat::Text)]
    pub format: ValidateFormat,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Results of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub datasources: usize,
    pub input_rows: usize,
    pub duplicates_removed: usize,
    pub parameter_duplicates_removed: usize,
    pub fields: usize,
    pub calculated_fields: usize,
    pub sheets: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Validate a parsed export.
pub fn validate_workbook(workbook: &RawWorkbook, options: &IdentityOptions) -> ValidationReport {
    let mut report = ValidationReport {
        datasources: workbook.datasources.len(),
        input_rows: workbook.field_count(),
        ..ValidationReport::default()
    };

    let catalog = match Catalog::build(workbook, options) {
        Ok(catalog) => catalog,
        Err(e) => {
            report.errors.push(e.to_string());
            return report;
        }
    };

    let stats = catalog.stats();
    report.duplicates_removed = stats.duplicates_removed;
    report.parameter_duplicates_removed = stats.parameter_duplicates_removed;
    report.fields = catalog.len();
    report.calculated_fields =
        catalog.fields().iter().filter(|f| f.category.is_calculated()).count();
    report.sheets = catalog.sheets().len();

    for field in catalog.fields() {
        for reference in unresolved_references(&field.normalized_calculation) {
            report
                .warnings
                .push(format!("{} references unknown field {}", field.qualified_label, reference));
        }
    }

    if let Err(e) = FieldGraph::new(&catalog).detect_cycles() {
        report.errors.push(e.to_string());
    }

    report.valid = report.errors.is_empty();
    report
}

impl ValidateCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let config = cli.load_config().await?;
        config.validate()?;
        let loaded = load_input(&self.input).await?;

        let mut report = validate_workbook(&loaded.workbook, &config.identity_options());
        if self.strict && !report.warnings.is_empty() {
            report.errors.extend(report.warnings.iter().cloned());
            report.valid = false;
        }

        match self.format {
            ValidateFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            ValidateFormat::Text => print_report(&report, cli.log_level.is_none()),
        }

        if report.valid {
            Ok(())
        } else if self.strict {
            Err(anyhow::anyhow!("Strict mode validation failed"))
        } else {
            Err(anyhow::anyhow!("Validation failed with {} error(s)", report.errors.len()))
        }
    }
}

fn print_report(report: &ValidationReport, quiet: bool) {
    if !quiet {
        println!(
            "{} {} fields ({} calculated) in {} data sources, {} worksheets",
            "✓".green(),
            report.fields,
            report.calculated_fields,
            report.datasources,
            report.sheets
        );
        if report.duplicates_removed + report.parameter_duplicates_removed > 0 {
            println!(
                "  {} duplicate rows, {} parameter echoes removed",
                report.duplicates_removed, report.parameter_duplicates_removed
            );
        }
        for warning in &report.warnings {
            println!("{} {}", "⚠".yellow(), warning);
        }
    }
    for error in &report.errors {
        println!("{} {}", "✗".red(), error);
    }
    if report.valid && !quiet {
        println!("{}", "✓ Valid".green().bold());
    }
}
