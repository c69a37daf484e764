//! Command-line interface for calclineage.
//!
//! # Commands
//!
//! - `analyze` - resolve lineage for every field and write the output tables
//! - `tree` - print the upstream and/or downstream closure of one field
//! - `validate` - check an export for duplicates, dangling references and cycles
//!
//! # Global Options
//!
//! - `--verbose` / `-v`: debug logging
//! - `--quiet` / `-q`: errors only
//! - `--config` / `-c`: configuration file (also `CALCLINEAGE_CONFIG`)
//! - `--no-progress`: never draw progress bars
//!
//! `RUST_LOG`, when set, takes precedence over `--verbose` and `--quiet`.
//!
//! # Examples
//!
//! ```bash
//! calclineage analyze "Sales.json"
//! calclineage analyze "Sales.json" --format json --graphs --archive
//! calclineage tree "Sales.json" "[Profit Ratio]" --direction backward
//! calclineage validate "Sales.json" --format json
//! ```

mod analyze;
mod tree;
mod validate;

pub use analyze::AnalyzeCommand;
pub use tree::{Direction, TreeCommand, TreeFormat};
pub use validate::{ValidateCommand, ValidationReport};

use crate::config::LineageConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings shared by every command, derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` leaves logging to `RUST_LOG` only
    pub log_level: Option<String>,
    /// Never draw progress bars
    pub no_progress: bool,
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether progress bars may be drawn.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        !self.no_progress
    }

    /// Load the run configuration this CLI invocation points at.
    pub async fn load_config(&self) -> Result<LineageConfig> {
        LineageConfig::load_with_optional(self.config_path.clone()).await
    }

    /// Install the global tracing subscriber.
    ///
    /// Later calls are ignored, which keeps repeated in-process invocations
    /// (tests) harmless.
    pub fn init_logging(&self) {
        let filter = match (std::env::var("RUST_LOG").is_ok(), &self.log_level) {
            (true, _) => EnvFilter::from_default_env(),
            (false, Some(level)) => EnvFilter::new(level),
            (false, None) => EnvFilter::new("error"),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }
}

/// Field-level lineage for workbook calculated fields.
#[derive(Parser)]
#[command(
    name = "calclineage",
    about = "Field-level lineage for workbook calculated fields",
    version,
    author,
    long_about = "calclineage reads a workbook export, resolves every field's upstream and \
                  downstream dependencies, and writes field and dependency tables, with \
                  optional Graphviz graphs."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to a configuration file
    #[arg(short, long, global = true, env = "CALCLINEAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Disable progress bars
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve lineage for every field and write the output tables
    Analyze(AnalyzeCommand),

    /// Show the dependency tree of one field
    Tree(TreeCommand),

    /// Check a workbook export without writing anything
    Validate(ValidateCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Derive the shared settings from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress || self.quiet,
            config_path: self.config.clone(),
        }
    }

    /// Execute with explicit settings.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Analyze(cmd) => cmd.execute(&config).await,
            Commands::Tree(cmd) => cmd.execute(&config).await,
            Commands::Validate(cmd) => cmd.execute(&config).await,
        }
    }
}
