//! Configuration for calclineage.
//!
//! Settings come from an optional TOML file, by default
//! `~/.calclineage/config.toml` (`%LOCALAPPDATA%\calclineage\config.toml` on
//! Windows), and are overridden by command-line flags. A missing file means
//! defaults.
//!
//! ```toml
//! seed = 10
//! salt_length = 10
//! parameters_source = "Parameters"
//! measure_names_field = "[:Measure Names]"
//! format = "json"
//! graphs = true
//! archive = false
//! workers = 4
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use calclineage_cli::config::LineageConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = LineageConfig::load_with_optional(None).await?;
//! config.validate()?;
//! println!("Seed {}", config.seed);
//! # Ok(())
//! # }
//! ```

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_MEASURE_NAMES_FIELD, DEFAULT_PARAMETERS_SOURCE,
    DEFAULT_SALT_LENGTH, DEFAULT_SEED,
};
use crate::core::LineageError;
use crate::identity::IdentityOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Table file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// Pretty-printed JSON
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LineageConfig {
    /// Seed of the identifier salt generator
    pub seed: u64,
    /// Number of letters in the identifier salt
    pub salt_length: usize,
    /// Raw name of the data source holding parameters
    pub parameters_source: String,
    /// Pseudo field that is always dropped
    pub measure_names_field: String,
    /// Table format
    pub format: OutputFormat,
    /// Write DOT dependency graphs
    pub graphs: bool,
    /// Zip the output directory when done
    pub archive: bool,
    /// Resolution worker threads; 1 resolves on the calling thread
    pub workers: usize,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            salt_length: DEFAULT_SALT_LENGTH,
            parameters_source: DEFAULT_PARAMETERS_SOURCE.to_string(),
            measure_names_field: DEFAULT_MEASURE_NAMES_FIELD.to_string(),
            format: OutputFormat::default(),
            graphs: false,
            archive: false,
            workers: 1,
        }
    }
}

/// Values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub seed: Option<u64>,
    pub format: Option<OutputFormat>,
    pub graphs: bool,
    pub archive: bool,
    pub workers: Option<usize>,
}

impl LineageConfig {
    /// Load from `path` when given, else from the default location, else
    /// defaults when no file exists there.
    ///
    /// An explicitly given path must exist.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(&path).await,
            None => match Self::default_path() {
                Ok(path) if path.exists() => Self::load_from(&path).await,
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .map_err(LineageError::from)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("calclineage")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(CONFIG_DIR_NAME)
        };

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    /// Apply command-line values on top of this configuration.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(seed) = overrides.seed {
            self.seed = seed;
        }
        if let Some(format) = overrides.format {
            self.format = format;
        }
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        self.graphs |= overrides.graphs;
        self.archive |= overrides.archive;
        self
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), LineageError> {
        if self.salt_length == 0 {
            return Err(LineageError::ConfigError {
                message: "salt_length must be at least 1".to_string(),
            });
        }
        if self.workers == 0 {
            return Err(LineageError::ConfigError {
                message: "workers must be at least 1".to_string(),
            });
        }
        if self.parameters_source.trim().is_empty() {
            return Err(LineageError::ConfigError {
                message: "parameters_source must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Identity options derived from this configuration.
    #[must_use]
    pub fn identity_options(&self) -> IdentityOptions {
        IdentityOptions {
            seed: self.seed,
            salt_length: self.salt_length,
            parameters_source: self.parameters_source.clone(),
            measure_names_field: self.measure_names_field.clone(),
        }
    }
}
