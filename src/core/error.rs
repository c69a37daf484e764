//! Error handling for calclineage
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`LineageError`]) for everything the engine and
//!    the output layer can fail on, so callers can match on the failure mode.
//! 2. **User-friendly messages** ([`ErrorContext`]) with details and an
//!    actionable suggestion when an error reaches the command line.
//!
//! # Error Categories
//!
//! - **Input**: [`LineageError::InputRead`], [`LineageError::InputParse`]
//! - **Graph**: [`LineageError::CyclicDependency`], [`LineageError::UnknownField`]
//! - **Identity**: [`LineageError::IdCollision`], [`LineageError::SaltExhausted`]
//! - **Configuration**: [`LineageError::ConfigError`], [`LineageError::TomlError`]
//! - **Output**: [`LineageError::OutputError`], [`LineageError::CsvError`],
//!   [`LineageError::JsonError`], [`LineageError::IoError`]
//! - **Control**: [`LineageError::Cancelled`]
//!
//! Resolution is pure and deterministic, so nothing here is retryable: an error
//! on the first attempt reproduces identically on the next.
//!
//! # Examples
//!
//! ```rust,no_run
//! use calclineage_cli::core::{ErrorContext, LineageError, user_friendly_error};
//!
//! let err = LineageError::CyclicDependency {
//!     chain: "[Sales].[A] → [Sales].[B] → [Sales].[A]".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(err));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for lineage extraction.
#[derive(Error, Debug)]
pub enum LineageError {
    /// The workbook export could not be read from disk.
    #[error("Failed to read workbook export '{path}'")]
    InputRead {
        /// Path of the export file
        path: String,
        /// Underlying reason
        reason: String,
    },

    /// The workbook export is not valid JSON or does not match the export schema.
    #[error("Invalid workbook export '{path}': {reason}")]
    InputParse {
        /// Path of the export file
        path: String,
        /// Parser message
        reason: String,
    },

    /// Calculated fields reference each other in a loop.
    ///
    /// The dependency relation must be acyclic for the transitive closure to
    /// terminate. `chain` lists the fields along the loop, closing on the
    /// first one again.
    #[error("Cyclic calculation dependency: {chain}")]
    CyclicDependency {
        /// Rendered loop, e.g. `A → B → A`
        chain: String,
    },

    /// A field requested by name does not exist in the workbook.
    #[error("Field '{name}' not found")]
    UnknownField {
        /// The label or id that was requested
        name: String,
    },

    /// Two generated identifiers overlap, which would break substring matching.
    #[error("Synthetic identifiers '{first}' and '{second}' overlap")]
    IdCollision {
        /// The shorter identifier
        first: String,
        /// The identifier containing it
        second: String,
    },

    /// No salt could be drawn that is absent from every calculation.
    #[error("Could not generate a collision-free identifier salt after {attempts} attempts")]
    SaltExhausted {
        /// Number of draws attempted
        attempts: usize,
    },

    /// Configuration value out of range or file unusable.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// A result file could not be written.
    #[error("Failed to write output '{path}': {reason}")]
    OutputError {
        /// Target path
        path: String,
        /// Underlying reason
        reason: String,
    },

    /// Cooperative cancellation was requested during graph generation.
    #[error("Operation cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for LineageError {
    fn clone(&self) -> Self {
        match self {
            Self::InputRead {
                path,
                reason,
            } => Self::InputRead {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::InputParse {
                path,
                reason,
            } => Self::InputParse {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::CyclicDependency {
                chain,
            } => Self::CyclicDependency {
                chain: chain.clone(),
            },
            Self::UnknownField {
                name,
            } => Self::UnknownField {
                name: name.clone(),
            },
            Self::IdCollision {
                first,
                second,
            } => Self::IdCollision {
                first: first.clone(),
                second: second.clone(),
            },
            Self::SaltExhausted {
                attempts,
            } => Self::SaltExhausted {
                attempts: *attempts,
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::OutputError {
                path,
                reason,
            } => Self::OutputError {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::Cancelled => Self::Cancelled,
            // Foreign errors are not Clone; keep their message
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::CsvError(e) => Self::Other {
                message: format!("CSV error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information.
///
/// When displayed, errors show the main message in red, optional details in
/// yellow and an optional suggestion in green.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The underlying error
    pub error: LineageError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: LineageError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with an actionable suggestion.
///
/// Recognizes [`LineageError`] anywhere in the chain, plain IO errors, and
/// falls back to a generic context that keeps the full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(ctx) = error.chain().find_map(|e| e.downcast_ref::<ErrorContext>()) {
        return ctx.clone();
    }

    if let Some(lineage_error) = error.chain().find_map(|e| e.downcast_ref::<LineageError>()) {
        let mut ctx = create_error_context(lineage_error.clone());
        // Keep outer anyhow context (e.g. which command failed) visible
        let outer = error.to_string();
        if outer != lineage_error.to_string() && ctx.details.is_none() {
            ctx.details = Some(outer);
        }
        return ctx;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(LineageError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(LineageError::Other {
                    message: error.to_string(),
                })
                .with_suggestion(
                    "Check file ownership or choose another output directory with --out",
                );
            }
            _ => {}
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(LineageError::Other {
        message,
    })
}

fn create_error_context(error: LineageError) -> ErrorContext {
    match &error {
        LineageError::InputRead { path, reason } => {
            let details = format!("{path}: {reason}");
            ErrorContext::new(error)
                .with_suggestion("Check the path to the workbook export and that it is readable")
                .with_details(details)
        }
        LineageError::InputParse { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Re-export the workbook; the file must be a JSON object with a 'datasources' array",
            )
            .with_details(
                "Each data source needs a 'name' and a 'fields' array; each field needs an 'id'",
            ),
        LineageError::CyclicDependency { .. } => ErrorContext::new(error)
            .with_suggestion("Break the loop by editing one of the listed calculated fields")
            .with_details("Calculated fields cannot depend on themselves directly or indirectly"),
        LineageError::UnknownField { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Use the field label as shown in the field table, \
                 e.g. '[Sales].[Profit]' or '[Profit]'",
            ),
        LineageError::SaltExhausted { .. } => ErrorContext::new(error)
            .with_suggestion("Run again with a different --seed"),
        LineageError::ConfigError { .. } | LineageError::TomlError(_) => ErrorContext::new(error)
            .with_suggestion(
                "Check the configuration file (see 'calclineage --help' for the --config flag)",
            ),
        LineageError::OutputError { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Check that the output directory is writable, or pass another one with --out",
            ),
        LineageError::Cancelled => ErrorContext::new(error)
            .with_details(
                "Tables written before cancellation are complete; graph files may be partial",
            ),
        _ => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LineageError::CyclicDependency {
            chain: "A → B → A".to_string(),
        };
        assert_eq!(err.to_string(), "Cyclic calculation dependency: A → B → A");

        let err = LineageError::UnknownField {
            name: "[Profit]".to_string(),
        };
        assert_eq!(err.to_string(), "Field '[Profit]' not found");
    }

    #[test]
    fn test_error_context_display_includes_details_and_suggestion() {
        let ctx = ErrorContext::new(LineageError::Cancelled)
            .with_details("stopped")
            .with_suggestion("run again");
        let rendered = ctx.to_string();
        assert!(rendered.contains("Operation cancelled"));
        assert!(rendered.contains("Details: stopped"));
        assert!(rendered.contains("Suggestion: run again"));
    }

    #[test]
    fn test_user_friendly_error_finds_lineage_error_in_chain() {
        let err = anyhow::Error::from(LineageError::CyclicDependency {
            chain: "A → A".to_string(),
        })
        .context("Failed to resolve dependencies");

        let ctx = user_friendly_error(err);
        assert!(matches!(ctx.error, LineageError::CyclicDependency { .. }));
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn test_user_friendly_error_generic_keeps_chain() {
        let err = anyhow::anyhow!("inner").context("outer");
        let ctx = user_friendly_error(err);
        let rendered = ctx.error.to_string();
        assert!(rendered.contains("outer"));
        assert!(rendered.contains("Caused by"));
        assert!(rendered.contains("inner"));
    }

    #[test]
    fn test_clone_converts_foreign_errors() {
        let io = LineageError::IoError(std::io::Error::other("disk"));
        match io.clone() {
            LineageError::Other { message } => assert!(message.contains("disk")),
            other => panic!("unexpected clone: {other:?}"),
        }
    }
}
