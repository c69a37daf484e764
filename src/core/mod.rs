//! Core types for calclineage
//!
//! This module holds the vocabulary every other module speaks:
//!
//! - [`LineageError`] - typed failures of the engine and the output layer
//! - [`ErrorContext`] / [`user_friendly_error`] - what the CLI prints
//! - [`FieldId`], [`SheetId`], [`Node`] - synthetic identifiers
//! - [`Category`] - the closed field classification
//!
//! # Error Handling Pattern
//!
//! ```rust
//! use calclineage_cli::core::{LineageError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn resolve() -> Result<()> {
//!     Err(LineageError::UnknownField { name: "[Profit]".into() }.into())
//! }
//!
//! if let Err(e) = resolve() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.suggestion.is_some());
//! }
//! ```

pub mod error;
mod field;

pub use error::{ErrorContext, LineageError, user_friendly_error};
pub use field::{Category, FieldId, Node, SheetId};

/// Result alias for operations that fail with a [`LineageError`].
pub type Result<T> = std::result::Result<T, LineageError>;
