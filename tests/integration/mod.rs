//! Integration test suite for calclineage
//!
//! End-to-end tests that run the `calclineage` binary against workbook
//! exports written to a temporary directory.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **analyze**: table, summary, graph and archive output
//! - **config**: configuration files and command-line overrides
//! - **errors**: exit codes and messages for bad input
//! - **tree**: single-field trees and suggestions
//! - **validate**: validation reports and strict mode

#[path = "../common/mod.rs"]
mod common;

mod analyze;
mod config;
mod errors;
mod tree;
mod validate;
