//! calclineage - field-level lineage for workbook calculated fields
//!
//! Reads a JSON export of a workbook's data sources and fields, and for every
//! field computes the full upstream (backward) and downstream (forward)
//! dependency closure, with distance levels, category tags and worksheet
//! overlap. Results are written as a field table and a dependency table,
//! optionally with Graphviz graphs per field and per worksheet.
//!
//! # Architecture Overview
//!
//! ```text
//! export ─▶ model ─▶ identity ─▶ calculation ─▶ catalog ─▶ resolver ─▶ aggregate ─▶ output
//!                    (dedup,      (normalize,               (closures)   (tables)     (csv/json,
//!                     ids)         extract)                                            dot, zip)
//! ```
//!
//! Everything between reading the export and writing the results is pure
//! and deterministic: the same input and seed give byte-identical tables.
//!
//! # Core Modules
//!
//! - [`model`] - serde shape of the workbook export
//! - [`identity`] - deduplication, synthetic ids and classification
//! - [`calculation`] - normalization of calculation text and dependency extraction
//! - [`catalog`] - the processed, immutable field set of one run
//! - [`resolver`] - memoized backward/forward closure engine
//! - [`aggregate`] - per-field statistics and the two output tables
//! - [`output`] - CSV/JSON writers, run summary, DOT graphs and archive
//! - [`pipeline`] - the end-to-end `analyze` run
//!
//! ## Supporting Modules
//!
//! - [`cli`] - command-line interface
//! - [`config`] - TOML configuration with command-line overrides
//! - [`core`] - shared identifier types and error handling
//! - [`utils`] - file helpers, progress bars and cancellation
//!
//! # Example
//!
//! ```rust,no_run
//! use calclineage_cli::aggregate::LineageTables;
//! use calclineage_cli::catalog::Catalog;
//! use calclineage_cli::identity::IdentityOptions;
//! use calclineage_cli::pipeline::load_input;
//! use calclineage_cli::resolver::{FieldGraph, resolve_all};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let input = load_input(std::path::Path::new("book.json")).await?;
//! let catalog = Catalog::build(&input.workbook, &IdentityOptions::default())?;
//! let graph = FieldGraph::new(&catalog);
//! let lineages = resolve_all(&graph)?;
//! let tables = LineageTables::build(&catalog, &lineages, &catalog.label_map()?);
//! println!("{} unused fields", tables.unused_count());
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod calculation;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod identity;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod resolver;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
