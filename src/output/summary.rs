//! Run summary written next to the tables.

use crate::aggregate::LineageTables;
use crate::catalog::Catalog;
use crate::config::OutputFormat;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// `sha256:<hex>` digest of the input bytes.
pub fn input_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Contents of `summary.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub version: String,
    pub input: String,
    pub input_checksum: String,
    pub seed: u64,
    pub salt: String,
    pub format: OutputFormat,
    pub input_rows: usize,
    pub duplicates_removed: usize,
    pub parameter_duplicates_removed: usize,
    pub fields: usize,
    pub sheets: usize,
    pub dependency_rows: usize,
    pub unused_fields: usize,
    pub field_graphs: usize,
    pub sheet_graphs: usize,
}

impl RunSummary {
    pub fn new(
        input: &str,
        content: &[u8],
        seed: u64,
        format: OutputFormat,
        catalog: &Catalog,
        tables: &LineageTables,
    ) -> Self {
        let stats = catalog.stats();
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            input: input.to_string(),
            input_checksum: input_checksum(content),
            seed,
            salt: catalog.salt().to_string(),
            format,
            input_rows: stats.input_rows,
            duplicates_removed: stats.duplicates_removed,
            parameter_duplicates_removed: stats.parameter_duplicates_removed,
            fields: catalog.len(),
            sheets: catalog.sheets().len(),
            dependency_rows: tables.dependencies.len(),
            unused_fields: tables.unused_count(),
            field_graphs: 0,
            sheet_graphs: 0,
        }
    }
}
