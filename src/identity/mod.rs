//! Identity and classification.
//!
//! Turns the flattened export into uniquely identified, classified rows:
//!
//! 1. [`dedup`] keeps one row per `[source].[field]` and removes parameter
//!    echoes and the measure-names pseudo field.
//! 2. [`salt`] draws a salt that never occurs in calculation text and
//!    allocates `[<salt><n>]` field ids and `[<salt>sh<n>]` sheet ids.
//! 3. [`classify`] assigns each field its [`Category`](crate::core::Category).
//! 4. [`labels`] and [`sheets`] provide the human-readable side.
//!
//! The catalog ([`crate::catalog`]) drives these steps in order.

pub mod classify;
pub mod dedup;
pub mod labels;
pub mod salt;
pub mod sheets;

pub use classify::{classify, has_lod_block};
pub use dedup::{FieldRow, flatten, remove_duplicates_by_weight, remove_parameter_duplicates};
pub use labels::{caption_label, sheet_label};
pub use salt::{IdAllocator, generate_salt};
pub use sheets::SheetRegistry;

use crate::constants::{
    DEFAULT_MEASURE_NAMES_FIELD, DEFAULT_PARAMETERS_SOURCE, DEFAULT_SALT_LENGTH, DEFAULT_SEED,
};

/// Knobs for identity assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityOptions {
    /// Seed of the salt generator
    pub seed: u64,
    /// Number of letters in the salt
    pub salt_length: usize,
    /// Raw name of the data source holding parameters
    pub parameters_source: String,
    /// Field id of the measure-names pseudo field
    pub measure_names_field: String,
}

impl Default for IdentityOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            salt_length: DEFAULT_SALT_LENGTH,
            parameters_source: DEFAULT_PARAMETERS_SOURCE.to_string(),
            measure_names_field: DEFAULT_MEASURE_NAMES_FIELD.to_string(),
        }
    }
}
