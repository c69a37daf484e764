//! Calculation text processing: reference scanning, normalization,
//! direct-dependency extraction and label translation.

pub mod extractor;
pub mod labels;
pub mod normalizer;
pub mod tokens;

pub use extractor::{extract_dependencies, unresolved_references};
pub use labels::LabelMap;
pub use normalizer::{CalculationNormalizer, strip_comments};
pub use tokens::{BracketToken, bracket_tokens};
