//! Field classification.

use crate::core::Category;
use regex::Regex;
use std::sync::LazyLock;

/// A `{ ... }` block; `[^}]` also matches line breaks.
static LOD_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{[^}]*\}").expect("valid regex literal"));

/// Classify a field from where it lives and its normalized calculation.
///
/// Rules are evaluated in order: parameters first, then level-of-detail
/// calculations, then any other calculation, and plain fields last. A
/// parameter with a calculation is still a parameter.
#[must_use]
pub fn classify(in_parameters_source: bool, calculation: &str) -> Category {
    if in_parameters_source {
        Category::Parameter
    } else if has_lod_block(calculation) {
        Category::CalculatedFieldLod
    } else if !calculation.is_empty() {
        Category::CalculatedField
    } else {
        Category::Field
    }
}

/// Whether the text contains a `{ ... }` block, line breaks allowed inside.
#[must_use]
pub fn has_lod_block(calculation: &str) -> bool {
    LOD_BLOCK.is_match(calculation)
}
