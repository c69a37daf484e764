//! Direct-dependency extraction.

use super::tokens::{bracket_tokens, is_qualifier};
use crate::core::FieldId;

/// Ids occurring in a normalized calculation, in the order of `known`.
///
/// Plain substring matching is sound because synthetic ids are
/// prefix-disjoint. Cost is linear in the number of known ids per
/// calculation, which is fine for workbook-sized inputs.
pub fn extract_dependencies<'a, I>(normalized: &str, known: I) -> Vec<FieldId>
where
    I: IntoIterator<Item = &'a FieldId>,
{
    if normalized.is_empty() {
        return Vec::new();
    }
    known.into_iter().filter(|id| normalized.contains(id.as_str())).cloned().collect()
}

/// Qualified `[source].[field]` references left in a normalized calculation.
///
/// Every known reference has been replaced by its id, so whatever qualified
/// text remains points at a field the workbook does not define.
pub fn unresolved_references(normalized: &str) -> Vec<String> {
    let tokens = bracket_tokens(normalized);
    tokens
        .windows(2)
        .filter(|pair| is_qualifier(normalized, &pair[0]) && pair[1].start == pair[0].end + 1)
        .map(|pair| normalized[pair[0].start..pair[1].end].to_string())
        .collect()
}
