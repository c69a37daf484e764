//! Calculation normalization.
//!
//! Rewrites a raw calculation so that every field reference, whatever its
//! spelling, becomes the referenced field's synthetic id:
//!
//! 1. `//` comments and leading blank lines are stripped.
//! 2. Qualified references `[source].[field]` become ids.
//! 3. Remaining bare references `[field]` become `[thisSource].[field]`.
//! 4. Ids from step 2 are expanded back to their qualified form.
//! 5. Qualified references become ids again.
//!
//! Step 3 only rewrites bracket tokens that are known field names and are not
//! already part of a qualified reference or a synthetic id, which makes the
//! whole transformation idempotent.

use super::tokens::{bracket_tokens, is_qualified, is_qualifier};
use crate::core::FieldId;
use std::collections::{HashMap, HashSet};

/// Normalizer over one workbook's reference table.
#[derive(Debug, Clone)]
pub struct CalculationNormalizer {
    /// `[source].[field]` → id; the first field wins a repeated reference
    compressed: HashMap<String, FieldId>,
    /// id → `[source].[field]`
    expanded: HashMap<String, String>,
    /// Every bracketed field name of every source
    local_names: HashSet<String>,
}

impl CalculationNormalizer {
    /// Build a normalizer from the qualified-reference table and the set of
    /// known local field names.
    pub fn new<I>(references: Vec<(String, FieldId)>, local_names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut compressed = HashMap::with_capacity(references.len());
        let mut expanded = HashMap::with_capacity(references.len());
        for (qualified, id) in references {
            expanded.insert(id.as_str().to_string(), qualified.clone());
            compressed.entry(qualified).or_insert(id);
        }
        Self {
            compressed,
            expanded,
            local_names: local_names.into_iter().collect(),
        }
    }

    /// Normalize a calculation of a field living in `this_source`
    /// (bracketed raw source name).
    #[must_use]
    pub fn normalize(&self, calculation: &str, this_source: &str) -> String {
        let text = strip_comments(calculation);
        if text.is_empty() {
            return text;
        }

        let text = self.compress(&text);
        let text = self.qualify_local(&text, this_source);
        let text = self.expand(&text);
        self.compress(&text)
    }

    /// Replace each whole `[source].[field]` token pair naming a known field
    /// by its id.
    fn compress(&self, text: &str) -> String {
        let tokens = bracket_tokens(text);
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut i = 0;

        while i + 1 < tokens.len() {
            let (source, field) = (&tokens[i], &tokens[i + 1]);
            let id = (field.start == source.end + 1 && is_qualifier(text, source))
                .then(|| self.compressed.get(&text[source.start..field.end]))
                .flatten();
            match id {
                Some(id) => {
                    out.push_str(&text[cursor..source.start]);
                    out.push_str(id.as_str());
                    cursor = field.end;
                    i += 2;
                }
                None => i += 1,
            }
        }

        out.push_str(&text[cursor..]);
        out
    }

    /// Replace each synthetic id token by its qualified reference.
    fn expand(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;

        for token in bracket_tokens(text) {
            if let Some(qualified) = self.expanded.get(token.text) {
                out.push_str(&text[cursor..token.start]);
                out.push_str(qualified);
                cursor = token.end;
            }
        }

        out.push_str(&text[cursor..]);
        out
    }

    fn qualify_local(&self, text: &str, this_source: &str) -> String {
        let mut out = String::with_capacity(text.len() + this_source.len());
        let mut cursor = 0;

        for token in bracket_tokens(text) {
            let bare = self.local_names.contains(token.text)
                && !self.expanded.contains_key(token.text)
                && !is_qualifier(text, &token)
                && !is_qualified(text, &token);
            if bare {
                out.push_str(&text[cursor..token.start]);
                out.push_str(this_source);
                out.push('.');
                out.push_str(token.text);
                cursor = token.end;
            }
        }

        out.push_str(&text[cursor..]);
        out
    }
}

/// Remove `//` comments and leading blank lines.
///
/// A comment runs to the end of its line and takes the line break with it.
#[must_use]
pub fn strip_comments(calculation: &str) -> String {
    let mut text = calculation.to_string();
    while let Some(start) = text.find("//") {
        match text[start..].find('\n') {
            Some(offset) => text.replace_range(start..=start + offset, ""),
            None => text.truncate(start),
        }
    }
    text.trim_start_matches(['\n', '\r']).to_string()
}
