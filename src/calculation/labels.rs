//! Translation of synthetic ids back to human-readable labels.

use crate::core::LineageError;
use regex::Regex;
use std::collections::HashMap;

/// Replaces synthetic field and sheet ids with their labels.
///
/// Fields map to their qualified label (`[Sales].[Profit]`), sheets to their
/// sheet label (`[Overview]`). Translation then drops the subject's own
/// source prefix so internal references read as bare `[Profit]`.
#[derive(Debug, Clone)]
pub struct LabelMap {
    pattern: Regex,
    labels: HashMap<String, String>,
}

impl LabelMap {
    /// Build a map for ids generated from `salt`.
    pub fn new(salt: &str, labels: HashMap<String, String>) -> Result<Self, LineageError> {
        let pattern = Regex::new(&format!(r"\[{}(?:sh)?\d+\]", regex::escape(salt))).map_err(
            |e| LineageError::Other {
                message: format!("Invalid identifier pattern for salt '{salt}': {e}"),
            },
        )?;
        Ok(Self {
            pattern,
            labels,
        })
    }

    /// Label of a single id, or the id itself when unknown.
    #[must_use]
    pub fn label<'a>(&'a self, id: &'a str) -> &'a str {
        self.labels.get(id).map_or(id, String::as_str)
    }

    /// Translate every id in `text`, then strip `source_label.` prefixes.
    #[must_use]
    pub fn translate(&self, text: &str, source_label: &str) -> String {
        let replaced = self.pattern.replace_all(text, |caps: &regex::Captures<'_>| {
            let id = &caps[0];
            self.label(id).to_string()
        });
        replaced.replace(&format!("{source_label}."), "")
    }
}
