//! Worksheet registry.

use super::IdAllocator;
use crate::core::SheetId;
use std::collections::{BTreeSet, HashMap};

/// Maps worksheet labels to sheet ids and back.
///
/// Sheets are numbered over the sorted set of distinct labels, so numbering
/// does not depend on field order.
#[derive(Debug, Clone, Default)]
pub struct SheetRegistry {
    sheets: Vec<(SheetId, String)>,
    by_label: HashMap<String, usize>,
}

impl SheetRegistry {
    /// Register every label, numbering them in sorted order.
    pub fn build<'a, I>(allocator: &IdAllocator, labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let distinct: BTreeSet<&str> = labels.into_iter().collect();
        let mut registry = Self::default();
        for (index, label) in distinct.into_iter().enumerate() {
            registry.by_label.insert(label.to_string(), index);
            registry.sheets.push((allocator.sheet_id(index), label.to_string()));
        }
        registry
    }

    /// Sheet id for a label.
    #[must_use]
    pub fn id_of(&self, label: &str) -> Option<&SheetId> {
        self.by_label.get(label).map(|&index| &self.sheets[index].0)
    }

    /// Label for a sheet id.
    #[must_use]
    pub fn label_of(&self, id: &SheetId) -> Option<&str> {
        self.sheets.iter().find(|(sheet, _)| sheet == id).map(|(_, label)| label.as_str())
    }

    /// All sheets in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&SheetId, &str)> {
        self.sheets.iter().map(|(id, label)| (id, label.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
