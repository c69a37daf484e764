//! Flattening of the export into field rows and duplicate elimination.
//!
//! The same `[source].[field]` pair can appear several times in an export
//! (once per worksheet-level copy of a data source). Only the most complete
//! copy is kept. Parameters also show up as fields of every source that uses
//! them; those echoes are dropped so each parameter exists once, under the
//! parameters source.

use crate::model::{RawField, RawWorkbook, bracketed};
use std::collections::{HashMap, HashSet};

/// One field of one data source, with bracketed source and field names.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    /// Bracketed raw data-source name, e.g. `[federated.0abc]`
    pub source_name: String,
    /// Data-source caption, possibly empty
    pub source_caption: String,
    /// The field, with `id` bracketed
    pub field: RawField,
}

impl FieldRow {
    /// The external reference `[source].[field]`.
    #[must_use]
    pub fn qualified_ref(&self) -> String {
        format!("{}.{}", self.source_name, self.field.id)
    }

    /// Summed length of every textual attribute.
    ///
    /// Used to pick the most complete copy among duplicates.
    #[must_use]
    pub fn weight(&self) -> usize {
        let f = &self.field;
        let aliases: usize = f.aliases.iter().map(|(k, v)| k.len() + v.len() + 1).sum();
        let worksheets: usize = f.worksheets.iter().map(String::len).sum();
        let hidden = if f.hidden { "true".len() } else { "false".len() };

        self.source_name.len()
            + self.source_caption.len()
            + f.id.len()
            + f.caption.len()
            + f.datatype.len()
            + f.role.len()
            + f.field_type.len()
            + aliases
            + f.calculation.len()
            + f.description.len()
            + hidden
            + worksheets
    }
}

/// Flatten an export into rows in document order.
#[must_use]
pub fn flatten(workbook: &RawWorkbook) -> Vec<FieldRow> {
    workbook
        .datasources
        .iter()
        .flat_map(|ds| {
            let source_name = bracketed(&ds.name);
            ds.fields.iter().map(move |field| {
                let mut field = field.clone();
                field.id = bracketed(&field.id);
                FieldRow {
                    source_name: source_name.clone(),
                    source_caption: ds.caption.clone(),
                    field,
                }
            })
        })
        .collect()
}

/// Keep one row per `[source].[field]`: the heaviest, first one on ties.
///
/// Surviving rows keep their relative order. Returns the rows and the number
/// removed.
#[must_use]
pub fn remove_duplicates_by_weight(rows: Vec<FieldRow>) -> (Vec<FieldRow>, usize) {
    let mut best: HashMap<String, (usize, usize)> = HashMap::new();
    for (index, row) in rows.iter().enumerate() {
        let weight = row.weight();
        best.entry(row.qualified_ref())
            .and_modify(|(best_index, best_weight)| {
                if weight > *best_weight {
                    *best_index = index;
                    *best_weight = weight;
                }
            })
            .or_insert((index, weight));
    }

    let keep: HashSet<usize> = best.values().map(|(index, _)| *index).collect();
    let total = rows.len();
    let kept: Vec<FieldRow> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| keep.contains(&index).then_some(row))
        .collect();
    let removed = total - kept.len();
    (kept, removed)
}

/// Drop parameter echoes and the measure-names pseudo field.
///
/// A row is a parameter echo when its field id matches a field of the
/// parameters source while the row itself lives elsewhere.
#[must_use]
pub fn remove_parameter_duplicates(
    rows: Vec<FieldRow>,
    parameters_source: &str,
    measure_names_field: &str,
) -> (Vec<FieldRow>, usize) {
    let parameters_source = bracketed(parameters_source);
    let measure_names_field = bracketed(measure_names_field);
    let parameters: HashSet<String> = rows
        .iter()
        .filter(|row| row.source_name == parameters_source)
        .map(|row| row.field.id.clone())
        .collect();

    let total = rows.len();
    let kept: Vec<FieldRow> = rows
        .into_iter()
        .filter(|row| {
            let echo =
                parameters.contains(&row.field.id) && row.source_name != parameters_source;
            !echo && row.field.id != measure_names_field
        })
        .collect();
    let removed = total - kept.len();
    (kept, removed)
}
