//! CSV rendering of the output tables.
//!
//! One header row, then one record per row. List-valued columns are joined
//! with `"; "`, aliases render as `key=value` pairs, and an absent worksheet
//! overlap is an empty cell.

use crate::aggregate::{DependencyRecord, FieldRecord};
use crate::constants::LIST_SEPARATOR;
use crate::core::LineageError;
use std::collections::BTreeMap;
use std::io::Write;

const FIELD_HEADERS: [&str; 22] = [
    "source_field_repl_id",
    "source_label",
    "field_label",
    "source_field_label",
    "field_datatype",
    "field_role",
    "field_type",
    "field_aliases",
    "field_description",
    "field_hidden",
    "field_worksheets",
    "field_category",
    "field_calculation_cleaned",
    "source_field_dependencies",
    "field_backward_dependencies_max_level",
    "field_forward_dependencies_max_level",
    "n_backward_dependencies",
    "n_forward_dependencies",
    "n_backward_dependencies_field",
    "n_backward_dependencies_lod",
    "n_worksheet_dependencies",
    "flag_unused",
];

const DEPENDENCY_HEADERS: [&str; 10] = [
    "source_field_repl_id",
    "source_label",
    "field_label",
    "source_field_label",
    "field_category",
    "dependency_from",
    "dependency_to",
    "dependency_level",
    "dependency_category",
    "dependency_worksheets_overlap",
];

fn join_aliases(aliases: &BTreeMap<String, String>) -> String {
    aliases.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(LIST_SEPARATOR)
}

/// Write the field table.
pub fn write_fields_csv<W: Write>(out: W, records: &[FieldRecord]) -> Result<(), LineageError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(out);
    wtr.write_record(FIELD_HEADERS)?;

    for r in records {
        wtr.write_record([
            r.source_field_repl_id.clone(),
            r.source_label.clone(),
            r.field_label.clone(),
            r.source_field_label.clone(),
            r.field_datatype.clone(),
            r.field_role.clone(),
            r.field_type.clone(),
            join_aliases(&r.field_aliases),
            r.field_description.clone(),
            r.field_hidden.to_string(),
            r.field_worksheets.join(LIST_SEPARATOR),
            r.field_category.label().to_string(),
            r.field_calculation_cleaned.clone(),
            r.source_field_dependencies.join(LIST_SEPARATOR),
            r.field_backward_dependencies_max_level.to_string(),
            r.field_forward_dependencies_max_level.to_string(),
            r.n_backward_dependencies.to_string(),
            r.n_forward_dependencies.to_string(),
            r.n_backward_dependencies_field.to_string(),
            r.n_backward_dependencies_lod.to_string(),
            r.n_worksheet_dependencies.to_string(),
            r.flag_unused.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the dependency table.
pub fn write_dependencies_csv<W: Write>(
    out: W,
    records: &[DependencyRecord],
) -> Result<(), LineageError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(out);
    wtr.write_record(DEPENDENCY_HEADERS)?;

    for r in records {
        wtr.write_record([
            r.source_field_repl_id.clone(),
            r.source_label.clone(),
            r.field_label.clone(),
            r.source_field_label.clone(),
            r.field_category.label().to_string(),
            r.dependency_from.clone(),
            r.dependency_to.clone(),
            r.dependency_level.to_string(),
            r.dependency_category.label().to_string(),
            r.dependency_worksheets_overlap.map(|n| n.to_string()).unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
