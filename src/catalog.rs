//! The field catalog: every field of the workbook, identified, normalized and
//! classified, with its direct dependencies and worksheet users.
//!
//! The catalog is built once per run and is immutable afterwards. The
//! resolution engine, the aggregator and the writers all read from it.

use crate::calculation::{CalculationNormalizer, LabelMap, extract_dependencies};
use crate::constants::{MAX_SUGGESTIONS, SIMILARITY_THRESHOLD_PERCENT};
use crate::core::{Category, FieldId, LineageError, SheetId};
use crate::identity::{
    FieldRow, IdAllocator, IdentityOptions, SheetRegistry, caption_label, classify, flatten,
    generate_salt, remove_duplicates_by_weight, remove_parameter_duplicates, sheet_label,
};
use crate::model::{RawWorkbook, bracketed};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use strsim::levenshtein;
use tracing::{debug, info};

/// A fully processed field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: FieldId,
    /// Bracketed raw source name, e.g. `[federated.0abc]`
    pub source_name: String,
    /// Bracketed raw field id, e.g. `[Calculation_123]`
    pub field_name: String,
    pub source_label: String,
    pub field_label: String,
    /// `source_label.field_label`
    pub qualified_label: String,
    pub datatype: String,
    pub role: String,
    pub field_type: String,
    pub aliases: BTreeMap<String, String>,
    pub description: String,
    pub hidden: bool,
    /// Sheet labels of the direct worksheet users
    pub worksheet_labels: Vec<String>,
    pub worksheets: Vec<SheetId>,
    pub raw_calculation: String,
    pub normalized_calculation: String,
    pub category: Category,
    /// Fields referenced by the calculation, in catalog order
    pub dependencies: Vec<FieldId>,
}

impl Field {
    /// The external reference `[source].[field]`.
    #[must_use]
    pub fn qualified_ref(&self) -> String {
        format!("{}.{}", self.source_name, self.field_name)
    }
}

/// Counts reported while building the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    /// Rows in the export
    pub input_rows: usize,
    /// Rows dropped as `[source].[field]` duplicates
    pub duplicates_removed: usize,
    /// Parameter echoes and measure-names rows dropped
    pub parameter_duplicates_removed: usize,
}

/// All fields and sheets of one workbook.
#[derive(Debug, Clone)]
pub struct Catalog {
    fields: Vec<Field>,
    index: HashMap<FieldId, usize>,
    sheets: SheetRegistry,
    allocator: IdAllocator,
    stats: CatalogStats,
}

impl Catalog {
    /// Build the catalog from an export.
    ///
    /// Fails only when no collision-free salt exists or generated ids overlap.
    pub fn build(workbook: &RawWorkbook, options: &IdentityOptions) -> Result<Self, LineageError> {
        let rows = flatten(workbook);
        let input_rows = rows.len();
        log_renames(&rows);

        let (rows, duplicates_removed) = remove_duplicates_by_weight(rows);
        info!("\t{} duplicate fields removed", duplicates_removed);

        let (rows, parameter_duplicates_removed) = remove_parameter_duplicates(
            rows,
            &options.parameters_source,
            &options.measure_names_field,
        );
        info!(
            "\t{} duplicate parameters and/or measure names removed",
            parameter_duplicates_removed
        );

        let salt = generate_salt(
            options.seed,
            options.salt_length,
            rows.iter().map(|row| row.field.calculation.as_str()),
        )?;
        let allocator = IdAllocator::new(salt);

        let ids: Vec<FieldId> = (0..rows.len()).map(|n| allocator.field_id(n)).collect();
        let references: Vec<(String, FieldId)> =
            rows.iter().zip(&ids).map(|(row, id)| (row.qualified_ref(), id.clone())).collect();
        let local_names: BTreeSet<String> = rows.iter().map(|row| row.field.id.clone()).collect();
        let normalizer = CalculationNormalizer::new(references, local_names);

        let worksheet_labels: Vec<Vec<String>> =
            rows.iter().map(|row| unique_sheet_labels(&row.field.worksheets)).collect();
        let sheets = SheetRegistry::build(
            &allocator,
            worksheet_labels.iter().flatten().map(String::as_str),
        );

        let parameters_source = bracketed(&options.parameters_source);
        let mut fields = Vec::with_capacity(rows.len());
        for ((row, id), labels) in rows.into_iter().zip(ids.iter()).zip(worksheet_labels) {
            let normalized = normalizer.normalize(&row.field.calculation, &row.source_name);
            let dependencies = extract_dependencies(&normalized, &ids);
            let category = classify(row.source_name == parameters_source, &normalized);
            fields.push(make_field(
                row,
                id.clone(),
                labels,
                normalized,
                category,
                dependencies,
                &sheets,
            ));
        }

        IdAllocator::verify_disjoint(
            fields
                .iter()
                .map(|f| f.id.as_str())
                .chain(sheets.iter().map(|(id, _)| id.as_str())),
        )?;

        let index = fields.iter().enumerate().map(|(i, f)| (f.id.clone(), i)).collect();
        debug!("Catalog built: {} fields, {} sheets", fields.len(), sheets.len());

        Ok(Self {
            fields,
            index,
            sheets,
            allocator,
            stats: CatalogStats {
                input_rows,
                duplicates_removed,
                parameter_duplicates_removed,
            },
        })
    }

    /// Fields in catalog order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn get(&self, id: &FieldId) -> Option<&Field> {
        self.index.get(id).map(|&i| &self.fields[i])
    }

    /// Position of a field in catalog order.
    #[must_use]
    pub fn position(&self, id: &FieldId) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn sheets(&self) -> &SheetRegistry {
        &self.sheets
    }

    /// The salt every id of this run was generated from.
    #[must_use]
    pub fn salt(&self) -> &str {
        self.allocator.salt()
    }

    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        self.stats
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Find a field by id, qualified label, qualified reference, or bare
    /// label / field name when that is unambiguous.
    pub fn find(&self, name: &str) -> Result<&Field, LineageError> {
        let wanted = name.trim();
        let exact = self.fields.iter().find(|f| {
            f.id.as_str() == wanted || f.qualified_label == wanted || f.qualified_ref() == wanted
        });
        if let Some(field) = exact {
            return Ok(field);
        }

        let bare = bracketed(wanted);
        let mut matches =
            self.fields.iter().filter(|f| f.field_label == bare || f.field_name == bare);
        match (matches.next(), matches.next()) {
            (Some(field), None) => Ok(field),
            _ => Err(LineageError::UnknownField {
                name: wanted.to_string(),
            }),
        }
    }

    /// Qualified labels closest to `name`, nearest first.
    ///
    /// Bare labels are compared against bare labels, qualified ones against
    /// qualified labels.
    #[must_use]
    pub fn similar(&self, name: &str) -> Vec<&str> {
        let wanted = name.trim();
        let threshold = (wanted.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);
        let qualified = wanted.contains("].[");

        let mut scored: Vec<(usize, &str)> = self
            .fields
            .iter()
            .map(|f| {
                let candidate = if qualified { &f.qualified_label } else { &f.field_label };
                (levenshtein(&bracketed(wanted), candidate), f.qualified_label.as_str())
            })
            .filter(|(distance, _)| *distance <= threshold)
            .collect();
        scored.sort();
        scored.dedup_by(|a, b| a.1 == b.1);
        scored.into_iter().take(MAX_SUGGESTIONS).map(|(_, label)| label).collect()
    }

    /// Label map translating every field and sheet id of this catalog.
    pub fn label_map(&self) -> Result<LabelMap, LineageError> {
        let mut labels: HashMap<String, String> = self
            .fields
            .iter()
            .map(|f| (f.id.as_str().to_string(), f.qualified_label.clone()))
            .collect();
        labels.extend(
            self.sheets.iter().map(|(id, label)| (id.as_str().to_string(), label.to_string())),
        );
        LabelMap::new(self.salt(), labels)
    }
}

fn make_field(
    row: FieldRow,
    id: FieldId,
    worksheet_labels: Vec<String>,
    normalized_calculation: String,
    category: Category,
    dependencies: Vec<FieldId>,
    sheets: &SheetRegistry,
) -> Field {
    let source_label = caption_label(&row.source_name, &row.source_caption);
    let field_label = caption_label(&row.field.id, &row.field.caption);
    let worksheets =
        worksheet_labels.iter().filter_map(|label| sheets.id_of(label).cloned()).collect();
    let raw = row.field;

    Field {
        id,
        qualified_label: format!("{source_label}.{field_label}"),
        source_name: row.source_name,
        field_name: raw.id,
        source_label,
        field_label,
        datatype: raw.datatype,
        role: raw.role,
        field_type: raw.field_type,
        aliases: raw.aliases,
        description: raw.description,
        hidden: raw.hidden,
        worksheet_labels,
        worksheets,
        raw_calculation: raw.calculation,
        normalized_calculation,
        category,
        dependencies,
    }
}

/// Sheet labels of one field, repeats dropped, first-seen order kept.
fn unique_sheet_labels(worksheets: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    worksheets.iter().map(|w| sheet_label(w)).filter(|label| seen.insert(label.clone())).collect()
}

fn log_renames(rows: &[FieldRow]) {
    let mut seen = BTreeSet::new();
    for row in rows {
        let label = caption_label(&row.field.id, &row.field.caption);
        if label != row.field.id {
            debug!("\tRenamed field: {} -> {}", row.field.id, label);
        }
        let source = caption_label(&row.source_name, &row.source_caption);
        if source != row.source_name && seen.insert(source.clone()) {
            debug!("\tRenamed source: {} -> {}", row.source_name, source);
        }
    }
}
