//! Aggregation of resolved lineage into the two output tables.
//!
//! The field table holds one row per field with its summary statistics; the
//! dependency table flattens every field's reduced backward and forward edges
//! into rows tagged with that field, ids translated to labels.
//!
//! # Definitions
//!
//! - `flag_unused`: no worksheet uses the field directly. A field feeding a
//!   used calculated field is still unused when no sheet shows it.
//! - `n_forward_dependencies`: forward edges that are not worksheet edges.
//! - `n_worksheet_dependencies`: worksheets using the field directly.
//! - `n_backward_dependencies_field` / `_lod`: distinct upstream fields of
//!   category Field / Calculated Field (LOD).

use crate::calculation::LabelMap;
use crate::catalog::{Catalog, Field};
use crate::core::{Category, FieldId};
use crate::resolver::{DependencyEdge, FieldLineage, max_level};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Summary statistics of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldStats {
    pub backward_max_level: i32,
    pub forward_max_level: i32,
    pub n_backward: usize,
    pub n_forward: usize,
    pub n_backward_field: usize,
    pub n_backward_lod: usize,
    pub n_worksheet: usize,
    pub unused: bool,
}

impl FieldStats {
    /// Compute statistics from a field and its reduced closures.
    #[must_use]
    pub fn compute(field: &Field, lineage: &FieldLineage) -> Self {
        let n_worksheet = field.worksheets.len();
        Self {
            backward_max_level: max_level(&lineage.backward),
            forward_max_level: max_level(&lineage.forward),
            n_backward: lineage.backward.len(),
            n_forward: lineage.forward.iter().filter(|e| e.category != Category::Sheet).count(),
            n_backward_field: ancestors_of(&lineage.backward, Category::Field).len(),
            n_backward_lod: ancestors_of(&lineage.backward, Category::CalculatedFieldLod).len(),
            n_worksheet,
            unused: n_worksheet == 0,
        }
    }
}

/// Distinct upstream fields of a category.
#[must_use]
pub fn ancestors_of(backward: &[DependencyEdge], category: Category) -> BTreeSet<&FieldId> {
    backward.iter().filter(|e| e.category == category).map(|e| &e.parent).collect()
}

/// A row of the field table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRecord {
    pub source_field_repl_id: String,
    pub source_label: String,
    pub field_label: String,
    pub source_field_label: String,
    pub field_datatype: String,
    pub field_role: String,
    pub field_type: String,
    pub field_aliases: BTreeMap<String, String>,
    pub field_description: String,
    pub field_hidden: bool,
    pub field_worksheets: Vec<String>,
    pub field_category: Category,
    pub field_calculation_cleaned: String,
    pub source_field_dependencies: Vec<String>,
    pub field_backward_dependencies_max_level: i32,
    pub field_forward_dependencies_max_level: i32,
    pub n_backward_dependencies: usize,
    pub n_forward_dependencies: usize,
    pub n_backward_dependencies_field: usize,
    pub n_backward_dependencies_lod: usize,
    pub n_worksheet_dependencies: usize,
    pub flag_unused: bool,
}

/// A row of the dependency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRecord {
    pub source_field_repl_id: String,
    pub source_label: String,
    pub field_label: String,
    pub source_field_label: String,
    pub field_category: Category,
    pub dependency_from: String,
    pub dependency_to: String,
    pub dependency_level: i32,
    pub dependency_category: Category,
    pub dependency_worksheets_overlap: Option<u32>,
}

/// Both output tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineageTables {
    pub fields: Vec<FieldRecord>,
    pub dependencies: Vec<DependencyRecord>,
}

impl LineageTables {
    /// Build the tables. `lineages` must be in catalog order, one per field.
    #[must_use]
    pub fn build(catalog: &Catalog, lineages: &[FieldLineage], labels: &LabelMap) -> Self {
        let mut tables = Self::default();

        for (field, lineage) in catalog.fields().iter().zip(lineages) {
            let stats = FieldStats::compute(field, lineage);
            let upstream_fields: BTreeSet<String> = ancestors_of(&lineage.backward, Category::Field)
                .into_iter()
                .map(|id| labels.translate(id.as_str(), &field.source_label))
                .collect();

            tables.fields.push(FieldRecord {
                source_field_repl_id: field.id.to_string(),
                source_label: field.source_label.clone(),
                field_label: field.field_label.clone(),
                source_field_label: field.qualified_label.clone(),
                field_datatype: field.datatype.clone(),
                field_role: field.role.clone(),
                field_type: field.field_type.clone(),
                field_aliases: field.aliases.clone(),
                field_description: field.description.clone(),
                field_hidden: field.hidden,
                field_worksheets: field.worksheet_labels.clone(),
                field_category: field.category,
                field_calculation_cleaned: labels
                    .translate(&field.normalized_calculation, &field.source_label),
                source_field_dependencies: upstream_fields.into_iter().collect(),
                field_backward_dependencies_max_level: stats.backward_max_level,
                field_forward_dependencies_max_level: stats.forward_max_level,
                n_backward_dependencies: stats.n_backward,
                n_forward_dependencies: stats.n_forward,
                n_backward_dependencies_field: stats.n_backward_field,
                n_backward_dependencies_lod: stats.n_backward_lod,
                n_worksheet_dependencies: stats.n_worksheet,
                flag_unused: stats.unused,
            });

            for edge in lineage.backward.iter().chain(&lineage.forward) {
                tables.dependencies.push(DependencyRecord {
                    source_field_repl_id: field.id.to_string(),
                    source_label: field.source_label.clone(),
                    field_label: field.field_label.clone(),
                    source_field_label: field.qualified_label.clone(),
                    field_category: field.category,
                    dependency_from: labels.translate(edge.parent.as_str(), &field.source_label),
                    dependency_to: labels.translate(edge.child.as_str(), &field.source_label),
                    dependency_level: edge.level,
                    dependency_category: edge.category,
                    dependency_worksheets_overlap: edge.sheets,
                });
            }
        }

        tables
    }

    /// Total number of unused fields.
    #[must_use]
    pub fn unused_count(&self) -> usize {
        self.fields.iter().filter(|f| f.flag_unused).count()
    }
}
