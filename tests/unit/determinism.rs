use crate::common::shop_workbook;
use calclineage_cli::aggregate::LineageTables;
use calclineage_cli::catalog::Catalog;
use calclineage_cli::config::OutputFormat;
use calclineage_cli::identity::IdentityOptions;
use calclineage_cli::model::RawField;
use calclineage_cli::output::{render_dependencies, render_fields};
use calclineage_cli::resolver::{FieldGraph, resolve_all};
use calclineage_cli::test_utils::WorkbookBuilder;

fn tables(workbook: &WorkbookBuilder, seed: u64) -> (Catalog, LineageTables) {
    let options = IdentityOptions {
        seed,
        ..IdentityOptions::default()
    };
    let catalog = Catalog::build(&workbook.clone().build(), &options).unwrap();
    let graph = FieldGraph::new(&catalog);
    let lineages = resolve_all(&graph).unwrap();
    let tables = LineageTables::build(&catalog, &lineages, &catalog.label_map().unwrap());
    (catalog, tables)
}

#[test]
fn test_same_seed_same_bytes() {
    let workbook = shop_workbook();
    let (_, first) = tables(&workbook, 42);
    let (_, second) = tables(&workbook, 42);

    for format in [OutputFormat::Csv, OutputFormat::Json] {
        assert_eq!(render_fields(&first, format).unwrap(), render_fields(&second, format).unwrap());
        assert_eq!(
            render_dependencies(&first, format).unwrap(),
            render_dependencies(&second, format).unwrap()
        );
    }
}

#[test]
fn test_seed_only_changes_ids() {
    let workbook = shop_workbook();
    let (first_catalog, first) = tables(&workbook, 1);
    let (second_catalog, second) = tables(&workbook, 2);
    assert_ne!(first_catalog.salt(), second_catalog.salt());

    let labels = |t: &LineageTables| -> Vec<(String, String, usize, bool)> {
        t.fields
            .iter()
            .map(|f| {
                (
                    f.source_field_label.clone(),
                    f.field_calculation_cleaned.clone(),
                    f.n_backward_dependencies,
                    f.flag_unused,
                )
            })
            .collect()
    };
    assert_eq!(labels(&first), labels(&second));

    let edges = |t: &LineageTables| -> Vec<(String, String, i32)> {
        t.dependencies
            .iter()
            .map(|d| (d.dependency_from.clone(), d.dependency_to.clone(), d.dependency_level))
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect()
    };
    assert_eq!(edges(&first), edges(&second));
}

#[test]
fn test_shop_field_table() {
    let (_, tables) = tables(&shop_workbook(), 0);
    assert_eq!(tables.fields.len(), 8);
    assert_eq!(tables.unused_count(), 4);

    let margin = tables.fields.iter().find(|f| f.field_label == "[Margin]").unwrap();
    assert_eq!(
        margin.field_calculation_cleaned,
        "[Profit] / [Sales] - [Parameters].[Target]"
    );
    assert_eq!(margin.source_field_dependencies, vec!["[Cost]", "[Sales]"]);
    assert!(margin.flag_unused);

    let sales = tables.fields.iter().find(|f| f.field_label == "[Sales]").unwrap();
    assert_eq!(sales.n_forward_dependencies, 4);
    assert_eq!(sales.field_forward_dependencies_max_level, 2);
    assert_eq!(sales.n_worksheet_dependencies, 1);
    assert!(!sales.flag_unused);
}

#[test]
fn test_parameter_echo_dropped() {
    let echo = RawField {
        id: "[Target]".to_string(),
        caption: "Target".to_string(),
        calculation: "0.25".to_string(),
        ..RawField::default()
    };
    let workbook = shop_workbook().source("federated.other", "Other").raw(echo);
    let (catalog, _) = tables(&workbook, 0);

    assert_eq!(catalog.stats().parameter_duplicates_removed, 1);
    assert_eq!(catalog.len(), 8);
    let target = catalog.find("Target").unwrap();
    assert_eq!(target.qualified_label, "[Parameters].[Target]");
}
