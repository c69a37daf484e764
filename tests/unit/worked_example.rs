use calclineage_cli::aggregate::LineageTables;
use calclineage_cli::catalog::Catalog;
use calclineage_cli::core::{Category, FieldId, Node};
use calclineage_cli::identity::IdentityOptions;
use calclineage_cli::resolver::{DependencyEdge, FieldGraph, max_level, resolve_all};
use calclineage_cli::test_utils::{WorkbookBuilder, init_test_logging};

fn chain() -> Catalog {
    let workbook = WorkbookBuilder::new()
        .source("S", "")
        .field("[A]", "", &[])
        .calculated("[B]", "", "[A] + 1", &[])
        .calculated("[C]", "", "{FIXED : SUM([B])}", &["Sheet 1"])
        .build();
    Catalog::build(&workbook, &IdentityOptions::default()).unwrap()
}

fn has_edge(edges: &[DependencyEdge], parent: &FieldId, child: &FieldId, level: i32) -> bool {
    edges
        .iter()
        .any(|e| &e.parent == parent && e.child == Node::Field(child.clone()) && e.level == level)
}

#[test]
fn test_worked_example_categories() {
    init_test_logging(None);
    let catalog = chain();
    assert_eq!(catalog.find("[A]").unwrap().category, Category::Field);
    assert_eq!(catalog.find("[B]").unwrap().category, Category::CalculatedField);
    assert_eq!(catalog.find("[C]").unwrap().category, Category::CalculatedFieldLod);
}

#[test]
fn test_worked_example_backward_closure() {
    let catalog = chain();
    let graph = FieldGraph::new(&catalog);
    let lineages = resolve_all(&graph).unwrap();

    let a = &catalog.find("[A]").unwrap().id;
    let b = &catalog.find("[B]").unwrap().id;
    let c = &catalog.find("[C]").unwrap().id;
    let backward = &lineages[2].backward;

    assert_eq!(backward.len(), 2);
    assert!(has_edge(backward, b, c, -1));
    assert!(has_edge(backward, a, b, -2));
    assert_eq!(max_level(backward), -2);
    assert!(backward.iter().all(|e| e.sheets.is_none()));
}

#[test]
fn test_worked_example_forward_closure() {
    let catalog = chain();
    let graph = FieldGraph::new(&catalog);
    let lineages = resolve_all(&graph).unwrap();

    let a = &catalog.find("[A]").unwrap().id;
    let b = &catalog.find("[B]").unwrap().id;
    let c = &catalog.find("[C]").unwrap().id;
    let forward = &lineages[0].forward;

    assert!(has_edge(forward, a, b, 1));
    assert!(has_edge(forward, b, c, 2));
    // C's worksheet at C's own level; A shares no sheet with it
    let sheet = forward.iter().find(|e| e.category == Category::Sheet).unwrap();
    assert_eq!(&sheet.parent, c);
    assert_eq!(sheet.level, 2);
    assert_eq!(sheet.sheets, Some(0));
    assert_eq!(max_level(forward), 2);
}

#[test]
fn test_worked_example_tables() {
    let catalog = chain();
    let graph = FieldGraph::new(&catalog);
    let lineages = resolve_all(&graph).unwrap();
    let tables = LineageTables::build(&catalog, &lineages, &catalog.label_map().unwrap());

    let c = &tables.fields[2];
    assert_eq!(c.field_backward_dependencies_max_level, -2);
    assert_eq!(c.n_backward_dependencies, 2);
    assert_eq!(c.n_backward_dependencies_field, 1);
    assert!(!c.flag_unused);
    assert_eq!(c.field_calculation_cleaned, "{FIXED : SUM([B])}");

    // A only reaches a sheet through C, and stays unused
    assert!(tables.fields[0].flag_unused);
    assert!(tables.fields[1].flag_unused);
}
