use crate::common::{TestProject, shop_workbook};
use anyhow::Result;
use predicates::prelude::*;
use serde_json::Value;

/// Test the default run: CSV tables and summary beside the input.
#[test]
fn test_analyze_default_output_dir() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());

    project
        .command()
        .args(["analyze", "shop.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8 fields"))
        .stderr(predicate::str::contains("STEP 1: Read"));

    let fields = project.read("shop.json Files/Fields/fields.csv");
    let mut lines = fields.lines();
    assert!(lines.next().unwrap().starts_with("source_field_repl_id,source_label,field_label"));
    assert_eq!(lines.count(), 8);
    assert!(fields.contains("[Profit] / [Sales] - [Parameters].[Target]"));

    let dependencies = project.read("shop.json Files/Fields/dependencies.csv");
    assert!(dependencies.lines().next().unwrap().ends_with("dependency_worksheets_overlap"));
    assert!(dependencies.contains("[Region Margin]"));

    let summary: Value = serde_json::from_str(&project.read("shop.json Files/summary.json"))?;
    assert_eq!(summary["fields"], 8);
    assert_eq!(summary["sheets"], 2);
    assert_eq!(summary["unused_fields"], 4);
    assert_eq!(summary["format"], "csv");
    assert!(summary["input_checksum"].as_str().unwrap().starts_with("sha256:"));
    Ok(())
}

/// Test JSON tables, graphs and the archive in one run.
#[test]
fn test_analyze_json_graphs_archive() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());

    project
        .command()
        .args(["analyze", "shop.json", "--out", "out", "--format", "json", "--graphs", "--archive"])
        .assert()
        .success();

    let fields: Value = serde_json::from_str(&project.read("out/Fields/fields.json"))?;
    let fields = fields.as_array().unwrap();
    assert_eq!(fields.len(), 8);
    let profit = fields.iter().find(|f| f["field_label"] == "[Profit]").unwrap();
    assert_eq!(profit["field_category"], "Calculated Field");
    assert_eq!(profit["field_worksheets"], serde_json::json!(["[Overview]"]));

    let dependencies: Value = serde_json::from_str(&project.read("out/Fields/dependencies.json"))?;
    assert!(dependencies.as_array().is_some_and(|rows| !rows.is_empty()));

    let field_graph = project.read("out/Graphs/Shop/RegionMargin.dot");
    assert!(field_graph.starts_with("digraph"));
    assert!(field_graph.contains("lightblue"));
    let sheet_graph = project.read("out/Graphs/Sheets/Map.dot");
    assert!(sheet_graph.contains("[Map]"));
    // plain fields without consumers get no field graph
    assert!(!project.path().join("out/Graphs/Shop/Unused.dot").exists());

    assert!(project.path().join("out.zip").exists());
    let summary: Value = serde_json::from_str(&project.read("out/summary.json"))?;
    assert_eq!(summary["sheet_graphs"], 2);
    Ok(())
}

/// Test that a fixed seed reproduces the tables byte for byte.
#[test]
fn test_analyze_is_deterministic() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());

    for (out, workers) in [("first", "1"), ("second", "4")] {
        project
            .command()
            .args(["analyze", "shop.json", "-o", out, "-s", "7", "-w", workers])
            .assert()
            .success();
    }

    assert_eq!(project.read("first/Fields/fields.csv"), project.read("second/Fields/fields.csv"));
    assert_eq!(
        project.read("first/Fields/dependencies.csv"),
        project.read("second/Fields/dependencies.csv")
    );
    Ok(())
}

/// Test that --quiet keeps stdout and stderr empty on success.
#[test]
fn test_analyze_quiet() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());

    project
        .command()
        .args(["--quiet", "analyze", "shop.json", "-o", "out"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());

    assert!(project.path().join("out/Fields/fields.csv").exists());
    Ok(())
}
