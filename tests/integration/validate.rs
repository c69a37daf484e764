use crate::common::{TestProject, shop_workbook};
use anyhow::Result;
use calclineage_cli::test_utils::WorkbookBuilder;
use predicates::prelude::*;
use serde_json::Value;

fn dangling() -> WorkbookBuilder {
    WorkbookBuilder::new()
        .source("S", "Shop")
        .field("[Sales]", "", &["Overview"])
        .calculated("[Calculation_1]", "Ratio", "[Sales] / [Elsewhere].[Total]", &["Overview"])
}

/// Test a clean export in text form.
#[test]
fn test_validate_clean_export() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());

    project
        .command()
        .args(["validate", "shop.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8 fields (3 calculated) in 2 data sources, 2 worksheets"))
        .stdout(predicate::str::contains("✓ Valid"));
    Ok(())
}

/// Test the JSON report.
#[test]
fn test_validate_json_report() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());

    let output = project.command().args(["validate", "shop.json", "--format", "json"]).output()?;
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["valid"], true);
    assert_eq!(report["input_rows"], 8);
    assert_eq!(report["fields"], 8);
    assert_eq!(report["sheets"], 2);
    assert_eq!(report["warnings"], serde_json::json!([]));
    Ok(())
}

/// Test that dangling references warn, and fail only in strict mode.
#[test]
fn test_validate_dangling_reference() -> Result<()> {
    let project = TestProject::new();
    project.write_export("dangling.json", &dangling());

    project
        .command()
        .args(["validate", "dangling.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[Shop].[Ratio] references unknown field [Elsewhere].[Total]",
        ));

    project
        .command()
        .args(["validate", "dangling.json", "--strict"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Strict mode validation failed"));
    Ok(())
}

/// Test that a cycle makes the export invalid.
#[test]
fn test_validate_cycle() -> Result<()> {
    let project = TestProject::new();
    let cyclic = WorkbookBuilder::new()
        .source("S", "")
        .calculated("[A]", "", "[B]", &[])
        .calculated("[B]", "", "[A]", &[]);
    project.write_export("cyclic.json", &cyclic);

    let output = project.command().args(["validate", "cyclic.json", "-f", "json"]).output()?;
    assert_eq!(output.status.code(), Some(1));

    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["valid"], false);
    let errors = report["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().starts_with("Cyclic calculation dependency"));
    Ok(())
}

/// Test that --quiet prints only errors.
#[test]
fn test_validate_quiet() -> Result<()> {
    let project = TestProject::new();
    project.write_export("dangling.json", &dangling());

    project
        .command()
        .args(["validate", "dangling.json", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    Ok(())
}
