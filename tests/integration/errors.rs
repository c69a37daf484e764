use crate::common::{TestProject, shop_workbook};
use anyhow::Result;
use calclineage_cli::test_utils::WorkbookBuilder;
use predicates::prelude::*;

/// Test that a malformed export fails with a parse error and a hint.
#[test]
fn test_malformed_export() -> Result<()> {
    let project = TestProject::new();
    project.write_file("broken.json", "{\"datasources\": [ {\"name\": ");

    project
        .command()
        .args(["analyze", "broken.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid workbook export"))
        .stderr(predicate::str::contains("Re-export the workbook"));

    assert!(!project.path().join("broken.json Files/Fields").exists());
    Ok(())
}

/// Test that a missing export is reported with its path.
#[test]
fn test_missing_export() -> Result<()> {
    let project = TestProject::new();

    project
        .command()
        .args(["analyze", "nowhere.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read workbook export"))
        .stderr(predicate::str::contains("nowhere.json"));
    Ok(())
}

/// Test that a cyclic workbook aborts the analysis.
#[test]
fn test_cycle_aborts_analysis() -> Result<()> {
    let project = TestProject::new();
    let cyclic = WorkbookBuilder::new()
        .source("S", "")
        .calculated("[A]", "", "[B] + 1", &["Sheet 1"])
        .calculated("[B]", "", "[A] * 2", &[])
        .field("[C]", "", &[]);
    project.write_export("cyclic.json", &cyclic);

    project
        .command()
        .args(["analyze", "cyclic.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cyclic calculation dependency"));
    Ok(())
}

/// Test that an output path blocked by a file is reported.
#[test]
fn test_unwritable_output() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());
    project.write_file("blocked", "not a directory");

    project
        .command()
        .args(["analyze", "shop.json", "-o", "blocked"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to write output"));
    Ok(())
}

/// Test that unknown subcommands and flags are usage errors.
#[test]
fn test_usage_errors() -> Result<()> {
    let project = TestProject::new();

    project.command().arg("explode").assert().failure().code(2);
    project
        .command()
        .args(["analyze", "shop.json", "--format", "xml"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("xml"));
    Ok(())
}
