use crate::common::{TestProject, shop_workbook};
use anyhow::Result;
use predicates::prelude::*;

/// Test that the configuration file picks the table format.
#[test]
fn test_config_file_sets_format() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());
    project.write_file("lineage.toml", "format = \"json\"\nworkers = 2\n");

    project
        .command()
        .args(["--config", "lineage.toml", "analyze", "shop.json", "-o", "out"])
        .assert()
        .success();

    assert!(project.path().join("out/Fields/fields.json").exists());
    assert!(!project.path().join("out/Fields/fields.csv").exists());
    Ok(())
}

/// Test that the configuration file is also found through the environment.
#[test]
fn test_config_from_environment() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());
    project.write_file("lineage.toml", "seed = 99\ngraphs = true\n");

    project
        .command()
        .env("CALCLINEAGE_CONFIG", "lineage.toml")
        .args(["analyze", "shop.json", "-o", "out"])
        .assert()
        .success();

    assert!(project.path().join("out/Graphs/Sheets/Overview.dot").exists());
    let summary = project.read("out/summary.json");
    assert!(summary.contains("\"seed\": 99"));
    Ok(())
}

/// Test that command-line flags override the configuration file.
#[test]
fn test_flags_override_config() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());
    project.write_file("lineage.toml", "format = \"json\"\n");

    project
        .command()
        .args(["-c", "lineage.toml", "analyze", "shop.json", "-o", "out", "-f", "csv"])
        .assert()
        .success();

    assert!(project.path().join("out/Fields/fields.csv").exists());
    Ok(())
}

/// Test that invalid settings are rejected before any output is written.
#[test]
fn test_invalid_config_rejected() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());
    project.write_file("zero.toml", "workers = 0\n");
    project.write_file("unknown.toml", "colour = \"blue\"\n");

    project
        .command()
        .args(["-c", "zero.toml", "analyze", "shop.json", "-o", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("workers must be at least 1"));
    assert!(!project.path().join("out/Fields").exists());

    project
        .command()
        .args(["-c", "unknown.toml", "analyze", "shop.json", "-o", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("colour"));
    Ok(())
}

/// Test that an explicit configuration path must exist.
#[test]
fn test_missing_config_file() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());

    project
        .command()
        .args(["-c", "absent.toml", "validate", "shop.json"])
        .assert()
        .failure();
    Ok(())
}
