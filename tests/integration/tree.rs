use crate::common::{TestProject, shop_workbook};
use anyhow::Result;
use predicates::prelude::*;
use serde_json::Value;

fn labels(nodes: &Value) -> Vec<&str> {
    nodes.as_array().map_or_else(Vec::new, |nodes| {
        nodes.iter().filter_map(|n| n["label"].as_str()).collect()
    })
}

/// Test the text tree of a calculated field in both directions.
#[test]
fn test_tree_text_output() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());

    project
        .command()
        .args(["tree", "shop.json", "[Profit]"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Shop].[Profit] (Calculated Field)"))
        .stdout(predicate::str::contains("upstream"))
        .stdout(predicate::str::contains("downstream"))
        .stdout(predicate::str::contains("[Shop].[Cost] (Field)"))
        .stdout(predicate::str::contains("[Overview] (Sheet)"));
    Ok(())
}

/// Test the JSON tree of the LOD field, upstream only.
#[test]
fn test_tree_json_backward() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());

    let output = project
        .command()
        .args(["tree", "shop.json", "Region Margin", "--direction", "backward", "--format", "json"])
        .output()?;
    assert!(output.status.success());

    let tree: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(tree["field"], "[Shop].[Region Margin]");
    assert_eq!(tree["category"], "Calculated Field (LOD)");
    assert!(tree.get("forward").is_none());

    let backward = &tree["backward"];
    assert_eq!(labels(backward), vec!["[Shop].[Margin]", "[Shop].[Region]"]);
    let margin = &backward[0];
    assert_eq!(
        labels(&margin["children"]),
        vec!["[Parameters].[Target]", "[Shop].[Profit]", "[Shop].[Sales]"]
    );
    Ok(())
}

/// Test that repeated nodes are marked once already shown.
#[test]
fn test_tree_marks_repeated_nodes() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());

    project
        .command()
        .args(["tree", "shop.json", "[Shop].[Margin]", "-d", "backward"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(*)"))
        .stdout(predicate::str::contains("already shown above"));

    project
        .command()
        .args(["tree", "shop.json", "[Shop].[Margin]", "-d", "backward", "--no-dedupe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(*)").not());
    Ok(())
}

/// Test that --depth cuts the tree.
#[test]
fn test_tree_depth_limit() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());

    let output = project
        .command()
        .args(["tree", "shop.json", "[Region Margin]", "-d", "backward", "-f", "json"])
        .args(["--depth", "1"])
        .output()?;
    assert!(output.status.success());
    let tree: Value = serde_json::from_slice(&output.stdout)?;
    let backward = tree["backward"].as_array().unwrap();
    assert_eq!(backward.len(), 2);
    assert!(backward.iter().all(|n| n.get("children").is_none()));

    project
        .command()
        .args(["tree", "shop.json", "[Profit]", "--depth", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Depth must be at least 1"));
    Ok(())
}

/// Test that a misspelled field gets a suggestion.
#[test]
fn test_tree_unknown_field_suggests() -> Result<()> {
    let project = TestProject::new();
    project.write_export("shop.json", &shop_workbook());

    project
        .command()
        .args(["tree", "shop.json", "[Profti]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Field '[Profti]' not found"))
        .stderr(predicate::str::contains("Did you mean [Shop].[Profit]"));
    Ok(())
}
