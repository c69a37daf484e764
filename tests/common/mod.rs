//! Shared helpers for the test suites.

#![allow(dead_code)]

use assert_cmd::Command;
use calclineage_cli::test_utils::WorkbookBuilder;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The workbook used throughout the suites.
///
/// ```text
/// Shop:       [Sales] ─┐
///             [Cost]  ─┴─▶ [Profit] ─▶ [Margin] ─▶ {FIXED} [Region Margin]
///             [Region] ───────────────────────────────────┘
/// Parameters: [Target] ─▶ [Margin]
/// ```
pub fn shop_workbook() -> WorkbookBuilder {
    WorkbookBuilder::new()
        .source("federated.shop", "Shop")
        .field("[Sales]", "", &["Overview"])
        .field("[Cost]", "", &[])
        .field("[Region]", "", &["Map", "Overview"])
        .calculated("[Calculation_1]", "Profit", "[Sales] - [Cost]", &["Overview"])
        .calculated(
            "[Calculation_2]",
            "Margin",
            "// share of sales\n[Calculation_1] / [Sales] - [Parameters].[Target]",
            &[],
        )
        .calculated(
            "[Calculation_3]",
            "Region Margin",
            "{FIXED [Region] : AVG([Calculation_2])}",
            &["Map"],
        )
        .field("[Unused]", "", &[])
        .source("Parameters", "")
        .calculated("[Target]", "", "0.25", &[])
}

/// A temporary directory holding workbook exports and run outputs.
pub struct TestProject {
    temp: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Write an export and return its path.
    pub fn write_export(&self, name: &str, workbook: &WorkbookBuilder) -> PathBuf {
        let path = self.temp.path().join(name);
        std::fs::write(&path, workbook.to_json()).expect("write export");
        path
    }

    /// Write a file with arbitrary content.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp.path().join(name);
        std::fs::write(&path, content).expect("write file");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.temp.path().join(relative))
            .unwrap_or_else(|e| panic!("read {relative}: {e}"))
    }

    /// The binary, isolated from the user's configuration and environment.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("calclineage").expect("binary built");
        cmd.current_dir(self.temp.path())
            .env("HOME", self.temp.path())
            .env("CALCLINEAGE_NO_PROGRESS", "1")
            .env("NO_COLOR", "1")
            .env_remove("CALCLINEAGE_CONFIG")
            .env_remove("XDG_CONFIG_HOME")
            .env_remove("RUST_LOG");
        cmd
    }
}
