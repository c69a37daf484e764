//! Test utilities for calclineage
//!
//! Builders for workbook exports and a once-guarded logging setup, shared by
//! the unit tests and, through the `test-utils` feature, the `tests/` suites.
//!
//! # Example
//!
//! ```rust,no_run
//! use calclineage_cli::test_utils::WorkbookBuilder;
//!
//! let workbook = WorkbookBuilder::new()
//!     .source("federated.1", "Sales")
//!     .field("[Amount]", "", &["Overview"])
//!     .calculated("[Calculation_1]", "Double", "[Amount] * 2", &[])
//!     .build();
//! assert_eq!(workbook.field_count(), 2);
//! ```

use crate::model::{RawDataSource, RawField, RawWorkbook};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `None`, logging is enabled only
/// when `RUST_LOG` is set.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Fluent builder for [`RawWorkbook`] fixtures.
///
/// Fields are appended to the most recently added source.
#[derive(Debug, Default, Clone)]
pub struct WorkbookBuilder {
    datasources: Vec<RawDataSource>,
}

impl WorkbookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new data source.
    pub fn source(mut self, name: &str, caption: &str) -> Self {
        self.datasources.push(RawDataSource {
            name: name.to_string(),
            caption: caption.to_string(),
            fields: Vec::new(),
        });
        self
    }

    /// Add a plain field used by `worksheets`.
    pub fn field(self, id: &str, caption: &str, worksheets: &[&str]) -> Self {
        self.calculated(id, caption, "", worksheets)
    }

    /// Add a field with a calculation.
    pub fn calculated(
        self,
        id: &str,
        caption: &str,
        calculation: &str,
        worksheets: &[&str],
    ) -> Self {
        self.raw(RawField {
            id: id.to_string(),
            caption: caption.to_string(),
            datatype: "real".to_string(),
            role: "measure".to_string(),
            field_type: "quantitative".to_string(),
            calculation: calculation.to_string(),
            worksheets: worksheets.iter().map(|s| (*s).to_string()).collect(),
            ..RawField::default()
        })
    }

    /// Add `rungs` fields `[F0]`, `[F1]`, ... where each field from `[F2]` on
    /// is `[F<i-1>] + [F<i-2>]`. The number of paths from the top rung down
    /// grows like the Fibonacci sequence.
    pub fn ladder(self, rungs: usize) -> Self {
        (0..rungs).fold(self, |builder, i| {
            let id = format!("[F{i}]");
            if i < 2 {
                builder.field(&id, "", &[])
            } else {
                let calculation = format!("[F{}] + [F{}]", i - 1, i - 2);
                builder.calculated(&id, "", &calculation, &[])
            }
        })
    }

    /// Add a fully specified field.
    ///
    /// # Panics
    ///
    /// When no source was added first.
    pub fn raw(mut self, field: RawField) -> Self {
        self.datasources
            .last_mut()
            .expect("WorkbookBuilder: call source() before adding fields")
            .fields
            .push(field);
        self
    }

    pub fn build(self) -> RawWorkbook {
        RawWorkbook {
            datasources: self.datasources,
        }
    }

    /// The built workbook as JSON export text.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&RawWorkbook {
            datasources: self.datasources.clone(),
        })
        .unwrap_or_default()
    }
}
