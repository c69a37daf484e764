//! Progress indicators for long-running steps.
//!
//! Graph generation walks every field and every sheet, which can take a while
//! on large workbooks. A bar shows how far along it is in an interactive
//! terminal and stays out of the way everywhere else.
//!
//! # Environment Variables
//!
//! - `CALCLINEAGE_NO_PROGRESS`: set to any value to hide all bars
//!
//! # Examples
//!
//! ```rust
//! use calclineage_cli::utils::progress::ProgressBar;
//!
//! let progress = ProgressBar::new(3);
//! progress.set_prefix("Graphs");
//! for _ in 0..3 {
//!     progress.inc(1);
//! }
//! progress.finish_and_clear();
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};

fn is_progress_disabled() -> bool {
    std::env::var("CALCLINEAGE_NO_PROGRESS").is_ok()
}

/// A progress bar with consistent styling.
///
/// Wraps an `indicatif` bar. When progress is disabled the inner bar is
/// hidden and every call is a no-op.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Creates a bar tracking `len` units of work.
    pub fn new(len: u64) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(len);
            bar.set_style(default_style());
            bar
        };
        Self { inner: bar }
    }

    /// Creates a bar that never draws.
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    /// Creates a visible bar only when `enabled` is set.
    pub fn with_visibility(len: u64, enabled: bool) -> Self {
        if enabled { Self::new(len) } else { Self::hidden() }
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.inner.set_prefix(prefix.into());
    }

    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    /// Current position, in units of work.
    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    /// Finish and remove the bar from the terminal.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }

    /// Whether the bar is drawn at all.
    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }
}

fn default_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
        .progress_chars("━╸━")
}
