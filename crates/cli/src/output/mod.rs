//! Output formatting utilities
//!
//! This module provides formatters for CLI output in both human-readable
//! and JSON formats. It also handles progress spinners and colored output.

mod formatter;
mod progress;

pub use formatter::Formatter;
pub use progress::ProgressBar;

use osc_core::config::Defaults;

/// Output configuration derived from CLI flags
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Disable progress bar
    pub no_progress: bool,
    /// Suppress non-error output
    pub quiet: bool,
}

impl OutputConfig {
    /// Layer command-line flags over the `[defaults]` table of the config file
    ///
    /// A flag can only switch a behavior on; the file decides when it is absent.
    pub fn resolve(self, defaults: &Defaults) -> Self {
        Self {
            json: self.json || defaults.output.eq_ignore_ascii_case("json"),
            no_color: self.no_color || defaults.color.eq_ignore_ascii_case("never"),
            no_progress: self.no_progress || !defaults.progress,
            quiet: self.quiet,
        }
    }
}
