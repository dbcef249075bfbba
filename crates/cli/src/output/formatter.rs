//! Human and JSON rendering for command results
//!
//! Status lines go to stdout (success) or stderr (warning, error). JSON mode
//! prints only the command's own document on stdout; errors become
//! `{"error": ...}` on stderr so a script can still parse them.

use console::style;
use serde::Serialize;

use super::OutputConfig;

#[derive(Debug, Clone, Copy)]
enum Status {
    Ok,
    Warn,
    Fail,
}

impl Status {
    fn glyph(self) -> &'static str {
        match self {
            Self::Ok => "✓",
            Self::Warn => "⚠",
            Self::Fail => "✗",
        }
    }
}

/// Per-command printer built from the resolved [`OutputConfig`]
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    /// Colors are off in JSON mode regardless of `--no-color`
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    /// `✓ message` on stdout, silent under `--quiet` or `--json`
    pub fn success(&self, message: &str) {
        if let Some(line) = self.status_line(Status::Ok, message) {
            println!("{line}");
        }
    }

    /// `⚠ message` on stderr, silent under `--quiet` or `--json`
    pub fn warning(&self, message: &str) {
        if let Some(line) = self.status_line(Status::Warn, message) {
            eprintln!("{line}");
        }
    }

    /// Always printed to stderr, even under `--quiet`
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.error_line(message));
    }

    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Plain stdout line, dropped under `--quiet`
    pub fn println(&self, message: &str) {
        if !self.config.quiet {
            println!("{message}");
        }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.colors_enabled() {
            style(text).dim().to_string()
        } else {
            text.to_string()
        }
    }

    fn status_line(&self, status: Status, message: &str) -> Option<String> {
        if self.config.quiet || self.config.json {
            return None;
        }
        Some(self.decorate(status, message))
    }

    fn error_line(&self, message: &str) -> String {
        if self.config.json {
            let error = serde_json::json!({ "error": message });
            return serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string());
        }
        self.decorate(Status::Fail, message)
    }

    fn decorate(&self, status: Status, message: &str) -> String {
        let glyph = status.glyph();
        if !self.colors_enabled() {
            return format!("{glyph} {message}");
        }
        let glyph = match status {
            Status::Ok => style(glyph).green(),
            Status::Warn => style(glyph).yellow(),
            Status::Fail => style(glyph).red(),
        };
        format!("{glyph} {message}")
    }
}
