//! Output formatter implementations.

use std::fmt::Write as _;

use crate::manager::{LoadReport, ResolvedProperty};
use crate::properties::escape_value;
use crate::{Error, Result};

use super::{OutputFormatter, ShellType};

/// Properties visible after the pass: one per key, the last file winning.
fn effective(report: &LoadReport) -> Vec<&ResolvedProperty> {
    let mut seen = std::collections::HashSet::new();
    let mut effective: Vec<&ResolvedProperty> = report
        .resolved
        .iter()
        .rev()
        .filter(|p| seen.insert(p.key.as_str()))
        .collect();
    effective.reverse();
    effective
}

/// Formatter for human-readable output.
#[derive(Debug, Clone, Copy, Default)]
pub struct HumanFormatter {
    show_origin: bool,
}

impl HumanFormatter {
    /// Create a new human formatter.
    #[must_use]
    pub fn new(show_origin: bool) -> Self {
        Self { show_origin }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format(&self, report: &LoadReport) -> Result<String> {
        if report.resolved.is_empty() {
            return Ok(format!("No properties resolved for '{}'.", report.namespace));
        }

        let width = report.resolved.iter().map(|p| p.key.len()).max().unwrap_or(0);
        let mut lines = Vec::new();
        for file in &report.files {
            lines.push(format!("[{}]", file.display()));
            for property in report.resolved.iter().filter(|p| &p.file == file) {
                let mut line = format!("  {:<width$} = {}", property.key, property.literal);
                if self.show_origin {
                    let _ = write!(line, "  ({})", property.origin);
                }
                lines.push(line);
            }
        }
        Ok(lines.join("\n"))
    }
}

/// Formatter for JSON output.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &LoadReport) -> Result<String> {
        serde_json::to_string_pretty(&report.resolved).map_err(|e| Error::Output {
            message: format!("failed to serialize to JSON: {e}"),
        })
    }
}

/// Formatter producing a properties file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesFormatter {
    show_origin: bool,
}

impl PropertiesFormatter {
    /// Create a new properties formatter.
    #[must_use]
    pub fn new(show_origin: bool) -> Self {
        Self { show_origin }
    }
}

impl OutputFormatter for PropertiesFormatter {
    fn format(&self, report: &LoadReport) -> Result<String> {
        let mut lines = vec![format!("# {}", report.namespace)];
        for property in effective(report) {
            if self.show_origin {
                lines.push(format!("# {}", property.origin));
            }
            lines.push(format!("{} = {}", property.key, escape_value(&property.literal)));
        }
        Ok(lines.join("\n"))
    }
}

/// Formatter for dotenv (.env file) format.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotenvFormatter;

impl OutputFormatter for DotenvFormatter {
    fn format(&self, report: &LoadReport) -> Result<String> {
        Ok(effective(report)
            .into_iter()
            .map(|p| format!("{}={}", p.env_var, dotenv_quote(&p.literal)))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

fn dotenv_quote(value: &str) -> String {
    if value.is_empty() || value.contains(|c: char| c.is_whitespace() || "#\"'".contains(c)) {
        format!("\"{}\"", value.replace('\\', r"\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// Formatter for shell-specific export statements.
#[derive(Debug, Clone, Copy)]
pub struct ExportFormatter {
    shell: ShellType,
}

impl ExportFormatter {
    /// Create a new export formatter.
    #[must_use]
    pub fn new(shell: ShellType) -> Self {
        Self { shell }
    }
}

impl OutputFormatter for ExportFormatter {
    fn format(&self, report: &LoadReport) -> Result<String> {
        Ok(effective(report)
            .into_iter()
            .map(|p| self.shell.format_export(&p.env_var, &p.literal))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
