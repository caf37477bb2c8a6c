//! Report formatting.
//!
//! Renders the values stored by a load pass as human-readable text, JSON, a
//! properties file, a dotenv file or shell export statements.

mod formatters;
mod shell;

use crate::manager::LoadReport;
use crate::Result;

pub use formatters::{
    DotenvFormatter, ExportFormatter, HumanFormatter, JsonFormatter, PropertiesFormatter,
};
pub use shell::ShellType;

/// Formats the values of a [`LoadReport`].
pub trait OutputFormatter {
    /// Format the given report into a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be serialized.
    fn format(&self, report: &LoadReport) -> Result<String>;
}

/// Available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned `key = value` listing.
    Human,
    /// JSON array of resolved properties.
    Json,
    /// Properties file, usable as an override file.
    Properties,
    /// Dotenv (.env file) assignments keyed by environment binding.
    Dotenv,
    /// Shell-specific export statements keyed by environment binding.
    Export(ShellType),
}

impl OutputFormat {
    /// Create a formatter for this output format.
    ///
    /// `show_origin` adds the layer each value came from where the format
    /// has room for it.
    #[must_use]
    pub fn create_formatter(self, show_origin: bool) -> Box<dyn OutputFormatter> {
        match self {
            Self::Human => Box::new(HumanFormatter::new(show_origin)),
            Self::Json => Box::new(JsonFormatter),
            Self::Properties => Box::new(PropertiesFormatter::new(show_origin)),
            Self::Dotenv => Box::new(DotenvFormatter),
            Self::Export(shell) => Box::new(ExportFormatter::new(shell)),
        }
    }
}
