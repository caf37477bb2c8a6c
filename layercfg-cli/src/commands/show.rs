//! Show command implementation.
//!
//! This module implements the `show` command, which loads a namespace and
//! displays the stored values in various formats (table, JSON, YAML, CSV,
//! TSV, properties, dotenv, shell exports).

use crate::error::CliError;
use crate::utils::{build_manager, require_namespace, GlobalOptions};
use clap::{Args, ValueEnum};
use layercfg::output::{self, OutputFormatter, ShellType};
use layercfg::{LoadReport, ResolvedProperty};
use std::io::Write;
use std::sync::Arc;

/// Column headers for CSV/TSV output.
const COLUMN_HEADERS: [&str; 5] = ["file", "key", "value", "origin", "env_var"];

/// Load a namespace and print the resolved values.
#[derive(Args)]
pub struct ShowCommand {
    /// Namespace to show
    #[arg(value_name = "NAMESPACE")]
    pub namespace: String,

    /// Output format
    #[arg(
        long,
        value_enum,
        default_value = "table",
        env = "LAYERCFG_OUTPUT_FORMAT",
        ignore_case = true
    )]
    pub format: OutputFormat,

    /// Show which layer each value came from
    #[arg(long)]
    pub origin: bool,

    /// Shell for `--format export` (detected when omitted)
    #[arg(long, value_name = "SHELL", value_parser = parse_shell)]
    pub shell: Option<ShellType>,
}

/// Output format for the show command.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned listing grouped by file (human-readable)
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// CSV format
    Csv,
    /// TSV format (tab-separated values)
    Tsv,
    /// Properties file, usable as an override file
    Properties,
    /// Dotenv assignments keyed by environment variable
    Dotenv,
    /// Shell export statements keyed by environment variable
    Export,
}

fn parse_shell(s: &str) -> Result<ShellType, String> {
    s.parse().map_err(|e: layercfg::Error| e.to_string())
}

impl ShowCommand {
    /// Execute the show command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // 1. Build the manager and load the namespace
        let manager = build_manager(global, Arc::new(global.logger))?;
        require_namespace(&manager, &self.namespace)?;
        let report = manager.load(&self.namespace)?;

        // 2. Format and output to stdout
        match self.format {
            OutputFormat::Table => self.print_with(output::OutputFormat::Human, &report)?,
            OutputFormat::Json => self.print_with(output::OutputFormat::Json, &report)?,
            OutputFormat::Properties => {
                self.print_with(output::OutputFormat::Properties, &report)?;
            }
            OutputFormat::Dotenv => self.print_with(output::OutputFormat::Dotenv, &report)?,
            OutputFormat::Export => {
                let shell = self.shell.unwrap_or_else(ShellType::detect);
                self.print_with(output::OutputFormat::Export(shell), &report)?;
            }
            OutputFormat::Yaml => format_as_yaml(&report.resolved)?,
            OutputFormat::Csv => format_as_delimited(&report.resolved, b',')?,
            OutputFormat::Tsv => format_as_delimited(&report.resolved, b'\t')?,
        }

        Ok(())
    }

    fn print_with(&self, format: output::OutputFormat, report: &LoadReport) -> Result<(), CliError> {
        let formatter: Box<dyn OutputFormatter> = format.create_formatter(self.origin);
        let text = formatter.format(report)?;
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        if !text.is_empty() {
            writeln!(handle, "{text}")?;
        }
        Ok(())
    }
}

/// Format resolved properties as YAML.
fn format_as_yaml(properties: &[ResolvedProperty]) -> Result<(), CliError> {
    let text = serde_yaml::to_string(properties)
        .map_err(|e| CliError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write!(handle, "{text}")?;
    Ok(())
}

/// Convert csv::Error to CliError.
fn csv_error(e: csv::Error) -> CliError {
    CliError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
}

/// Format resolved properties as delimited output (CSV or TSV).
fn format_as_delimited(properties: &[ResolvedProperty], delimiter: u8) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let handle = stdout.lock();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(handle);

    writer.write_record(COLUMN_HEADERS).map_err(csv_error)?;
    for property in properties {
        writer
            .write_record([
                property.file.display().to_string(),
                property.key.clone(),
                property.literal.clone(),
                property.origin.to_string(),
                property.env_var.clone(),
            ])
            .map_err(csv_error)?;
    }

    writer.flush()?;
    Ok(())
}
