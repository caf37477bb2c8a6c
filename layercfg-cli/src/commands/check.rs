//! Check command implementation.
//!
//! Loads a namespace and reports every warning raised on the way: missing
//! properties, invalid values, duplicate keys and failing hooks.

use crate::error::CliError;
use crate::utils::{build_manager, require_namespace, GlobalOptions};
use clap::Args;
use layercfg::LogEventSink;
use std::io::Write;
use std::sync::Arc;

/// Load a namespace and report problems.
#[derive(Args)]
pub struct CheckCommand {
    /// Namespace to check
    #[arg(value_name = "NAMESPACE")]
    pub namespace: String,

    /// Exit with status 1 if any warning was raised
    #[arg(long)]
    pub strict: bool,
}

impl CheckCommand {
    /// Execute the check command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // Warnings are printed below, so the sink stays off stderr
        let manager = build_manager(global, Arc::new(LogEventSink))?;
        require_namespace(&manager, &self.namespace)?;
        let report = manager.load(&self.namespace)?;

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        for warning in &report.warnings {
            writeln!(handle, "WARN: {warning}")?;
        }
        if !global.quiet {
            writeln!(
                handle,
                "{}: {} file(s), {} propert{}, {} warning(s)",
                report.namespace,
                report.files.len(),
                report.resolved.len(),
                if report.resolved.len() == 1 { "y" } else { "ies" },
                report.warnings.len()
            )?;
        }

        if self.strict && report.has_warnings() {
            return Err(CliError::SemanticFailure(format!(
                "{} warning(s) in namespace '{}'",
                report.warnings.len(),
                report.namespace
            )));
        }
        Ok(())
    }
}
