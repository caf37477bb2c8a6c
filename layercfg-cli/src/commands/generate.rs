//! Generate command implementation.
//!
//! Writes every base file of a namespace from its schema defaults,
//! overwriting existing files, or prints them with `--stdout`.

use crate::error::CliError;
use crate::utils::{build_manager, require_namespace, GlobalOptions};
use clap::Args;
use layercfg::generator;
use std::io::Write;
use std::sync::Arc;

/// Write the base files of a namespace from its defaults.
#[derive(Args)]
pub struct GenerateCommand {
    /// Namespace to generate
    #[arg(value_name = "NAMESPACE")]
    pub namespace: String,

    /// Print the files instead of writing them
    #[arg(long)]
    pub stdout: bool,
}

impl GenerateCommand {
    /// Execute the generate command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let manager = build_manager(global, Arc::new(global.logger))?;
        require_namespace(&manager, &self.namespace)?;

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();

        if self.stdout {
            let Some(namespace) = manager.namespace(&self.namespace) else {
                return Ok(());
            };
            let many = namespace.files().len() > 1;
            for (i, file) in namespace.files().iter().enumerate() {
                if many {
                    if i > 0 {
                        writeln!(handle)?;
                    }
                    writeln!(handle, "==> {} <==", file.relative_path().display())?;
                }
                write!(handle, "{}", generator::render(file))?;
            }
            return Ok(());
        }

        let written = manager.generate(&self.namespace)?;
        if !global.quiet {
            for path in &written {
                writeln!(handle, "{}", path.display())?;
            }
        }
        Ok(())
    }
}
