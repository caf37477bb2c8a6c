//! Namespaces command implementation.
//!
//! Lists the namespaces declared in the manifest with their files.

use crate::error::CliError;
use crate::utils::{load_manifest, resolve_root, GlobalOptions};
use clap::Args;
use std::io::Write;

/// List the namespaces declared in the manifest.
#[derive(Args)]
pub struct NamespacesCommand {
    /// Show each namespace's base files
    #[arg(long)]
    pub files: bool,
}

impl NamespacesCommand {
    /// Execute the namespaces command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let manifest = load_manifest(global)?;
        let namespaces = manifest
            .build_namespaces()
            .map_err(|e| CliError::Config(e.to_string()))?;
        let root = resolve_root(global);

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        for namespace in &namespaces {
            writeln!(handle, "{}", namespace.name())?;
            if self.files {
                for file in namespace.files() {
                    let marker = if file.path_in(&root).exists() {
                        ""
                    } else {
                        "  (missing)"
                    };
                    writeln!(handle, "  {}{marker}", file.relative_path().display())?;
                }
            }
        }
        Ok(())
    }
}
