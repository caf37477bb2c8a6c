//! Shell completion generation command.
//!
//! Prints a completion script for bash, zsh, fish, PowerShell or elvish on
//! stdout. Installation hints go to stderr unless `--quiet` is set.

use crate::cli::Cli;
use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use std::io;

/// Name of the installed binary
const BIN_NAME: &str = "layercfg";

/// Generate shell completion scripts
#[derive(Parser)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// How to enable the script for `shell`.
fn install_hint(shell: Shell) -> &'static [&'static str] {
    match shell {
        Shell::Bash => &[
            "#   layercfg completions bash > ~/.local/share/bash-completion/completions/layercfg",
            "# Or add to ~/.bashrc:",
            "#   eval \"$(layercfg completions bash)\"",
        ],
        Shell::Zsh => &[
            "#   layercfg completions zsh > ~/.zsh/completions/_layercfg",
            "# Make sure ~/.zsh/completions is in your $fpath",
        ],
        Shell::Fish => &["#   layercfg completions fish > ~/.config/fish/completions/layercfg.fish"],
        Shell::PowerShell => &[
            "#   layercfg completions powershell | Out-String | Invoke-Expression",
        ],
        _ => &[],
    }
}

impl CompletionsCommand {
    /// Execute the completions command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let hint = install_hint(self.shell);
        if !global.quiet && !hint.is_empty() {
            eprintln!("# To enable {} completions:", self.shell);
            for line in hint {
                eprintln!("{line}");
            }
            eprintln!();
        }

        let mut cmd = Cli::command();
        generate(self.shell, &mut cmd, BIN_NAME, &mut io::stdout());
        Ok(())
    }
}
