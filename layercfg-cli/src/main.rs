//! Main entry point for the layercfg CLI.
//!
//! This is the command-line interface for layered properties configuration.
//! It provides commands for working with a schema manifest:
//! - `generate`: Write base files from schema defaults
//! - `show`: Print resolved values and where they came from
//! - `check`: Report missing, invalid and duplicate properties
//! - `namespaces`: List declared namespaces

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let logger = layercfg::init_logger(cli.verbose, cli.quiet);

    // Convert CLI args to GlobalOptions
    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        manifest: cli.manifest,
        root: cli.root,
        no_override: cli.no_override,
        override_file: cli.override_file,
        properties: cli.properties,
        logger,
    };

    // Execute the command
    let result = match cli.command {
        cli::Command::Generate(cmd) => cmd.execute(&global),
        cli::Command::Show(cmd) => cmd.execute(&global),
        cli::Command::Check(cmd) => cmd.execute(&global),
        cli::Command::Namespaces(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
