//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    CheckCommand, CompletionsCommand, GenerateCommand, NamespacesCommand, ShowCommand,
};
use crate::utils::parse_property;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for layered properties configuration.
#[derive(Parser)]
#[command(name = "layercfg")]
#[command(
    version,
    about = "Generate and inspect layered properties configuration",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Schema manifest to load
    #[arg(
        long,
        value_name = "PATH",
        global = true,
        env = "LAYERCFG_MANIFEST",
        default_value = "layercfg.yaml"
    )]
    pub manifest: PathBuf,

    /// Directory base files live under (defaults to the manifest's directory)
    #[arg(long, value_name = "DIR", global = true, env = "LAYERCFG_ROOT")]
    pub root: Option<PathBuf>,

    /// Ignore the override file
    #[arg(long, global = true)]
    pub no_override: bool,

    /// Override file to read instead of config/override.properties
    #[arg(long, value_name = "PATH", global = true, conflicts_with = "no_override")]
    pub override_file: Option<PathBuf>,

    /// Set a process property (repeatable), e.g. -D server.Port=9000
    #[arg(
        short = 'D',
        value_name = "NAME=VALUE",
        global = true,
        value_parser = parse_property
    )]
    pub properties: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Write the base files of a namespace from its defaults
    Generate(GenerateCommand),

    /// Load a namespace and print the resolved values
    Show(ShowCommand),

    /// Load a namespace and report problems
    Check(CheckCommand),

    /// List the namespaces declared in the manifest
    Namespaces(NamespacesCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
