//! Build script for layercfg-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
/// When adding/removing/modifying commands, update both files.
fn build_cli() -> Command {
    let namespace = || {
        Arg::new("namespace")
            .value_name("NAMESPACE")
            .required(true)
            .help("Namespace to operate on")
    };

    Command::new("layercfg")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate and inspect layered properties configuration")
        .long_about(
            "Command-line tool for schema-driven properties files resolved from environment \
             variables, process properties, an override file and base files",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("manifest")
                .long("manifest")
                .help("Schema manifest to load")
                .value_name("PATH")
                .global(true)
                .default_value("layercfg.yaml")
                .env("LAYERCFG_MANIFEST"),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .help("Directory base files live under (defaults to the manifest's directory)")
                .value_name("DIR")
                .global(true)
                .env("LAYERCFG_ROOT"),
        )
        .arg(
            Arg::new("no-override")
                .long("no-override")
                .help("Ignore the override file")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("override-file")
                .long("override-file")
                .help("Override file to read instead of config/override.properties")
                .value_name("PATH")
                .global(true),
        )
        .arg(
            Arg::new("properties")
                .short('D')
                .help("Set a process property (repeatable), e.g. -D server.Port=9000")
                .value_name("NAME=VALUE")
                .global(true)
                .action(ArgAction::Append),
        )
        .subcommands(vec![
            Command::new("generate")
                .about("Write the base files of a namespace from its defaults")
                .long_about("Write every base file of a namespace, overwriting existing files")
                .arg(namespace())
                .arg(
                    Arg::new("stdout")
                        .long("stdout")
                        .help("Print the files instead of writing them")
                        .action(ArgAction::SetTrue),
                ),
            Command::new("show")
                .about("Load a namespace and print the resolved values")
                .long_about("Load a namespace and print each stored value and its origin")
                .arg(namespace())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .help("Output format")
                        .value_parser([
                            "table",
                            "json",
                            "yaml",
                            "csv",
                            "tsv",
                            "properties",
                            "dotenv",
                            "export",
                        ])
                        .default_value("table")
                        .env("LAYERCFG_OUTPUT_FORMAT"),
                )
                .arg(
                    Arg::new("origin")
                        .long("origin")
                        .help("Show which layer each value came from")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("shell")
                        .long("shell")
                        .help("Shell for --format export (detected when omitted)")
                        .value_name("SHELL"),
                ),
            Command::new("check")
                .about("Load a namespace and report problems")
                .long_about("Report missing, invalid and duplicate properties and failing hooks")
                .arg(namespace())
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .help("Exit with status 1 if any warning was raised")
                        .action(ArgAction::SetTrue),
                ),
            Command::new("namespaces")
                .about("List the namespaces declared in the manifest")
                .arg(
                    Arg::new("files")
                        .long("files")
                        .help("Show each namespace's base files")
                        .action(ArgAction::SetTrue),
                ),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() {
    // Generate man pages at build time
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("layercfg.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
