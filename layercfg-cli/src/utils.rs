//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including manifest loading and manager construction.

use crate::error::CliError;
use layercfg::{ConfigManager, EventSink, Logger, Manifest};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
#[allow(dead_code)] // Fields used via pattern matching in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Schema manifest path.
    pub manifest: PathBuf,

    /// Root directory for base files.
    pub root: Option<PathBuf>,

    /// Ignore the override file.
    pub no_override: bool,

    /// Override file path.
    pub override_file: Option<PathBuf>,

    /// Process properties from `-D`.
    pub properties: Vec<(String, String)>,

    /// Logger that renders engine events.
    pub logger: Logger,
}

/// Parse a `NAME=VALUE` process property.
pub fn parse_property(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid property '{s}': expected NAME=VALUE"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid property '{s}': name is empty"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Load and parse the manifest named by the global options.
pub fn load_manifest(global: &GlobalOptions) -> Result<Manifest, CliError> {
    if !global.manifest.is_file() {
        return Err(CliError::Config(format!(
            "manifest not found: {}",
            global.manifest.display()
        )));
    }
    Manifest::load(&global.manifest).map_err(|e| match e {
        layercfg::Error::Io(io) => CliError::Io(io),
        other => CliError::Config(other.to_string()),
    })
}

/// Resolve the root directory: `--root`, else the manifest's directory.
pub fn resolve_root(global: &GlobalOptions) -> PathBuf {
    if let Some(root) = &global.root {
        return root.clone();
    }
    match global.manifest.parent() {
        Some(parent) if parent != Path::new("") => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Build a manager for the manifest, rendering events through `sink`.
///
/// Every declared namespace is registered.
pub fn build_manager(
    global: &GlobalOptions,
    sink: Arc<dyn EventSink>,
) -> Result<ConfigManager, CliError> {
    let manifest = load_manifest(global)?;

    let mut builder = ConfigManager::builder()
        .with_root(resolve_root(global))
        .with_override_enabled(!global.no_override)
        .with_sink(sink);
    if let Some(path) = &global.override_file {
        builder = builder.with_override_file(path);
    }
    for (name, value) in &global.properties {
        builder = builder.with_process_property(name, value);
    }
    let manager = builder.build();

    let namespaces = manifest
        .build_namespaces()
        .map_err(|e| CliError::Config(e.to_string()))?;
    for namespace in namespaces {
        manager.register(namespace)?;
    }
    Ok(manager)
}

/// Fail with `InvalidArguments` unless `namespace` is registered.
pub fn require_namespace(manager: &ConfigManager, namespace: &str) -> Result<(), CliError> {
    if manager.namespace(namespace).is_some() {
        return Ok(());
    }
    let known = manager.namespace_names();
    Err(CliError::InvalidArguments(if known.is_empty() {
        format!("unknown namespace '{namespace}': the manifest declares none")
    } else {
        format!(
            "unknown namespace '{namespace}' (declared: {})",
            known.join(", ")
        )
    }))
}
