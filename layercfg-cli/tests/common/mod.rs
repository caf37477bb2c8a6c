//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with a temporary root and manifest
//! - Command builder helpers for common patterns

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Manifest used by most tests.
pub const MANIFEST: &str = r#"
enums:
  Difficulty: [EASY, NORMAL, HARD]
namespaces:
  - name: game.server
    files:
      - file_name: server
        comment: ["Server settings"]
        entries:
          - key: Port
            type: int
            default: 7777
            comment: ["Listen port"]
            reloadable: false
          - key: Motd
            type: string
            default: Welcome
          - key: Modes
            type: set<enum:Difficulty>
            default: "*"
      - file_name: rates
        entries:
          - key: Xp
            type: double
            default: 1.0
          - key: Tick
            type: duration
            default: 1hour30min20sec
  - name: login
    files:
      - file_name: login
        entries:
          - key: MaxClients
            type: int
            default: 100
"#;

/// Test environment with an isolated root directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment with the default manifest.
    pub fn new() -> Self {
        Self::with_manifest(MANIFEST)
    }

    /// Create a test environment with a custom manifest.
    pub fn with_manifest(manifest: &str) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        std::fs::write(temp_path.join("layercfg.yaml"), manifest)
            .expect("Failed to write manifest");
        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Get a bare command builder without pre-configured flags.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("layercfg").expect("Failed to find layercfg binary");
        for var in ["LAYERCFG_MANIFEST", "LAYERCFG_ROOT", "LAYERCFG_OUTPUT_FORMAT"] {
            cmd.env_remove(var);
        }
        cmd.env("LAYERCFG_LOG_MODE", "normal");
        cmd
    }

    /// Get a command builder with the manifest pre-configured.
    ///
    /// The root defaults to the manifest's directory.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--manifest").arg(self.temp_path.join("layercfg.yaml"));
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write a file below the root, creating parent directories.
    pub fn write(&self, relative: &str, text: &str) {
        let path = self.temp_path.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create directory");
        std::fs::write(path, text).expect("Failed to write file");
    }

    /// Read a file below the root.
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.temp_path.join(relative)).expect("Failed to read file")
    }

    /// Run `show <namespace> --format json` and parse the output.
    pub fn show_json(&self, namespace: &str, extra: &[&str]) -> Vec<serde_json::Value> {
        let output = self
            .command()
            .args(extra)
            .args(["show", namespace, "--format", "json"])
            .output()
            .expect("Failed to run show");
        assert!(
            output.status.success(),
            "show failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice::<serde_json::Value>(&output.stdout)
            .expect("show output should be JSON")
            .as_array()
            .expect("show output should be an array")
            .clone()
    }
}

/// Find the value stored for `key` in `show --format json` output.
#[allow(dead_code)]
pub fn value_of<'a>(items: &'a [serde_json::Value], key: &str) -> &'a serde_json::Value {
    items
        .iter()
        .rev()
        .find(|item| item["key"] == key)
        .unwrap_or_else(|| panic!("no value for {key}"))
}
