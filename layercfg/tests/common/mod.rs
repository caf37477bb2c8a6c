//! Common test utilities for integration tests.
//!
//! Provides a scratch workspace rooted in a temporary directory and an RAII
//! guard for process environment variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use layercfg::{CollectingSink, ConfigManager, ConfigManagerBuilder, MapEnvironment};
use tempfile::TempDir;

/// A temporary manager root with a collecting sink.
///
/// The directory will be automatically cleaned up when the workspace is
/// dropped.
pub struct Workspace {
    pub dir: TempDir,
    pub sink: Arc<CollectingSink>,
}

#[allow(dead_code)]
impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            sink: Arc::new(CollectingSink::new()),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Writes `text` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, text: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    /// Builder rooted here with an empty environment.
    pub fn builder(&self) -> ConfigManagerBuilder {
        ConfigManager::builder()
            .with_root(self.root())
            .with_environment(MapEnvironment::new())
            .with_sink(self.sink.clone())
    }

    pub fn manager(&self) -> ConfigManager {
        self.builder().build()
    }
}

/// RAII guard for setting and restoring environment variables.
///
/// Note: Tests using environment variables should not run in parallel.
/// Use the `#[serial]` attribute.
#[allow(dead_code)]
pub struct EnvGuard {
    key: String,
    old_value: Option<String>,
}

#[allow(dead_code)]
impl EnvGuard {
    pub fn new(key: &str, value: &str) -> Self {
        let old_value = env::var(key).ok();
        env::set_var(key, value);
        Self {
            key: key.to_string(),
            old_value,
        }
    }

    /// Create a guard that removes the env var.
    pub fn remove(key: &str) -> Self {
        let old_value = env::var(key).ok();
        env::remove_var(key);
        Self {
            key: key.to_string(),
            old_value,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.old_value {
            Some(val) => env::set_var(&self.key, val),
            None => env::remove_var(&self.key),
        }
    }
}
