//! Cross-file duplicate key detection.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

type FileKeys = BTreeMap<PathBuf, BTreeSet<String>>;

/// Records which file of a namespace declared which key.
///
/// A key registered from a second file is reported back so the caller can
/// warn; re-registering a key from the same file is silent.
///
/// # Examples
///
/// ```
/// use layercfg::registry::DuplicateKeyRegistry;
/// use std::path::Path;
///
/// let registry = DuplicateKeyRegistry::new();
/// assert!(registry.register("game", Path::new("a.properties"), "Rate").is_empty());
/// let earlier = registry.register("game", Path::new("b.properties"), "Rate");
/// assert_eq!(earlier, vec![Path::new("a.properties").to_path_buf()]);
/// ```
#[derive(Debug, Default)]
pub struct DuplicateKeyRegistry {
    namespaces: Mutex<BTreeMap<String, FileKeys>>,
}

impl DuplicateKeyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` for `file` and returns every other file of `namespace`
    /// that already declared it.
    pub fn register(&self, namespace: &str, file: &Path, key: &str) -> Vec<PathBuf> {
        let mut namespaces = self.namespaces.lock();
        let files = namespaces.entry(namespace.to_string()).or_default();

        let conflicts = files
            .iter()
            .filter(|(path, keys)| path.as_path() != file && keys.contains(key))
            .map(|(path, _)| path.clone())
            .collect();

        files
            .entry(file.to_path_buf())
            .or_default()
            .insert(key.to_string());
        conflicts
    }

    /// Forgets everything recorded for `namespace`.
    pub fn clear(&self, namespace: &str) {
        self.namespaces.lock().remove(namespace);
    }

    /// Forgets everything.
    pub fn clear_all(&self) {
        self.namespaces.lock().clear();
    }

    /// Files with recorded keys in `namespace`.
    #[must_use]
    pub fn files(&self, namespace: &str) -> Vec<PathBuf> {
        self.namespaces
            .lock()
            .get(namespace)
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of namespaces with recorded keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.namespaces.lock().len()
    }

    /// Returns true if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.namespaces.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_file_is_silent() {
        let registry = DuplicateKeyRegistry::new();
        let file = Path::new("config/a.properties");
        assert!(registry.register("game", file, "Rate").is_empty());
        assert!(registry.register("game", file, "Rate").is_empty());
    }

    #[test]
    fn test_reports_each_conflicting_file_once() {
        let registry = DuplicateKeyRegistry::new();
        registry.register("game", Path::new("a"), "Rate");
        registry.register("game", Path::new("b"), "Rate");
        let conflicts = registry.register("game", Path::new("c"), "Rate");
        assert_eq!(conflicts, vec![PathBuf::from("a"), PathBuf::from("b")]);
    }

    #[test]
    fn test_namespaces_are_independent() {
        let registry = DuplicateKeyRegistry::new();
        registry.register("game", Path::new("a"), "Rate");
        assert!(registry.register("login", Path::new("b"), "Rate").is_empty());
        assert_eq!(registry.len(), 2);

        registry.clear("game");
        assert!(registry.files("game").is_empty());
        assert_eq!(registry.files("login"), vec![PathBuf::from("b")]);

        registry.clear_all();
        assert!(registry.is_empty());
    }
}
