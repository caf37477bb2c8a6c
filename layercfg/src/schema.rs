//! Declared configuration schemas.
//!
//! A [`Namespace`] owns an ordered list of [`ConfigFile`]s, each of which owns
//! an ordered list of [`SchemaEntry`]s. Entries are bound to a slot through
//! the [`FieldBinding`] capability; the engine writes resolved values into the
//! slot and the program reads them back.
//!
//! # Examples
//!
//! ```
//! use layercfg::schema::{ConfigFile, ConfigSlot, Namespace, SchemaEntry};
//!
//! let port: ConfigSlot<i32> = ConfigSlot::new();
//! let file = ConfigFile::builder("server")
//!     .comment(["Server settings"])
//!     .entry(SchemaEntry::bind("Port", "7777", &port).with_reloadable(false))
//!     .build()
//!     .unwrap();
//! let namespace = Namespace::builder("game.server").file(file).build().unwrap();
//!
//! assert_eq!(namespace.short_name(), "server");
//! assert_eq!(namespace.env_var_name("Port"), "SERVER_PORT");
//! assert_eq!(namespace.property_name("Port"), "server.Port");
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::component::MAIN_CONVERTER;
use crate::convert::{ConfigValue, ConversionError, TypeDescriptor, Value};
use crate::error::{Error, Result};

/// Default directory of base files, relative to the manager root.
pub const DEFAULT_PATH: &str = "config";

/// Default base file extension.
pub const DEFAULT_EXTENSION: &str = ".properties";

/// Read/write access to the storage an entry is bound to.
pub trait FieldBinding: Send + Sync {
    /// The current value, if one has been set.
    fn get(&self) -> Option<Value>;

    /// Stores a new value.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::TypeMismatch`] if the slot cannot hold
    /// `value`.
    fn set(&self, value: Value) -> std::result::Result<(), ConversionError>;
}

/// A typed, shareable value cell.
///
/// Clones share the same storage, so a program can keep one handle and give
/// another to a [`SchemaEntry`].
pub struct ConfigSlot<T> {
    value: Arc<RwLock<Option<T>>>,
}

impl<T: ConfigValue> ConfigSlot<T> {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: Arc::new(RwLock::new(None)),
        }
    }

    /// The current value, `None` until the first load.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.value.read().clone()
    }

    /// Whether a value has been stored.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.value.read().is_some()
    }
}

impl<T: ConfigValue> Default for ConfigSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ConfigSlot<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ConfigSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConfigSlot").field(&*self.value.read()).finish()
    }
}

impl<T: ConfigValue> FieldBinding for ConfigSlot<T> {
    fn get(&self) -> Option<Value> {
        self.value.read().clone().map(ConfigValue::into_value)
    }

    fn set(&self, value: Value) -> std::result::Result<(), ConversionError> {
        let typed = T::from_value(value)?;
        *self.value.write() = Some(typed);
        Ok(())
    }
}

/// An untyped value cell checked against a descriptor at set time.
///
/// Used for schemas that are only known at runtime, such as manifests.
#[derive(Debug, Clone)]
pub struct DynamicSlot {
    ty: TypeDescriptor,
    value: Arc<RwLock<Option<Value>>>,
}

impl DynamicSlot {
    /// Creates an empty slot for values of type `ty`.
    #[must_use]
    pub fn new(ty: TypeDescriptor) -> Self {
        Self {
            ty,
            value: Arc::new(RwLock::new(None)),
        }
    }

    /// The descriptor values must conform to.
    #[must_use]
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// The current value.
    #[must_use]
    pub fn get(&self) -> Option<Value> {
        self.value.read().clone()
    }
}

impl FieldBinding for DynamicSlot {
    fn get(&self) -> Option<Value> {
        self.value.read().clone()
    }

    fn set(&self, value: Value) -> std::result::Result<(), ConversionError> {
        if !value.conforms_to(&self.ty) {
            return Err(ConversionError::mismatch(&self.ty, &value));
        }
        *self.value.write() = Some(value);
        Ok(())
    }
}

/// A named section banner in a generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMarker {
    /// Section name.
    pub name: String,
    /// Comment lines printed with the banner.
    pub comment: Vec<String>,
}

impl GroupMarker {
    /// Creates a marker without comment lines.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: Vec::new(),
        }
    }

    /// Sets the comment lines.
    #[must_use]
    pub fn with_comment<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comment = lines.into_iter().map(Into::into).collect();
        self
    }
}

/// One declared configurable value.
#[derive(Clone)]
pub struct SchemaEntry {
    key: String,
    default_literal: String,
    declared_type: TypeDescriptor,
    converter: String,
    supplier: Option<String>,
    hook: Option<String>,
    reloadable: bool,
    comment: Vec<String>,
    comment_only: bool,
    group_start: Option<GroupMarker>,
    group_end: Option<GroupMarker>,
    binding: Option<Arc<dyn FieldBinding>>,
}

impl SchemaEntry {
    /// Creates an entry writing to an arbitrary binding.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        default_literal: impl Into<String>,
        declared_type: TypeDescriptor,
        binding: Arc<dyn FieldBinding>,
    ) -> Self {
        Self {
            key: key.into(),
            default_literal: default_literal.into(),
            declared_type,
            converter: MAIN_CONVERTER.to_string(),
            supplier: None,
            hook: None,
            reloadable: true,
            comment: Vec::new(),
            comment_only: false,
            group_start: None,
            group_end: None,
            binding: Some(binding),
        }
    }

    /// Creates an entry bound to a typed slot. The declared type is taken
    /// from `T`.
    #[must_use]
    pub fn bind<T: ConfigValue>(
        key: impl Into<String>,
        default_literal: impl Into<String>,
        slot: &ConfigSlot<T>,
    ) -> Self {
        Self::new(key, default_literal, T::type_descriptor(), Arc::new(slot.clone()))
    }

    /// Creates an entry bound to a dynamic slot.
    #[must_use]
    pub fn dynamic(
        key: impl Into<String>,
        default_literal: impl Into<String>,
        slot: &DynamicSlot,
    ) -> Self {
        Self::new(key, default_literal, slot.ty().clone(), Arc::new(slot.clone()))
    }

    /// Creates an entry that only contributes comment lines (and optionally
    /// group banners) to the generated file.
    #[must_use]
    pub fn comment_only<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: String::new(),
            default_literal: String::new(),
            declared_type: TypeDescriptor::String,
            converter: MAIN_CONVERTER.to_string(),
            supplier: None,
            hook: None,
            reloadable: true,
            comment: lines.into_iter().map(Into::into).collect(),
            comment_only: true,
            group_start: None,
            group_end: None,
            binding: None,
        }
    }

    /// Sets the converter id.
    #[must_use]
    pub fn with_converter(mut self, id: impl Into<String>) -> Self {
        self.converter = id.into();
        self
    }

    /// Sets the supplier id.
    #[must_use]
    pub fn with_supplier(mut self, id: impl Into<String>) -> Self {
        self.supplier = Some(id.into());
        self
    }

    /// Sets the field hook id.
    #[must_use]
    pub fn with_hook(mut self, id: impl Into<String>) -> Self {
        self.hook = Some(id.into());
        self
    }

    /// Marks whether the entry is re-resolved on reload.
    #[must_use]
    pub fn with_reloadable(mut self, reloadable: bool) -> Self {
        self.reloadable = reloadable;
        self
    }

    /// Sets the comment lines written above the entry.
    #[must_use]
    pub fn with_comment<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comment = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Opens a section banner before this entry.
    #[must_use]
    pub fn with_group_start(mut self, marker: GroupMarker) -> Self {
        self.group_start = Some(marker);
        self
    }

    /// Closes a section banner after this entry.
    #[must_use]
    pub fn with_group_end(mut self, marker: GroupMarker) -> Self {
        self.group_end = Some(marker);
        self
    }

    /// Property key. Empty for comment-only entries.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Default literal.
    #[must_use]
    pub fn default_literal(&self) -> &str {
        &self.default_literal
    }

    /// Declared value type.
    #[must_use]
    pub fn declared_type(&self) -> &TypeDescriptor {
        &self.declared_type
    }

    /// Converter id.
    #[must_use]
    pub fn converter(&self) -> &str {
        &self.converter
    }

    /// Supplier id, `None` for the default supplier.
    #[must_use]
    pub fn supplier(&self) -> Option<&str> {
        self.supplier.as_deref()
    }

    /// Field hook id.
    #[must_use]
    pub fn hook(&self) -> Option<&str> {
        self.hook.as_deref()
    }

    /// Whether the entry is re-resolved on reload.
    #[must_use]
    pub fn is_reloadable(&self) -> bool {
        self.reloadable
    }

    /// Comment lines.
    #[must_use]
    pub fn comment(&self) -> &[String] {
        &self.comment
    }

    /// Whether the entry only carries comments.
    #[must_use]
    pub fn is_comment_only(&self) -> bool {
        self.comment_only
    }

    /// Section opened before the entry.
    #[must_use]
    pub fn group_start(&self) -> Option<&GroupMarker> {
        self.group_start.as_ref()
    }

    /// Section closed after the entry.
    #[must_use]
    pub fn group_end(&self) -> Option<&GroupMarker> {
        self.group_end.as_ref()
    }

    /// The bound slot. `None` for comment-only entries.
    #[must_use]
    pub fn binding(&self) -> Option<&Arc<dyn FieldBinding>> {
        self.binding.as_ref()
    }

    /// The value currently held by the bound slot.
    #[must_use]
    pub fn current_value(&self) -> Option<Value> {
        self.binding.as_ref().and_then(|b| b.get())
    }

    fn validate(&self, owner: &str) -> Result<()> {
        if self.comment_only {
            return Ok(());
        }
        if self.key.trim().is_empty() {
            return Err(Error::invalid_schema(owner, "entry with an empty key"));
        }
        if self.key.chars().any(|c| c.is_whitespace() || c == '=' || c == ':') {
            return Err(Error::invalid_schema(
                owner,
                format!("key '{}' contains a separator character", self.key),
            ));
        }
        self.declared_type
            .validate()
            .map_err(|reason| Error::invalid_schema(format!("{owner}/{}", self.key), reason))
    }
}

impl fmt::Debug for SchemaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaEntry")
            .field("key", &self.key)
            .field("default_literal", &self.default_literal)
            .field("declared_type", &self.declared_type)
            .field("converter", &self.converter)
            .field("supplier", &self.supplier)
            .field("hook", &self.hook)
            .field("reloadable", &self.reloadable)
            .field("comment_only", &self.comment_only)
            .finish_non_exhaustive()
    }
}

/// A group of entries backed by one base file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path_names: Vec<String>,
    file_name: String,
    extension: String,
    comment: Vec<String>,
    hook: Option<String>,
    entries: Vec<SchemaEntry>,
}

impl ConfigFile {
    /// Starts building a file named `file_name`.
    #[must_use]
    pub fn builder(file_name: impl Into<String>) -> ConfigFileBuilder {
        ConfigFileBuilder {
            path_names: vec![DEFAULT_PATH.to_string()],
            file_name: file_name.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            comment: Vec::new(),
            hook: None,
            entries: Vec::new(),
        }
    }

    /// Directory components below the root.
    #[must_use]
    pub fn path_names(&self) -> &[String] {
        &self.path_names
    }

    /// File name without extension.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Extension including the leading dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File comment lines.
    #[must_use]
    pub fn comment(&self) -> &[String] {
        &self.comment
    }

    /// File hook id.
    #[must_use]
    pub fn hook(&self) -> Option<&str> {
        self.hook.as_deref()
    }

    /// Entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    /// Keys of the non-comment entries.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| !e.is_comment_only())
            .map(SchemaEntry::key)
    }

    /// Looks up an entry by key.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries
            .iter()
            .find(|e| !e.is_comment_only() && e.key() == key)
    }

    /// Path relative to the manager root.
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self.path_names.iter().collect();
        path.push(format!("{}{}", self.file_name, self.extension));
        path
    }

    /// Path below `root`.
    #[must_use]
    pub fn path_in(&self, root: &Path) -> PathBuf {
        root.join(self.relative_path())
    }
}

/// Builder for [`ConfigFile`].
#[derive(Debug)]
pub struct ConfigFileBuilder {
    path_names: Vec<String>,
    file_name: String,
    extension: String,
    comment: Vec<String>,
    hook: Option<String>,
    entries: Vec<SchemaEntry>,
}

impl ConfigFileBuilder {
    /// Sets the directory components (default `["config"]`).
    #[must_use]
    pub fn path<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the extension (default `.properties`).
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets the file comment lines.
    #[must_use]
    pub fn comment<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comment = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the file hook id.
    #[must_use]
    pub fn hook(mut self, id: impl Into<String>) -> Self {
        self.hook = Some(id.into());
        self
    }

    /// Appends an entry.
    #[must_use]
    pub fn entry(mut self, entry: SchemaEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Appends several entries.
    #[must_use]
    pub fn entries(mut self, entries: impl IntoIterator<Item = SchemaEntry>) -> Self {
        self.entries.extend(entries);
        self
    }

    /// Validates and builds the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] if the file name is empty, an entry
    /// is malformed or a key is declared twice.
    pub fn build(self) -> Result<ConfigFile> {
        if self.file_name.trim().is_empty() {
            return Err(Error::invalid_schema("<unnamed>", "empty file name"));
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            entry.validate(&self.file_name)?;
            if !entry.is_comment_only() && !seen.insert(entry.key()) {
                return Err(Error::invalid_schema(
                    &self.file_name,
                    format!("duplicate key '{}'", entry.key()),
                ));
            }
        }

        Ok(ConfigFile {
            path_names: self.path_names,
            file_name: self.file_name,
            extension: self.extension,
            comment: self.comment,
            hook: self.hook,
            entries: self.entries,
        })
    }
}

/// A named, ordered set of config files loaded together.
#[derive(Debug, Clone)]
pub struct Namespace {
    name: String,
    files: Vec<ConfigFile>,
}

impl Namespace {
    /// Starts building a namespace.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> NamespaceBuilder {
        NamespaceBuilder {
            name: name.into(),
            files: Vec::new(),
        }
    }

    /// Full name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last `.`-separated segment of the name.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Files in load order.
    #[must_use]
    pub fn files(&self) -> &[ConfigFile] {
        &self.files
    }

    /// Environment variable consulted for `key`.
    #[must_use]
    pub fn env_var_name(&self, key: &str) -> String {
        format!("{}_{key}", self.short_name()).to_uppercase()
    }

    /// Process property consulted for `key`.
    #[must_use]
    pub fn property_name(&self, key: &str) -> String {
        format!("{}.{key}", self.short_name())
    }
}

/// Builder for [`Namespace`].
#[derive(Debug)]
pub struct NamespaceBuilder {
    name: String,
    files: Vec<ConfigFile>,
}

impl NamespaceBuilder {
    /// Appends a file.
    #[must_use]
    pub fn file(mut self, file: ConfigFile) -> Self {
        self.files.push(file);
        self
    }

    /// Validates and builds the namespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] if the name is empty or two files
    /// resolve to the same path.
    pub fn build(self) -> Result<Namespace> {
        if self.name.trim().is_empty() || self.name.split('.').any(str::is_empty) {
            return Err(Error::invalid_schema(&self.name, "invalid namespace name"));
        }

        let mut seen = HashSet::new();
        for file in &self.files {
            let path = file.relative_path();
            if !seen.insert(path.clone()) {
                return Err(Error::invalid_schema(
                    &self.name,
                    format!("file '{}' declared twice", path.display()),
                ));
            }
        }

        Ok(Namespace {
            name: self.name,
            files: self.files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_slot_shares_storage() {
        let slot: ConfigSlot<i32> = ConfigSlot::new();
        let handle = slot.clone();
        assert!(!slot.is_set());

        FieldBinding::set(&handle, Value::Int(9)).unwrap();
        assert_eq!(slot.get(), Some(9));
        assert_eq!(FieldBinding::get(&slot), Some(Value::Int(9)));
    }

    #[test]
    fn test_config_slot_rejects_wrong_shape() {
        let slot: ConfigSlot<i32> = ConfigSlot::new();
        let err = FieldBinding::set(&slot, Value::Bool(true)).unwrap_err();
        assert!(matches!(err, ConversionError::TypeMismatch { .. }));
        assert!(!slot.is_set());
    }

    #[test]
    fn test_dynamic_slot_checks_type() {
        let slot = DynamicSlot::new(TypeDescriptor::List(Box::new(TypeDescriptor::Int)));
        assert!(FieldBinding::set(&slot, Value::Int(1)).is_err());
        FieldBinding::set(&slot, Value::List(vec![Value::Int(1)])).unwrap();
        assert_eq!(slot.get(), Some(Value::List(vec![Value::Int(1)])));
    }

    #[test]
    fn test_entry_defaults() {
        let slot: ConfigSlot<bool> = ConfigSlot::new();
        let entry = SchemaEntry::bind("Enabled", "true", &slot);
        assert_eq!(entry.key(), "Enabled");
        assert_eq!(entry.declared_type(), &TypeDescriptor::Bool);
        assert_eq!(entry.converter(), MAIN_CONVERTER);
        assert!(entry.is_reloadable());
        assert!(entry.supplier().is_none());
        assert!(entry.current_value().is_none());
    }

    #[test]
    fn test_file_paths() {
        let file = ConfigFile::builder("world")
            .path(["data", "cfg"])
            .extension(".cfg")
            .build()
            .unwrap();
        assert_eq!(file.relative_path(), PathBuf::from("data/cfg/world.cfg"));
        assert_eq!(
            file.path_in(Path::new("/srv")),
            PathBuf::from("/srv/data/cfg/world.cfg")
        );

        let default = ConfigFile::builder("server").build().unwrap();
        assert_eq!(
            default.relative_path(),
            PathBuf::from("config/server.properties")
        );
    }

    #[test]
    fn test_file_rejects_duplicate_keys() {
        let a: ConfigSlot<i32> = ConfigSlot::new();
        let b: ConfigSlot<i32> = ConfigSlot::new();
        let err = ConfigFile::builder("server")
            .entry(SchemaEntry::bind("Port", "1", &a))
            .entry(SchemaEntry::comment_only(["----"]))
            .entry(SchemaEntry::bind("Port", "2", &b))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate key 'Port'"));
    }

    #[test]
    fn test_comment_only_entries_are_not_keys() {
        let slot: ConfigSlot<String> = ConfigSlot::new();
        let file = ConfigFile::builder("server")
            .entry(SchemaEntry::comment_only(["first"]))
            .entry(SchemaEntry::comment_only(["second"]))
            .entry(SchemaEntry::bind("Motd", "hello", &slot))
            .build()
            .unwrap();
        assert_eq!(file.keys().collect::<Vec<_>>(), vec!["Motd"]);
        assert!(file.entry("Motd").is_some());
        assert!(file.entry("").is_none());
    }

    #[test]
    fn test_entry_validation() {
        let slot = DynamicSlot::new(TypeDescriptor::Int);
        let err = ConfigFile::builder("server")
            .entry(SchemaEntry::dynamic("Bad Key", "1", &slot))
            .build()
            .unwrap_err();
        assert!(err.is_schema_error());

        let nested = DynamicSlot::new(TypeDescriptor::List(Box::new(TypeDescriptor::Set(
            Box::new(TypeDescriptor::Int),
        ))));
        assert!(ConfigFile::builder("server")
            .entry(SchemaEntry::dynamic("Nested", "", &nested))
            .build()
            .is_err());
    }

    #[test]
    fn test_namespace_bindings() {
        let ns = Namespace::builder("game.world").build().unwrap();
        assert_eq!(ns.short_name(), "world");
        assert_eq!(ns.env_var_name("MaxPlayers"), "WORLD_MAXPLAYERS");
        assert_eq!(ns.property_name("MaxPlayers"), "world.MaxPlayers");

        let flat = Namespace::builder("login").build().unwrap();
        assert_eq!(flat.short_name(), "login");
    }

    #[test]
    fn test_namespace_validation() {
        assert!(Namespace::builder("").build().is_err());
        assert!(Namespace::builder("game.").build().is_err());

        let a = ConfigFile::builder("server").build().unwrap();
        let b = ConfigFile::builder("server").build().unwrap();
        let err = Namespace::builder("game").file(a).file(b).build().unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }
}
