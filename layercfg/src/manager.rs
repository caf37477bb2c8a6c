//! The configuration manager and its load/reload state machine.
//!
//! Each registered namespace is either idle, loading or reloading. A pass
//! over a namespace walks its files in order: a missing base file is
//! generated from defaults, the base file is read, and every entry is
//! resolved, converted and stored in its slot. Hooks run after each entry and
//! after each file.
//!
//! During a reload, entries declared non-reloadable keep the value they
//! already hold.
//!
//! A pass that starts while another pass over the same namespace is running
//! fails with [`Error::LoadInProgress`] instead of waiting, so a hook that
//! triggers a reload of its own namespace cannot deadlock.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::component::{Components, DEFAULT_SUPPLIER};
use crate::convert::ConversionError;
use crate::error::{Error, Result};
use crate::event::{ConfigEvent, EventSink, LogEventSink};
use crate::generator;
use crate::hook::{fire_field_hook, fire_file_hook};
use crate::overrides::{OverrideLayer, OverrideSource, DEFAULT_OVERRIDE_FILE};
use crate::properties::PropertySource;
use crate::registry::DuplicateKeyRegistry;
use crate::resolve::{
    EnvironmentLookup, Layers, LoadScope, ReloadContext, SystemEnvironment, ValueOrigin,
};
use crate::schema::{Namespace, SchemaEntry};

/// What a namespace is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No pass is running.
    Idle,
    /// A load pass is running.
    Loading,
    /// A reload pass is running.
    Reloading,
}

impl LoadState {
    fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Reloading => "reloading",
        }
    }
}

/// One value stored during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProperty {
    /// Base file of the entry.
    pub file: PathBuf,
    /// Property key.
    pub key: String,
    /// Canonical literal of the stored value.
    pub literal: String,
    /// Layer the value came from.
    pub origin: ValueOrigin,
    /// Environment variable that would override the entry.
    pub env_var: String,
}

/// The outcome of a load or reload pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Namespace loaded.
    pub namespace: String,
    /// Whether the pass was a reload.
    pub reloading: bool,
    /// Base files read, in order.
    pub files: Vec<PathBuf>,
    /// Values stored, in order.
    pub resolved: Vec<ResolvedProperty>,
    /// Keys of non-reloadable entries skipped by a reload.
    pub retained: Vec<String>,
    /// Base files generated because they were missing.
    pub generated: Vec<PathBuf>,
    /// Warning events emitted during the pass.
    pub warnings: Vec<ConfigEvent>,
}

impl LoadReport {
    fn new(namespace: &str, reloading: bool) -> Self {
        Self {
            namespace: namespace.to_string(),
            reloading,
            ..Self::default()
        }
    }

    /// The last value stored for `key`. When several files declare the key,
    /// this is the one from the file loaded last.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ResolvedProperty> {
        self.resolved.iter().rev().find(|p| p.key == key)
    }

    /// Returns true if the pass emitted any warning.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Forwards events and keeps a copy of the warnings.
struct RecordingSink<'a> {
    inner: &'a dyn EventSink,
    warnings: Mutex<Vec<ConfigEvent>>,
}

impl<'a> RecordingSink<'a> {
    fn new(inner: &'a dyn EventSink) -> Self {
        Self {
            inner,
            warnings: Mutex::new(Vec::new()),
        }
    }

    fn into_warnings(self) -> Vec<ConfigEvent> {
        self.warnings.into_inner()
    }
}

impl EventSink for RecordingSink<'_> {
    fn emit(&self, event: &ConfigEvent) {
        if event.is_warning() {
            self.warnings.lock().push(event.clone());
        }
        self.inner.emit(event);
    }
}

/// Marks a namespace busy for the lifetime of a pass.
struct PassGuard<'a> {
    manager: &'a ConfigManager,
    namespace: String,
    reloading: bool,
}

impl<'a> PassGuard<'a> {
    fn acquire(manager: &'a ConfigManager, namespace: &str, reloading: bool) -> Result<Self> {
        {
            let mut states = manager.states.lock();
            if let Some(state) = states.get(namespace) {
                return Err(Error::LoadInProgress {
                    namespace: namespace.to_string(),
                    state: state.label(),
                });
            }
            let state = if reloading {
                LoadState::Reloading
            } else {
                LoadState::Loading
            };
            states.insert(namespace.to_string(), state);
        }
        if reloading {
            manager.active_reloads.fetch_add(1, Ordering::SeqCst);
        }
        Ok(Self {
            manager,
            namespace: namespace.to_string(),
            reloading,
        })
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.manager.states.lock().remove(&self.namespace);
        if self.reloading {
            self.manager.active_reloads.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Builder for [`ConfigManager`].
pub struct ConfigManagerBuilder {
    root: PathBuf,
    override_source: Option<OverrideSource>,
    override_enabled: bool,
    process: PropertySource,
    environment: Box<dyn EnvironmentLookup>,
    sink: Arc<dyn EventSink>,
    components: Components,
}

impl ConfigManagerBuilder {
    fn new() -> Self {
        Self {
            root: PathBuf::from("."),
            override_source: None,
            override_enabled: true,
            process: PropertySource::new("process"),
            environment: Box::new(SystemEnvironment),
            sink: Arc::new(LogEventSink),
            components: Components::default(),
        }
    }

    /// Directory base files and the default override file live under.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Reads overrides from `path`. Relative paths are taken from the root.
    #[must_use]
    pub fn with_override_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_source = Some(OverrideSource::File(path.into()));
        self
    }

    /// Uses a fixed in-memory override source.
    #[must_use]
    pub fn with_override_properties(mut self, properties: PropertySource) -> Self {
        self.override_source = Some(OverrideSource::Memory(properties));
        self
    }

    /// Enables or disables the override layer.
    #[must_use]
    pub fn with_override_enabled(mut self, enabled: bool) -> Self {
        self.override_enabled = enabled;
        self
    }

    /// Sets a process property.
    #[must_use]
    pub fn with_process_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.process.set(name, value);
        self
    }

    /// Replaces the environment lookup.
    #[must_use]
    pub fn with_environment(mut self, environment: impl EnvironmentLookup + 'static) -> Self {
        self.environment = Box::new(environment);
        self
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the component caches.
    #[must_use]
    pub fn with_components(mut self, components: Components) -> Self {
        self.components = components;
        self
    }

    /// Builds the manager. Nothing is read from disk until the first pass.
    #[must_use]
    pub fn build(self) -> ConfigManager {
        let source = match self.override_source {
            Some(OverrideSource::File(path)) => OverrideSource::File(self.root.join(path)),
            Some(memory) => memory,
            None => OverrideSource::File(self.root.join(DEFAULT_OVERRIDE_FILE)),
        };
        let mut layer = OverrideLayer::new(source);
        layer.set_enabled(self.override_enabled);

        ConfigManager {
            root: self.root,
            namespaces: RwLock::new(BTreeMap::new()),
            loaded: RwLock::new(BTreeSet::new()),
            states: Mutex::new(HashMap::new()),
            active_reloads: AtomicUsize::new(0),
            override_layer: RwLock::new(layer),
            process: RwLock::new(self.process),
            duplicates: DuplicateKeyRegistry::new(),
            components: self.components,
            environment: self.environment,
            sink: self.sink,
        }
    }
}

/// Owns registered namespaces and runs load and reload passes over them.
///
/// # Examples
///
/// ```
/// use layercfg::manager::ConfigManager;
/// use layercfg::schema::{ConfigFile, ConfigSlot, Namespace, SchemaEntry};
///
/// let dir = tempfile::tempdir().unwrap();
/// let port: ConfigSlot<i32> = ConfigSlot::new();
/// let namespace = Namespace::builder("game.server")
///     .file(
///         ConfigFile::builder("server")
///             .entry(SchemaEntry::bind("Port", "7777", &port))
///             .build()
///             .unwrap(),
///     )
///     .build()
///     .unwrap();
///
/// let manager = ConfigManager::new(dir.path());
/// manager.register(namespace).unwrap();
/// let report = manager.load("game.server").unwrap();
///
/// assert_eq!(port.get(), Some(7777));
/// assert_eq!(report.generated.len(), 1);
/// ```
pub struct ConfigManager {
    root: PathBuf,
    namespaces: RwLock<BTreeMap<String, Arc<Namespace>>>,
    loaded: RwLock<BTreeSet<String>>,
    states: Mutex<HashMap<String, LoadState>>,
    active_reloads: AtomicUsize,
    override_layer: RwLock<OverrideLayer>,
    process: RwLock<PropertySource>,
    duplicates: DuplicateKeyRegistry,
    components: Components,
    environment: Box<dyn EnvironmentLookup>,
    sink: Arc<dyn EventSink>,
}

impl ConfigManager {
    /// Manager rooted at `root` with default settings.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::builder().with_root(root).build()
    }

    /// Starts building a manager.
    #[must_use]
    pub fn builder() -> ConfigManagerBuilder {
        ConfigManagerBuilder::new()
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Component caches, for registering custom converters, suppliers and
    /// hooks.
    #[must_use]
    pub fn components(&self) -> &Components {
        &self.components
    }

    /// The duplicate key registry.
    #[must_use]
    pub fn duplicates(&self) -> &DuplicateKeyRegistry {
        &self.duplicates
    }

    /// Registers a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] if a namespace with the same name is
    /// already registered.
    pub fn register(&self, namespace: Namespace) -> Result<()> {
        let mut namespaces = self.namespaces.write();
        if namespaces.contains_key(namespace.name()) {
            return Err(Error::invalid_schema(
                namespace.name(),
                "namespace already registered",
            ));
        }
        namespaces.insert(namespace.name().to_string(), Arc::new(namespace));
        Ok(())
    }

    /// A registered namespace.
    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<Arc<Namespace>> {
        self.namespaces.read().get(name).cloned()
    }

    /// Names of every registered namespace, sorted.
    #[must_use]
    pub fn namespace_names(&self) -> Vec<String> {
        self.namespaces.read().keys().cloned().collect()
    }

    /// Loads a namespace.
    ///
    /// # Errors
    ///
    /// See [`load_with`](Self::load_with).
    pub fn load(&self, namespace: &str) -> Result<LoadReport> {
        self.load_with(namespace, false)
    }

    /// Runs a pass over a namespace.
    ///
    /// A fresh load (`reloading == false`) first rebuilds the override layer
    /// and forgets the namespace's duplicate key records. With
    /// `reloading == true` the pass runs against the current override layer
    /// and non-reloadable entries are skipped.
    ///
    /// An unregistered namespace yields an empty report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LoadInProgress`] if a pass over the namespace is
    /// already running, [`Error::OverrideLoading`] or [`Error::Generation`]
    /// on I/O failures, [`Error::UnknownComponent`] for unregistered ids and
    /// [`Error::Conversion`] when an entry's default cannot be converted.
    pub fn load_with(&self, namespace: &str, reloading: bool) -> Result<LoadReport> {
        self.run_pass(namespace, reloading, !reloading)
    }

    /// Reloads a namespace: rebuilds the override layer, forgets the
    /// namespace's duplicate key records and runs a reloading pass.
    ///
    /// # Errors
    ///
    /// See [`load_with`](Self::load_with).
    pub fn reload(&self, namespace: &str) -> Result<LoadReport> {
        self.run_pass(namespace, true, true)
    }

    /// Current state of a namespace.
    #[must_use]
    pub fn state(&self, namespace: &str) -> LoadState {
        self.states
            .lock()
            .get(namespace)
            .copied()
            .unwrap_or(LoadState::Idle)
    }

    /// Whether any reload pass is running on this manager.
    #[must_use]
    pub fn is_reloading(&self) -> bool {
        self.active_reloads.load(Ordering::SeqCst) > 0
    }

    /// Whether a namespace has completed at least one pass.
    #[must_use]
    pub fn is_loaded(&self, namespace: &str) -> bool {
        self.loaded.read().contains(namespace)
    }

    /// Number of config files in loaded namespaces.
    #[must_use]
    pub fn registry_size(&self) -> usize {
        let namespaces = self.namespaces.read();
        self.loaded
            .read()
            .iter()
            .filter_map(|name| namespaces.get(name))
            .map(|ns| ns.files().len())
            .sum()
    }

    /// Enables or disables the override layer. Takes effect on the next
    /// refresh; while disabled the override file is neither read nor created.
    pub fn set_override_enabled(&self, enabled: bool) {
        self.override_layer.write().set_enabled(enabled);
    }

    /// Whether the override layer is enabled.
    #[must_use]
    pub fn override_enabled(&self) -> bool {
        self.override_layer.read().is_enabled()
    }

    /// Snapshot of the override properties consulted by resolution.
    #[must_use]
    pub fn override_layer(&self) -> PropertySource {
        self.override_layer.read().active().clone()
    }

    /// Sets a process property, returning the previous value.
    pub fn set_process_property(
        &self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.process.write().set(name, value)
    }

    /// Snapshot of the process properties.
    #[must_use]
    pub fn process_properties(&self) -> PropertySource {
        self.process.read().clone()
    }

    /// Writes every base file of a namespace from its defaults, overwriting
    /// existing files. Returns the paths written; empty for an unregistered
    /// namespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Generation`] on I/O failure.
    pub fn generate(&self, namespace: &str) -> Result<Vec<PathBuf>> {
        let Some(ns) = self.namespace(namespace) else {
            return Ok(Vec::new());
        };
        ns.files()
            .iter()
            .map(|file| generator::generate_file(&self.root, file, self.sink.as_ref()))
            .collect()
    }

    fn run_pass(&self, name: &str, reloading: bool, refresh: bool) -> Result<LoadReport> {
        let Some(namespace) = self.namespace(name) else {
            log::debug!("no namespace registered as '{name}'");
            return Ok(LoadReport::new(name, reloading));
        };
        let _guard = PassGuard::acquire(self, name, reloading)?;
        let recorder = RecordingSink::new(self.sink.as_ref());

        if refresh {
            self.override_layer.write().refresh(&recorder)?;
            self.duplicates.clear(name);
        }
        let override_source = self.override_layer.read().active().clone();
        let process = self.process.read().clone();
        let context = ReloadContext::new(&namespace, reloading);

        let mut report = LoadReport::new(name, reloading);
        for file in namespace.files() {
            let path = file.path_in(&self.root);
            if !path.exists() {
                generator::generate_file(&self.root, file, &recorder)?;
                report.generated.push(path.clone());
            }
            let base = PropertySource::load_file(&path, &recorder);
            let scope = LoadScope {
                context: &context,
                file,
                file_path: &path,
                layers: Layers {
                    environment: self.environment.as_ref(),
                    process: &process,
                    override_source: &override_source,
                    base: &base,
                },
                sink: &recorder,
            };
            self.load_file(&scope, &mut report)?;
            report.files.push(path);
        }

        recorder.emit(&ConfigEvent::NamespaceLoaded {
            namespace: name.to_string(),
            files: namespace.files().len(),
            reloading,
        });
        self.loaded.write().insert(name.to_string());
        report.warnings = recorder.into_warnings();
        Ok(report)
    }

    fn load_file(&self, scope: &LoadScope<'_>, report: &mut LoadReport) -> Result<()> {
        let context = scope.context;
        for entry in scope.file.entries() {
            if entry.is_comment_only() {
                continue;
            }

            for previous in self
                .duplicates
                .register(&context.namespace, scope.file_path, entry.key())
            {
                scope.sink.emit(&ConfigEvent::DuplicateKey {
                    namespace: context.namespace.clone(),
                    key: entry.key().to_string(),
                    previous_file: previous,
                    current_file: scope.file_path.to_path_buf(),
                });
            }

            if context.reloading && !entry.is_reloadable() {
                scope.sink.emit(&ConfigEvent::PropertyRetained {
                    namespace: context.namespace.clone(),
                    key: entry.key().to_string(),
                });
                report.retained.push(entry.key().to_string());
                continue;
            }

            report.resolved.push(self.load_entry(scope, entry)?);
        }

        if let Some(id) = scope.file.hook() {
            let hook = self.components.file_hooks.get(id)?;
            fire_file_hook(id, hook.as_ref(), scope);
        }
        Ok(())
    }

    fn load_entry(&self, scope: &LoadScope<'_>, entry: &SchemaEntry) -> Result<ResolvedProperty> {
        let conversion = |source: ConversionError| Error::Conversion {
            key: entry.key().to_string(),
            source,
        };
        let ty = entry.declared_type();

        let converter = self.components.converters.get(entry.converter())?;
        let supplier = self
            .components
            .suppliers
            .get(entry.supplier().unwrap_or(DEFAULT_SUPPLIER))?;
        let supplied = supplier.supply(scope, entry, converter.as_ref())?;

        if !supplied.value.conforms_to(ty) {
            return Err(conversion(ConversionError::mismatch(ty, &supplied.value)));
        }
        if let Some(binding) = entry.binding() {
            binding.set(supplied.value.clone()).map_err(conversion)?;
        }
        let literal = converter
            .to_literal(ty, &supplied.value)
            .map_err(conversion)?;

        if let Some(id) = entry.hook() {
            let hook = self.components.field_hooks.get(id)?;
            fire_field_hook(id, hook.as_ref(), scope, entry, &supplied.value);
        }

        Ok(ResolvedProperty {
            file: scope.file_path.to_path_buf(),
            key: entry.key().to_string(),
            literal,
            origin: supplied.origin,
            env_var: scope.context.env_var_name(entry.key()),
        })
    }
}

impl fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigManager")
            .field("root", &self.root)
            .field("namespaces", &self.namespace_names())
            .field("override_enabled", &self.override_enabled())
            .finish_non_exhaustive()
    }
}
