//! The override resolution chain.
//!
//! A key is looked up in a fixed order, first hit wins:
//!
//! 1. the environment variable `UPPERCASE(<short>_<key>)`,
//! 2. the process property `<short>.<key>`,
//! 3. the override file (an empty source when overrides are disabled),
//! 4. the base file,
//! 5. the entry's default literal, reported with a
//!    [`ConfigEvent::MissingProperty`] event.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::event::{ConfigEvent, EventSink};
use crate::properties::PropertySource;
use crate::schema::{ConfigFile, Namespace, SchemaEntry};

/// Source of environment variables.
pub trait EnvironmentLookup: Send + Sync {
    /// Value of `name`, `None` if unset or not valid UTF-8.
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

impl EnvironmentLookup for SystemEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

/// Environment backed by a map, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable.
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvironmentLookup for MapEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Which layer a literal came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueOrigin {
    /// An environment variable.
    Environment(String),
    /// A process property.
    ProcessProperty(String),
    /// The override file.
    Override,
    /// The base file.
    Base,
    /// The declared default.
    Default,
    /// A custom supplier.
    Supplier(String),
}

impl fmt::Display for ValueOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment(var) => write!(f, "env:{var}"),
            Self::ProcessProperty(name) => write!(f, "property:{name}"),
            Self::Override => f.write_str("override"),
            Self::Base => f.write_str("base"),
            Self::Default => f.write_str("default"),
            Self::Supplier(id) => write!(f, "supplier:{id}"),
        }
    }
}

impl Serialize for ValueOrigin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-pass state handed to resolution, suppliers and hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadContext {
    /// Namespace being loaded.
    pub namespace: String,
    /// Short name used for environment and property bindings.
    pub short_name: String,
    /// Whether the pass is a reload.
    pub reloading: bool,
}

impl ReloadContext {
    /// Context for a pass over `namespace`.
    #[must_use]
    pub fn new(namespace: &Namespace, reloading: bool) -> Self {
        Self {
            namespace: namespace.name().to_string(),
            short_name: namespace.short_name().to_string(),
            reloading,
        }
    }

    /// Environment variable consulted for `key`.
    #[must_use]
    pub fn env_var_name(&self, key: &str) -> String {
        format!("{}_{key}", self.short_name).to_uppercase()
    }

    /// Process property consulted for `key`.
    #[must_use]
    pub fn property_name(&self, key: &str) -> String {
        format!("{}.{key}", self.short_name)
    }
}

/// The layers consulted for one file.
#[derive(Clone, Copy)]
pub struct Layers<'a> {
    /// Environment variables.
    pub environment: &'a dyn EnvironmentLookup,
    /// Process properties.
    pub process: &'a PropertySource,
    /// Override file contents; empty when overrides are disabled.
    pub override_source: &'a PropertySource,
    /// Base file contents.
    pub base: &'a PropertySource,
}

/// Everything needed to resolve the entries of one file.
#[derive(Clone, Copy)]
pub struct LoadScope<'a> {
    /// The current pass.
    pub context: &'a ReloadContext,
    /// The file being loaded.
    pub file: &'a ConfigFile,
    /// Its base file path.
    pub file_path: &'a Path,
    /// Layers to consult.
    pub layers: Layers<'a>,
    /// Where diagnostics go.
    pub sink: &'a dyn EventSink,
}

/// A resolved literal and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The literal.
    pub literal: String,
    /// The layer it came from.
    pub origin: ValueOrigin,
}

/// Resolves the literal for `entry`.
///
/// Falls back to the default literal and emits
/// [`ConfigEvent::MissingProperty`] when no layer has the key.
#[must_use]
pub fn resolve(scope: &LoadScope<'_>, entry: &SchemaEntry) -> Resolved {
    let key = entry.key();
    let layers = &scope.layers;

    let var = scope.context.env_var_name(key);
    if let Some(value) = layers.environment.var(&var) {
        return Resolved {
            literal: value.trim().to_string(),
            origin: ValueOrigin::Environment(var),
        };
    }

    let property = scope.context.property_name(key);
    if let Some(value) = layers.process.get(&property) {
        return Resolved {
            literal: value.to_string(),
            origin: ValueOrigin::ProcessProperty(property),
        };
    }

    if let Some(value) = layers.override_source.get(key) {
        return Resolved {
            literal: value.to_string(),
            origin: ValueOrigin::Override,
        };
    }

    if let Some(value) = layers.base.get(key) {
        return Resolved {
            literal: value.to_string(),
            origin: ValueOrigin::Base,
        };
    }

    scope.sink.emit(&ConfigEvent::MissingProperty {
        namespace: scope.context.namespace.clone(),
        file: scope.file_path.to_path_buf(),
        key: key.to_string(),
        default: entry.default_literal().to_string(),
    });
    Resolved {
        literal: entry.default_literal().to_string(),
        origin: ValueOrigin::Default,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::convert::TypeDescriptor;
    use crate::event::CollectingSink;
    use crate::schema::DynamicSlot;

    pub(crate) struct Fixture {
        pub context: ReloadContext,
        pub file: ConfigFile,
        pub path: std::path::PathBuf,
        pub environment: MapEnvironment,
        pub process: PropertySource,
        pub override_source: PropertySource,
        pub base: PropertySource,
        pub sink: CollectingSink,
    }

    impl Fixture {
        pub fn new(entries: Vec<SchemaEntry>) -> Self {
            let file = ConfigFile::builder("server")
                .entries(entries)
                .build()
                .unwrap();
            let namespace = Namespace::builder("game.server").build().unwrap();
            Self {
                context: ReloadContext::new(&namespace, false),
                path: file.relative_path(),
                file,
                environment: MapEnvironment::new(),
                process: PropertySource::new("process"),
                override_source: PropertySource::new("override"),
                base: PropertySource::new("base"),
                sink: CollectingSink::new(),
            }
        }

        pub fn scope(&self) -> LoadScope<'_> {
            LoadScope {
                context: &self.context,
                file: &self.file,
                file_path: &self.path,
                layers: Layers {
                    environment: &self.environment,
                    process: &self.process,
                    override_source: &self.override_source,
                    base: &self.base,
                },
                sink: &self.sink,
            }
        }

        pub fn entry(&self, key: &str) -> &SchemaEntry {
            self.file.entry(key).unwrap()
        }
    }

    fn port_fixture() -> Fixture {
        let slot = DynamicSlot::new(TypeDescriptor::Int);
        Fixture::new(vec![SchemaEntry::dynamic("Port", "7777", &slot)])
    }

    #[test]
    fn test_precedence_chain() {
        let mut fx = port_fixture();
        fx.base.set("Port", "1");
        fx.override_source.set("Port", "2");
        fx.process.set("server.Port", "3");
        fx.environment = MapEnvironment::new().with_var("SERVER_PORT", " 4 ");

        let resolved = resolve(&fx.scope(), fx.entry("Port"));
        assert_eq!(resolved.literal, "4");
        assert_eq!(
            resolved.origin,
            ValueOrigin::Environment("SERVER_PORT".to_string())
        );

        fx.environment = MapEnvironment::new();
        let resolved = resolve(&fx.scope(), fx.entry("Port"));
        assert_eq!(resolved.literal, "3");

        fx.process.clear();
        let resolved = resolve(&fx.scope(), fx.entry("Port"));
        assert_eq!(resolved.origin, ValueOrigin::Override);

        fx.override_source.clear();
        let resolved = resolve(&fx.scope(), fx.entry("Port"));
        assert_eq!((resolved.literal.as_str(), resolved.origin), ("1", ValueOrigin::Base));
        assert!(fx.sink.events().is_empty());
    }

    #[test]
    fn test_default_emits_missing_property() {
        let fx = port_fixture();
        let resolved = resolve(&fx.scope(), fx.entry("Port"));
        assert_eq!(resolved.literal, "7777");
        assert_eq!(resolved.origin, ValueOrigin::Default);

        let warnings = fx.sink.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            ConfigEvent::MissingProperty { key, default, .. } if key == "Port" && default == "7777"
        ));
    }

    #[test]
    fn test_origin_display() {
        assert_eq!(
            ValueOrigin::Environment("SERVER_PORT".into()).to_string(),
            "env:SERVER_PORT"
        );
        assert_eq!(
            ValueOrigin::ProcessProperty("server.Port".into()).to_string(),
            "property:server.Port"
        );
        assert_eq!(ValueOrigin::Default.to_string(), "default");
        assert_eq!(
            serde_json::to_string(&ValueOrigin::Override).unwrap(),
            "\"override\""
        );
    }

    #[test]
    fn test_map_environment_from_iter() {
        let env: MapEnvironment = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(env.var("A").as_deref(), Some("1"));
        assert!(env.var("C").is_none());
    }
}
