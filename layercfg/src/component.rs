//! Memoizing component caches.
//!
//! Converters, suppliers and hooks are referenced from schema entries by id.
//! A [`ComponentCache`] maps ids to factories and builds each instance at most
//! once, on first use. The caches are owned by a
//! [`ConfigManager`](crate::manager::ConfigManager), not process-wide.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::convert::{CollectionConverter, CollectionKind, Converter, MainConverter, ScalarConverter};
use crate::error::{Error, Result};
use crate::hook::{FieldHook, FileHook};
use crate::supplier::{DefaultSupplier, ValueSupplier};

/// Id of the converter used when an entry names none.
pub const MAIN_CONVERTER: &str = "main";

/// Id of the supplier used when an entry names none.
pub const DEFAULT_SUPPLIER: &str = "default";

type Factory<T> = Arc<dyn Fn() -> Arc<T> + Send + Sync>;

/// An id-to-instance cache built from registered factories.
pub struct ComponentCache<T: ?Sized> {
    kind: &'static str,
    factories: RwLock<HashMap<String, Factory<T>>>,
    instances: RwLock<HashMap<String, Arc<T>>>,
}

impl<T: ?Sized + Send + Sync + 'static> ComponentCache<T> {
    /// Creates an empty cache. `kind` names the component in errors.
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            factories: RwLock::new(HashMap::new()),
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a factory, replacing any earlier registration of `id`.
    ///
    /// The factory runs on the first [`get`](Self::get) of `id`. It must not
    /// call back into this cache.
    pub fn register<F>(&self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let id = id.into();
        self.factories.write().insert(id.clone(), Arc::new(factory));
        self.instances.write().remove(&id);
    }

    /// Registers a ready-made instance.
    pub fn register_instance(&self, id: impl Into<String>, instance: Arc<T>) {
        let id = id.into();
        let shared = Arc::clone(&instance);
        self.factories
            .write()
            .insert(id.clone(), Arc::new(move || Arc::clone(&shared)));
        self.instances.write().insert(id, instance);
    }

    /// Returns the instance for `id`, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`] if `id` was never registered.
    pub fn get(&self, id: &str) -> Result<Arc<T>> {
        if let Some(instance) = self.instances.read().get(id) {
            return Ok(Arc::clone(instance));
        }

        let factory = self
            .factories
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::UnknownComponent {
                kind: self.kind,
                id: id.to_string(),
            })?;

        let mut instances = self.instances.write();
        if let Some(instance) = instances.get(id) {
            return Ok(Arc::clone(instance));
        }
        log::debug!("instantiating {} '{id}'", self.kind);
        let instance = factory();
        instances.insert(id.to_string(), Arc::clone(&instance));
        Ok(instance)
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.factories.read().contains_key(id)
    }

    /// Registered ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of instances built so far.
    #[must_use]
    pub fn instantiated(&self) -> usize {
        self.instances.read().len()
    }
}

impl<T: ?Sized> fmt::Debug for ComponentCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<String> = self.factories.read().keys().cloned().collect();
        ids.sort();
        f.debug_struct("ComponentCache")
            .field("kind", &self.kind)
            .field("ids", &ids)
            .finish_non_exhaustive()
    }
}

/// Every component cache a manager consults.
#[derive(Debug)]
pub struct Components {
    /// Literal converters.
    pub converters: ComponentCache<dyn Converter>,
    /// Value suppliers.
    pub suppliers: ComponentCache<dyn ValueSupplier>,
    /// Field hooks.
    pub field_hooks: ComponentCache<dyn FieldHook>,
    /// File hooks.
    pub file_hooks: ComponentCache<dyn FileHook>,
}

impl Components {
    /// Caches with nothing registered, not even the built-ins.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            converters: ComponentCache::new("converter"),
            suppliers: ComponentCache::new("supplier"),
            field_hooks: ComponentCache::new("field hook"),
            file_hooks: ComponentCache::new("file hook"),
        }
    }
}

impl Default for Components {
    /// Caches holding the built-in converters (`main`, `scalar`, `array`,
    /// `list`, `set`) and the `default` supplier.
    fn default() -> Self {
        let components = Self::empty();
        let main: Arc<dyn Converter> = Arc::new(MainConverter::default());

        components
            .converters
            .register_instance(MAIN_CONVERTER, Arc::clone(&main));
        components
            .converters
            .register_instance("scalar", Arc::new(ScalarConverter));
        for (id, kind) in [
            ("array", CollectionKind::Array),
            ("list", CollectionKind::List),
            ("set", CollectionKind::Set),
        ] {
            components.converters.register_instance(
                id,
                Arc::new(CollectionConverter::with_element(kind, Arc::clone(&main))),
            );
        }
        components
            .suppliers
            .register_instance(DEFAULT_SUPPLIER, Arc::new(DefaultSupplier));
        components
    }
}
