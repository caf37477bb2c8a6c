//! Post-resolution hooks.
//!
//! Field hooks run after an entry's value has been stored, file hooks after
//! every entry of a file has been processed. Hooks are looked up by id in the
//! manager's [`Components`](crate::component::Components), so each id is
//! instantiated once and shared.
//!
//! A failing hook does not abort loading: the error is reported as a
//! [`ConfigEvent::HookFailed`] warning.

use crate::convert::Value;
use crate::event::ConfigEvent;
use crate::resolve::LoadScope;
use crate::schema::{ConfigFile, SchemaEntry};

/// Runs after a single entry has been loaded.
pub trait FieldHook: Send + Sync {
    /// Called with the value just stored in the entry's slot.
    ///
    /// # Errors
    ///
    /// Any error is reported as a warning; loading continues.
    fn on_loaded(
        &self,
        scope: &LoadScope<'_>,
        entry: &SchemaEntry,
        value: &Value,
    ) -> anyhow::Result<()>;
}

/// Runs after every entry of a file has been loaded.
pub trait FileHook: Send + Sync {
    /// Called once per file and pass.
    ///
    /// # Errors
    ///
    /// Any error is reported as a warning; loading continues.
    fn on_loaded(&self, scope: &LoadScope<'_>, file: &ConfigFile) -> anyhow::Result<()>;
}

pub(crate) fn fire_field_hook(
    id: &str,
    hook: &dyn FieldHook,
    scope: &LoadScope<'_>,
    entry: &SchemaEntry,
    value: &Value,
) {
    if let Err(err) = hook.on_loaded(scope, entry, value) {
        scope.sink.emit(&ConfigEvent::HookFailed {
            hook: id.to_string(),
            namespace: scope.context.namespace.clone(),
            key: Some(entry.key().to_string()),
            reason: format!("{err:#}"),
        });
    }
}

pub(crate) fn fire_file_hook(id: &str, hook: &dyn FileHook, scope: &LoadScope<'_>) {
    if let Err(err) = hook.on_loaded(scope, scope.file) {
        scope.sink.emit(&ConfigEvent::HookFailed {
            hook: id.to_string(),
            namespace: scope.context.namespace.clone(),
            key: None,
            reason: format!("{err:#}"),
        });
    }
}
