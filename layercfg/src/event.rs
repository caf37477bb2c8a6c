//! Structured diagnostic events.
//!
//! The engine never prints. Every recoverable condition is described by a
//! [`ConfigEvent`] and handed to an [`EventSink`]; rendering is left to the
//! sink. [`LogEventSink`] forwards to the `log` facade and is the default.

use std::fmt;
use std::path::PathBuf;

use parking_lot::Mutex;

/// Severity attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Tracing detail.
    Debug,
    /// Progress information.
    Info,
    /// A recovered problem the operator should look at.
    Warning,
}

/// An event emitted while loading, reloading or generating configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    /// A property source could not be read and was treated as empty.
    SourceUnreadable {
        /// File path or stream label.
        origin: String,
        /// Why reading failed.
        reason: String,
    },

    /// A key was absent from every layer; the default literal was used.
    MissingProperty {
        /// Namespace being loaded.
        namespace: String,
        /// Base file of the entry.
        file: PathBuf,
        /// Property key.
        key: String,
        /// Default literal used instead.
        default: String,
    },

    /// A supplied literal failed conversion; the default literal was used.
    InvalidValue {
        /// Namespace being loaded.
        namespace: String,
        /// Base file of the entry.
        file: PathBuf,
        /// Property key.
        key: String,
        /// Literal that failed conversion.
        supplied: String,
        /// Default literal used instead.
        default: String,
        /// Conversion failure message.
        reason: String,
    },

    /// A key was claimed by a second file in the same namespace.
    DuplicateKey {
        /// Namespace being loaded.
        namespace: String,
        /// Property key.
        key: String,
        /// File that claimed the key first.
        previous_file: PathBuf,
        /// File that claims it now.
        current_file: PathBuf,
    },

    /// A non-reloadable entry kept its value during a reload.
    PropertyRetained {
        /// Namespace being reloaded.
        namespace: String,
        /// Property key.
        key: String,
    },

    /// A hook returned an error.
    HookFailed {
        /// Hook id.
        hook: String,
        /// Namespace being loaded.
        namespace: String,
        /// Entry key for field hooks, `None` for file hooks.
        key: Option<String>,
        /// Error message.
        reason: String,
    },

    /// A missing base file was generated from defaults.
    FileGenerated {
        /// Path written.
        path: PathBuf,
    },

    /// The override layer was (re)built.
    OverrideLoaded {
        /// File path or stream label.
        origin: String,
        /// Number of properties it holds.
        count: usize,
    },

    /// A namespace pass finished.
    NamespaceLoaded {
        /// Namespace.
        namespace: String,
        /// Number of files in the namespace.
        files: usize,
        /// Whether the pass was a reload.
        reloading: bool,
    },
}

impl ConfigEvent {
    /// Severity of this event.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::SourceUnreadable { .. }
            | Self::MissingProperty { .. }
            | Self::InvalidValue { .. }
            | Self::DuplicateKey { .. }
            | Self::HookFailed { .. } => Severity::Warning,
            Self::FileGenerated { .. } | Self::OverrideLoaded { .. } => Severity::Info,
            Self::PropertyRetained { .. } | Self::NamespaceLoaded { .. } => Severity::Debug,
        }
    }

    /// Returns true for warning-level events.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl fmt::Display for ConfigEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceUnreadable { origin, reason } => {
                write!(f, "[{origin}] there was an error loading config: {reason}")
            }
            Self::MissingProperty {
                file, key, default, ..
            } => write!(
                f,
                "[{}] missing property for key: {key} using default value: {default}",
                file.display()
            ),
            Self::InvalidValue {
                file,
                key,
                supplied,
                default,
                reason,
                ..
            } => write!(
                f,
                "[{}] invalid value specified for key: {key} specified value: {supplied} ({reason}) using default value: {default}",
                file.display()
            ),
            Self::DuplicateKey {
                key,
                previous_file,
                current_file,
                ..
            } => write!(
                f,
                "property key '{key}' is already defined in config file '{}', so now '{}' overwrites that",
                previous_file.display(),
                current_file.display()
            ),
            Self::PropertyRetained { key, .. } => {
                write!(f, "property '{key}' retained with its previous value")
            }
            Self::HookFailed {
                hook,
                namespace,
                key,
                reason,
            } => match key {
                Some(key) => write!(f, "hook '{hook}' failed for {namespace}/{key}: {reason}"),
                None => write!(f, "hook '{hook}' failed for {namespace}: {reason}"),
            },
            Self::FileGenerated { path } => write!(f, "generated: '{}'", path.display()),
            Self::OverrideLoaded { origin, count } => {
                write!(f, "loaded {count} overridden propert(ies) from '{origin}'")
            }
            Self::NamespaceLoaded {
                namespace,
                files,
                reloading,
            } => {
                let verb = if *reloading { "reloaded" } else { "loaded" };
                write!(f, "{verb} {files} config file(s) for '{namespace}'")
            }
        }
    }
}

/// Receives events from the engine.
#[cfg_attr(test, mockall::automock)]
pub trait EventSink: Send + Sync {
    /// Handle one event.
    fn emit(&self, event: &ConfigEvent);
}

/// Sink that forwards every event to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: &ConfigEvent) {
        match event.severity() {
            Severity::Warning => log::warn!("{event}"),
            Severity::Info => log::info!("{event}"),
            Severity::Debug => log::debug!("{event}"),
        }
    }
}

/// Sink that stores events in memory.
///
/// # Examples
///
/// ```
/// use layercfg::event::{CollectingSink, ConfigEvent, EventSink};
/// use std::path::PathBuf;
///
/// let sink = CollectingSink::new();
/// sink.emit(&ConfigEvent::FileGenerated { path: PathBuf::from("config/a.properties") });
/// assert_eq!(sink.events().len(), 1);
/// assert!(sink.warnings().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ConfigEvent>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event received so far.
    #[must_use]
    pub fn events(&self) -> Vec<ConfigEvent> {
        self.events.lock().clone()
    }

    /// Snapshot of warning-level events.
    #[must_use]
    pub fn warnings(&self) -> Vec<ConfigEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.is_warning())
            .cloned()
            .collect()
    }

    /// Drops every stored event.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: &ConfigEvent) {
        self.events.lock().push(event.clone());
    }
}
