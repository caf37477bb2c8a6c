//! Error types for the layercfg library.
//!
//! Only conditions that cannot be recovered locally surface as an [`Error`].
//! Recoverable conditions (unreadable sources, missing keys, malformed user
//! values, duplicate keys) are reported as [`crate::event::ConfigEvent`]s
//! and loading carries on.

use std::path::PathBuf;

use thiserror::Error;

use crate::convert::ConversionError;

/// Result type alias for operations that may fail with a layercfg error.
///
/// # Examples
///
/// ```
/// use layercfg::{Error, Result};
///
/// fn example_operation() -> Result<u16> {
///     Ok(8080)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the layercfg library.
#[derive(Debug, Error)]
pub enum Error {
    /// A literal could not be converted, and neither could the declared
    /// default. This is a schema bug, not a runtime condition.
    #[error("property '{key}' has incorrect syntax: {source}")]
    Conversion {
        /// The property key being resolved.
        key: String,
        /// The underlying conversion failure.
        #[source]
        source: ConversionError,
    },

    /// A missing base file could not be generated.
    #[error("failed to generate {}: {source}", path.display())]
    Generation {
        /// The file that was being written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The override file could not be created or read.
    #[error("failed to load override file {}: {source}", path.display())]
    OverrideLoading {
        /// The override file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A schema declaration is invalid.
    #[error("invalid schema for '{owner}': {reason}")]
    InvalidSchema {
        /// The namespace, file or entry the problem was found in.
        owner: String,
        /// A description of the problem.
        reason: String,
    },

    /// A schema referenced a converter, supplier or hook id that was never
    /// registered.
    #[error("unknown {kind} '{id}'")]
    UnknownComponent {
        /// Component kind ("converter", "supplier", "hook").
        kind: &'static str,
        /// The unresolved id.
        id: String,
    },

    /// A load or reload was started while another pass on the same namespace
    /// was still running.
    #[error("namespace '{namespace}' is busy: a {state} pass is already running")]
    LoadInProgress {
        /// The namespace.
        namespace: String,
        /// The pass found running ("loading" or "reloading").
        state: &'static str,
    },

    /// A schema manifest could not be parsed.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_yaml::Error),

    /// A report could not be rendered.
    #[error("output error: {message}")]
    Output {
        /// A description of the failure.
        message: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if the error comes from a schema declaration rather than from
    /// the environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::Error;
    ///
    /// let err = Error::UnknownComponent { kind: "hook", id: "audit".into() };
    /// assert!(err.is_schema_error());
    /// ```
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::Conversion { .. } | Self::InvalidSchema { .. } | Self::UnknownComponent { .. }
        )
    }

    pub(crate) fn invalid_schema(owner: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            owner: owner.into(),
            reason: reason.into(),
        }
    }
}
