//! The global override layer.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::event::{ConfigEvent, EventSink};
use crate::properties::PropertySource;

/// Default override file, relative to the manager root.
pub const DEFAULT_OVERRIDE_FILE: &str = "config/override.properties";

/// Where override properties come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideSource {
    /// A file, created empty when missing.
    File(PathBuf),
    /// A fixed in-memory source.
    Memory(PropertySource),
}

/// Properties that take precedence over every base file.
///
/// When disabled the layer reads as an empty source.
#[derive(Debug, Clone)]
pub struct OverrideLayer {
    source: OverrideSource,
    enabled: bool,
    properties: PropertySource,
    empty: PropertySource,
}

impl OverrideLayer {
    /// Creates an enabled layer that has not been loaded yet.
    #[must_use]
    pub fn new(source: OverrideSource) -> Self {
        Self {
            source,
            enabled: true,
            properties: PropertySource::empty(),
            empty: PropertySource::empty(),
        }
    }

    /// Layer reading `path`.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(OverrideSource::File(path.into()))
    }

    /// Where properties are read from.
    #[must_use]
    pub fn source(&self) -> &OverrideSource {
        &self.source
    }

    /// Whether the layer participates in resolution.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables the layer. Takes effect on the next refresh.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// The properties consulted by resolution: the loaded ones when enabled,
    /// an empty source otherwise.
    #[must_use]
    pub fn active(&self) -> &PropertySource {
        if self.enabled {
            &self.properties
        } else {
            &self.empty
        }
    }

    /// Rebuilds the layer from its source.
    ///
    /// A missing override file is created empty, parents included. Nothing
    /// is read or created while the layer is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OverrideLoading`] if the file cannot be created or
    /// read.
    pub fn refresh(&mut self, sink: &dyn EventSink) -> Result<()> {
        if !self.enabled {
            self.properties = PropertySource::empty();
            return Ok(());
        }

        self.properties = match &self.source {
            OverrideSource::File(path) => read_override_file(path, sink)?,
            OverrideSource::Memory(source) => source.clone(),
        };
        sink.emit(&ConfigEvent::OverrideLoaded {
            origin: self.properties.origin().to_string(),
            count: self.properties.len(),
        });
        Ok(())
    }
}

fn read_override_file(path: &Path, sink: &dyn EventSink) -> Result<PropertySource> {
    let loading = |source: std::io::Error| Error::OverrideLoading {
        path: path.to_path_buf(),
        source,
    };

    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(loading)?;
        }
        fs::File::create(path).map_err(loading)?;
        sink.emit(&ConfigEvent::FileGenerated {
            path: path.to_path_buf(),
        });
    }

    let file = fs::File::open(path).map_err(loading)?;
    PropertySource::from_reader(path.display().to_string(), file).map_err(loading)
}
