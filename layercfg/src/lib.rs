#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # layercfg
//!
//! Layered, typed properties configuration.
//!
//! A schema groups typed entries into files and files into namespaces. When a
//! namespace loads, every entry is resolved against four layers, first match
//! wins: environment variables, process properties, the override file and the
//! base file, with the declared default last. Missing base files are
//! generated from the schema, and entries marked non-reloadable keep their
//! first value across reloads.
//!
//! ## Core Types
//!
//! - [`Namespace`], [`ConfigFile`] and [`SchemaEntry`]: the schema
//! - [`ConfigSlot`] and [`DynamicSlot`]: where loaded values are stored
//! - [`ConfigManager`] and [`LoadReport`]: loading and reloading
//! - [`MainConverter`], [`TypeDescriptor`] and [`Value`]: literal conversion
//! - [`ConfigEvent`] and [`EventSink`]: recoverable conditions
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use std::time::Duration;
//! use layercfg::{ConfigFile, ConfigManager, ConfigSlot, MapEnvironment, Namespace, SchemaEntry};
//!
//! let port = ConfigSlot::<i32>::new();
//! let timeout = ConfigSlot::<Duration>::new();
//!
//! let namespace = Namespace::builder("game.server")
//!     .file(
//!         ConfigFile::builder("server")
//!             .entry(SchemaEntry::bind("Port", "7777", &port))
//!             .entry(SchemaEntry::bind("Timeout", "30sec", &timeout))
//!             .build()
//!             .unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let root = tempfile::tempdir().unwrap();
//! let manager = ConfigManager::builder()
//!     .with_root(root.path())
//!     .with_environment(MapEnvironment::new().with_var("SERVER_PORT", "9000"))
//!     .build();
//! manager.register(namespace).unwrap();
//! manager.load("game.server").unwrap();
//!
//! assert_eq!(port.get(), Some(9000));
//! assert_eq!(timeout.get(), Some(Duration::from_secs(30)));
//! assert!(root.path().join("config/server.properties").exists());
//! ```

pub mod component;
pub mod convert;
pub mod error;
pub mod event;
pub mod generator;
pub mod hook;
pub mod logging;
pub mod manager;
pub mod manifest;
pub mod output;
pub mod overrides;
pub mod properties;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod supplier;

// Re-export key types at crate root for convenience
pub use component::{ComponentCache, Components, DEFAULT_SUPPLIER, MAIN_CONVERTER};
pub use convert::{
    format_duration, parse_duration, CollectionConverter, CollectionKind, ConfigValue,
    ConversionError, Converter, EnumType, MainConverter, ScalarConverter, TypeDescriptor, Value,
};
pub use error::{Error, Result};
pub use event::{CollectingSink, ConfigEvent, EventSink, LogEventSink, Severity};
pub use hook::{FieldHook, FileHook};
pub use logging::{init_logger, LogLevel, Logger};
pub use manager::{ConfigManager, ConfigManagerBuilder, LoadReport, LoadState, ResolvedProperty};
pub use manifest::Manifest;
pub use overrides::{OverrideLayer, OverrideSource, DEFAULT_OVERRIDE_FILE};
pub use properties::PropertySource;
pub use registry::DuplicateKeyRegistry;
pub use resolve::{
    EnvironmentLookup, LoadScope, MapEnvironment, ReloadContext, SystemEnvironment, ValueOrigin,
};
pub use schema::{
    ConfigFile, ConfigSlot, DynamicSlot, FieldBinding, GroupMarker, Namespace, SchemaEntry,
};
pub use supplier::{DefaultSupplier, Supplied, ValueSupplier};
