//! Schema manifests.
//!
//! A manifest declares namespaces in YAML so schemas can be registered
//! without code. Entries built from a manifest write to [`DynamicSlot`]s.
//!
//! ```yaml
//! enums:
//!   Difficulty: [EASY, NORMAL, HARD]
//! namespaces:
//!   - name: game.server
//!     files:
//!       - file_name: server
//!         comment: ["Server settings"]
//!         entries:
//!           - key: Port
//!             type: int
//!             default: 7777
//!             reloadable: false
//!           - key: Modes
//!             type: set<enum:Difficulty>
//!             default: "*"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::convert::{EnumType, TypeDescriptor};
use crate::error::{Error, Result};
use crate::schema::{ConfigFile, DynamicSlot, GroupMarker, Namespace, SchemaEntry};

/// A parsed manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Enum name to constants, in declaration order.
    #[serde(default)]
    pub enums: BTreeMap<String, Vec<String>>,
    /// Declared namespaces.
    #[serde(default)]
    pub namespaces: Vec<NamespaceSpec>,
}

/// A namespace declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceSpec {
    /// Namespace name.
    pub name: String,
    /// Files in load order.
    #[serde(default)]
    pub files: Vec<FileSpec>,
}

/// A config file declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSpec {
    /// File name without extension.
    pub file_name: String,
    /// Directory components, `["config"]` when omitted.
    #[serde(default)]
    pub path: Option<Vec<String>>,
    /// Extension, `.properties` when omitted.
    #[serde(default)]
    pub extension: Option<String>,
    /// File comment lines.
    #[serde(default)]
    pub comment: Vec<String>,
    /// File hook id.
    #[serde(default)]
    pub hook: Option<String>,
    /// Entries in order.
    #[serde(default)]
    pub entries: Vec<EntrySpec>,
}

/// An entry declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntrySpec {
    /// Property key; omitted for comment-only entries.
    #[serde(default)]
    pub key: String,
    /// Type in compact form (`int`, `list<string>`, `set<enum:Name>`).
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    /// Default literal. Numbers and booleans are taken as written, lists
    /// are joined with `,`.
    #[serde(default, deserialize_with = "literal")]
    pub default: String,
    /// Comment lines.
    #[serde(default)]
    pub comment: Vec<String>,
    /// Whether reloads re-resolve the entry.
    #[serde(default = "reloadable_default")]
    pub reloadable: bool,
    /// Whether the entry only carries comments.
    #[serde(default)]
    pub comment_only: bool,
    /// Converter id.
    #[serde(default)]
    pub converter: Option<String>,
    /// Supplier id.
    #[serde(default)]
    pub supplier: Option<String>,
    /// Field hook id.
    #[serde(default)]
    pub hook: Option<String>,
    /// Section opened before the entry.
    #[serde(default)]
    pub group_start: Option<GroupSpec>,
    /// Section closed after the entry.
    #[serde(default)]
    pub group_end: Option<GroupSpec>,
}

/// A section banner declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    /// Section name.
    pub name: String,
    /// Comment lines.
    #[serde(default)]
    pub comment: Vec<String>,
}

fn reloadable_default() -> bool {
    true
}

fn literal<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let value = serde_yaml::Value::deserialize(deserializer)?;
    literal_text(&value).map_err(serde::de::Error::custom)
}

fn literal_text(value: &serde_yaml::Value) -> std::result::Result<String, String> {
    use serde_yaml::Value;

    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::Sequence(items) => Ok(items
            .iter()
            .map(literal_text)
            .collect::<std::result::Result<Vec<_>, _>>()?
            .join(",")),
        Value::Mapping(_) | Value::Tagged(_) => {
            Err("default must be a scalar or a list of scalars".to_string())
        }
    }
}

impl Manifest {
    /// Parses a manifest from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Manifest`] if the text is not a valid manifest.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Manifest`] if it is not a valid manifest.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// A namespace declaration by name.
    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<&NamespaceSpec> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }

    /// The declared enums.
    #[must_use]
    pub fn enum_types(&self) -> BTreeMap<String, EnumType> {
        self.enums
            .iter()
            .map(|(name, constants)| (name.clone(), EnumType::new(name.clone(), constants)))
            .collect()
    }

    /// Builds every declared namespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] if a declaration is invalid.
    pub fn build_namespaces(&self) -> Result<Vec<Namespace>> {
        let enums = self.enum_types();
        self.namespaces
            .iter()
            .map(|ns| ns.build(&enums))
            .collect()
    }
}

impl NamespaceSpec {
    /// Builds the namespace, resolving enum references against `enums`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] if a declaration is invalid.
    pub fn build(&self, enums: &BTreeMap<String, EnumType>) -> Result<Namespace> {
        let mut builder = Namespace::builder(&self.name);
        for file in &self.files {
            builder = builder.file(file.build(&self.name, enums)?);
        }
        builder.build()
    }
}

impl FileSpec {
    fn build(&self, namespace: &str, enums: &BTreeMap<String, EnumType>) -> Result<ConfigFile> {
        let mut builder = ConfigFile::builder(&self.file_name).comment(self.comment.clone());
        if let Some(path) = &self.path {
            builder = builder.path(path.clone());
        }
        if let Some(extension) = &self.extension {
            builder = builder.extension(extension);
        }
        if let Some(hook) = &self.hook {
            builder = builder.hook(hook);
        }
        for entry in &self.entries {
            let owner = format!("{namespace}/{}", self.file_name);
            builder = builder.entry(entry.build(&owner, enums)?);
        }
        builder.build()
    }
}

impl EntrySpec {
    fn build(&self, owner: &str, enums: &BTreeMap<String, EnumType>) -> Result<SchemaEntry> {
        let mut entry = if self.comment_only {
            SchemaEntry::comment_only(self.comment.clone())
        } else {
            let owner = format!("{owner}/{}", self.key);
            let text = self
                .ty
                .as_deref()
                .ok_or_else(|| Error::invalid_schema(&owner, "missing type"))?;
            let ty = TypeDescriptor::parse(text, enums)
                .map_err(|reason| Error::invalid_schema(&owner, reason))?;
            let slot = DynamicSlot::new(ty);

            let mut entry = SchemaEntry::dynamic(&self.key, &self.default, &slot)
                .with_comment(self.comment.clone())
                .with_reloadable(self.reloadable);
            if let Some(id) = &self.converter {
                entry = entry.with_converter(id);
            }
            if let Some(id) = &self.supplier {
                entry = entry.with_supplier(id);
            }
            if let Some(id) = &self.hook {
                entry = entry.with_hook(id);
            }
            entry
        };

        if let Some(group) = &self.group_start {
            entry = entry.with_group_start(group.marker());
        }
        if let Some(group) = &self.group_end {
            entry = entry.with_group_end(group.marker());
        }
        Ok(entry)
    }
}

impl GroupSpec {
    fn marker(&self) -> GroupMarker {
        GroupMarker::new(&self.name).with_comment(self.comment.clone())
    }
}
