//! Type descriptors for configurable values.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// An enumeration type: a name and its constants in declaration order.
///
/// Cloning is cheap; the definition is shared.
///
/// # Examples
///
/// ```
/// use layercfg::EnumType;
///
/// let difficulty = EnumType::new("Difficulty", ["EASY", "NORMAL", "HARD"]);
/// assert_eq!(difficulty.position("NORMAL"), Some(1));
/// assert!(!difficulty.contains("normal"));
/// ```
#[derive(Clone)]
pub struct EnumType(Arc<EnumDef>);

struct EnumDef {
    name: String,
    constants: Vec<String>,
}

impl EnumType {
    /// Creates an enum type from its constants in declaration order.
    pub fn new<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Arc::new(EnumDef {
            name: name.into(),
            constants: constants.into_iter().map(Into::into).collect(),
        }))
    }

    /// The type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Constants in declaration order.
    #[must_use]
    pub fn constants(&self) -> &[String] {
        &self.0.constants
    }

    /// Returns true if `constant` names a constant of this type.
    #[must_use]
    pub fn contains(&self, constant: &str) -> bool {
        self.position(constant).is_some()
    }

    /// Declaration index of `constant`.
    #[must_use]
    pub fn position(&self, constant: &str) -> Option<usize> {
        self.0.constants.iter().position(|c| c == constant)
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.name == other.0.name && self.0.constants == other.0.constants)
    }
}

impl Eq for EnumType {}

impl fmt::Debug for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumType")
            .field("name", &self.0.name)
            .field("constants", &self.0.constants)
            .finish()
    }
}

/// The declared type of a schema entry.
///
/// Collection element types must be scalar; see [`TypeDescriptor::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// `true` / `false`.
    Bool,
    /// 8-bit signed integer.
    Byte,
    /// 16-bit signed integer.
    Short,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Text, taken verbatim.
    String,
    /// One constant of an enumeration.
    Enum(EnumType),
    /// Non-negative span of time.
    Duration,
    /// Filesystem path.
    Path,
    /// Filesystem path naming a file.
    File,
    /// Compiled regular expression.
    Pattern,
    /// Fixed sequence, sorted when the element type is ordered.
    Array(Box<TypeDescriptor>),
    /// Sequence in literal order.
    List(Box<TypeDescriptor>),
    /// Deduplicated collection.
    Set(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Element type of a collection descriptor.
    #[must_use]
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Array(e) | Self::List(e) | Self::Set(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true for array, list and set descriptors.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.element().is_some()
    }

    /// Returns true if values of this type have a natural order.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        !matches!(self, Self::Pattern) && !self.is_collection()
    }

    /// The enum type of an enum descriptor or of an enum collection.
    #[must_use]
    pub fn enum_type(&self) -> Option<&EnumType> {
        match self {
            Self::Enum(e) => Some(e),
            other => other.element().and_then(Self::enum_type),
        }
    }

    /// Checks that collection elements are scalar.
    ///
    /// # Errors
    ///
    /// Returns a description of the offending nesting.
    pub fn validate(&self) -> Result<(), String> {
        match self.element() {
            Some(element) if element.is_collection() => Err(format!(
                "collection element type must be scalar, found {element}"
            )),
            _ => Ok(()),
        }
    }

    /// Parses the compact text form used by manifests, resolving enum names
    /// against `enums`.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem for unknown names, unknown enums,
    /// unbalanced brackets or nested collections.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use layercfg::{EnumType, TypeDescriptor};
    ///
    /// let mut enums = BTreeMap::new();
    /// enums.insert("Difficulty".to_string(), EnumType::new("Difficulty", ["EASY", "HARD"]));
    ///
    /// let ty = TypeDescriptor::parse("set<enum:Difficulty>", &enums).unwrap();
    /// assert_eq!(ty.to_string(), "set<enum:Difficulty>");
    /// assert!(TypeDescriptor::parse("list<list<int>>", &enums).is_err());
    /// ```
    pub fn parse(text: &str, enums: &BTreeMap<String, EnumType>) -> Result<Self, String> {
        let text = text.trim();

        if let Some((outer, rest)) = text.split_once('<') {
            let inner = rest
                .strip_suffix('>')
                .ok_or_else(|| format!("unbalanced brackets in type '{text}'"))?;
            let element = Box::new(Self::parse(inner, enums)?);
            let ty = match outer.trim().to_lowercase().as_str() {
                "array" => Self::Array(element),
                "list" => Self::List(element),
                "set" => Self::Set(element),
                other => return Err(format!("unknown collection type '{other}'")),
            };
            ty.validate()?;
            return Ok(ty);
        }

        if let Some(name) = text.strip_prefix("enum:") {
            return enums
                .get(name.trim())
                .cloned()
                .map(Self::Enum)
                .ok_or_else(|| format!("unknown enum '{}'", name.trim()));
        }

        match text.to_lowercase().as_str() {
            "bool" | "boolean" => Ok(Self::Bool),
            "byte" => Ok(Self::Byte),
            "short" => Ok(Self::Short),
            "int" | "integer" => Ok(Self::Int),
            "long" => Ok(Self::Long),
            "float" => Ok(Self::Float),
            "double" => Ok(Self::Double),
            "string" => Ok(Self::String),
            "duration" => Ok(Self::Duration),
            "path" => Ok(Self::Path),
            "file" => Ok(Self::File),
            "pattern" | "regex" => Ok(Self::Pattern),
            _ => Err(format!("unknown type '{text}'")),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Byte => write!(f, "byte"),
            Self::Short => write!(f, "short"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::String => write!(f, "string"),
            Self::Enum(e) => write!(f, "enum:{}", e.name()),
            Self::Duration => write!(f, "duration"),
            Self::Path => write!(f, "path"),
            Self::File => write!(f, "file"),
            Self::Pattern => write!(f, "pattern"),
            Self::Array(e) => write!(f, "array<{e}>"),
            Self::List(e) => write!(f, "list<{e}>"),
            Self::Set(e) => write!(f, "set<{e}>"),
        }
    }
}
