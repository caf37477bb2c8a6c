//! Typed values produced by conversion.

use std::cmp::Ordering;
use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;

use super::types::TypeDescriptor;

/// A converted configuration value. Mirrors [`TypeDescriptor`].
///
/// Collections hold their elements in canonical order: arrays sorted when
/// the element type is ordered, lists in literal order, sets deduplicated
/// and ordered (enum declaration order, natural order, or first insertion
/// for patterns).
#[derive(Debug, Clone)]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// 8-bit integer.
    Byte(i8),
    /// 16-bit integer.
    Short(i16),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Text.
    String(String),
    /// Enum constant name.
    Enum(String),
    /// Span of time.
    Duration(Duration),
    /// Path.
    Path(PathBuf),
    /// File path.
    File(PathBuf),
    /// Compiled regular expression.
    Pattern(Regex),
    /// Array elements.
    Array(Vec<Value>),
    /// List elements.
    List(Vec<Value>),
    /// Set elements.
    Set(Vec<Value>),
}

impl Value {
    /// Short name of the value's variant, used in mismatch errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Enum(_) => "enum",
            Self::Duration(_) => "duration",
            Self::Path(_) => "path",
            Self::File(_) => "file",
            Self::Pattern(_) => "pattern",
            Self::Array(_) => "array",
            Self::List(_) => "list",
            Self::Set(_) => "set",
        }
    }

    /// Returns true if this value is a valid instance of `ty`.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::{EnumType, TypeDescriptor, Value};
    ///
    /// let mode = TypeDescriptor::Enum(EnumType::new("Mode", ["FAST", "SAFE"]));
    /// assert!(Value::Enum("FAST".into()).conforms_to(&mode));
    /// assert!(!Value::Enum("SLOW".into()).conforms_to(&mode));
    /// assert!(!Value::Int(1).conforms_to(&TypeDescriptor::Long));
    /// ```
    #[must_use]
    pub fn conforms_to(&self, ty: &TypeDescriptor) -> bool {
        match (self, ty) {
            (Self::Bool(_), TypeDescriptor::Bool)
            | (Self::Byte(_), TypeDescriptor::Byte)
            | (Self::Short(_), TypeDescriptor::Short)
            | (Self::Int(_), TypeDescriptor::Int)
            | (Self::Long(_), TypeDescriptor::Long)
            | (Self::Float(_), TypeDescriptor::Float)
            | (Self::Double(_), TypeDescriptor::Double)
            | (Self::String(_), TypeDescriptor::String)
            | (Self::Duration(_), TypeDescriptor::Duration)
            | (Self::Path(_), TypeDescriptor::Path)
            | (Self::File(_), TypeDescriptor::File)
            | (Self::Pattern(_), TypeDescriptor::Pattern) => true,
            (Self::Enum(constant), TypeDescriptor::Enum(e)) => e.contains(constant),
            (Self::Array(items), TypeDescriptor::Array(element))
            | (Self::List(items), TypeDescriptor::List(element))
            | (Self::Set(items), TypeDescriptor::Set(element)) => {
                items.iter().all(|item| item.conforms_to(element))
            }
            _ => false,
        }
    }

    /// Collection elements, if this is a collection.
    #[must_use]
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) | Self::List(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b) == Ordering::Equal,
            (Self::Double(a), Self::Double(b)) => a.total_cmp(b) == Ordering::Equal,
            (Self::String(a), Self::String(b)) | (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::Path(a), Self::Path(b)) | (Self::File(a), Self::File(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            (Self::Array(a), Self::Array(b))
            | (Self::List(a), Self::List(b))
            | (Self::Set(a), Self::Set(b)) => a == b,
            _ => false,
        }
    }
}

/// Orders two elements of type `ty`. Returns `None` for unordered types
/// (patterns) and for mismatched values.
pub(crate) fn compare(ty: &TypeDescriptor, a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Enum(x), Value::Enum(y)) => {
            let e = ty.enum_type()?;
            Some(e.position(x)?.cmp(&e.position(y)?))
        }
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Byte(x), Value::Byte(y)) => Some(x.cmp(y)),
        (Value::Short(x), Value::Short(y)) => Some(x.cmp(y)),
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Long(x), Value::Long(y)) => Some(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => Some(x.total_cmp(y)),
        (Value::Double(x), Value::Double(y)) => Some(x.total_cmp(y)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Duration(x), Value::Duration(y)) => Some(x.cmp(y)),
        (Value::Path(x), Value::Path(y)) | (Value::File(x), Value::File(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
