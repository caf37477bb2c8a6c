//! Conversion between property literals and typed values.
//!
//! Every conversion runs in both directions: [`Converter::from_literal`]
//! produces a [`Value`] for a [`TypeDescriptor`], [`Converter::to_literal`]
//! renders a value back into text that converts to the same value.
//!
//! [`MainConverter`] handles every descriptor. It routes collections to a
//! [`CollectionConverter`], which in turn hands each element to an element
//! converter.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use layercfg::{Converter, MainConverter, TypeDescriptor, Value};
//!
//! let converter = MainConverter::default();
//! let ty = TypeDescriptor::List(Box::new(TypeDescriptor::Duration));
//!
//! let value = converter.from_literal(&ty, "PT20S, 1min").unwrap();
//! assert_eq!(
//!     value,
//!     Value::List(vec![
//!         Value::Duration(Duration::from_secs(20)),
//!         Value::Duration(Duration::from_secs(60)),
//!     ])
//! );
//! assert_eq!(converter.to_literal(&ty, &value).unwrap(), "20secs,1min");
//! ```

mod collection;
mod duration;
mod scalar;
mod typed;
mod types;
mod value;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

use std::fmt;

use thiserror::Error;

pub use collection::{CollectionConverter, CollectionKind};
pub use duration::{format_duration, parse_duration, DurationError};
pub use scalar::ScalarConverter;
pub use typed::ConfigValue;
pub use types::{EnumType, TypeDescriptor};
pub use value::Value;

/// Why a literal or value could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The literal is not valid for the type.
    #[error("cannot convert '{literal}' to {expected}: {reason}")]
    InvalidLiteral {
        /// Expected type, in compact text form.
        expected: String,
        /// Offending literal.
        literal: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The literal is not a valid duration.
    #[error("malformed duration '{literal}': {source}")]
    MalformedDuration {
        /// Offending literal.
        literal: String,
        /// Grammar failure.
        #[source]
        source: DurationError,
    },

    /// A value does not match the declared type.
    #[error("expected a value of type {expected}, found {found}")]
    TypeMismatch {
        /// Declared type.
        expected: String,
        /// Kind of the value supplied.
        found: String,
    },

    /// The converter cannot handle the declared type.
    #[error("the {converter} converter does not handle type {ty}")]
    Unsupported {
        /// Converter name.
        converter: String,
        /// Declared type.
        ty: String,
    },
}

impl ConversionError {
    /// A [`ConversionError::TypeMismatch`] for `found`.
    pub fn mismatch(expected: impl fmt::Display, found: &Value) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            found: found.kind().to_string(),
        }
    }

    pub(crate) fn invalid(ty: &TypeDescriptor, literal: &str, reason: impl Into<String>) -> Self {
        Self::InvalidLiteral {
            expected: ty.to_string(),
            literal: literal.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(converter: &str, ty: &TypeDescriptor) -> Self {
        Self::Unsupported {
            converter: converter.to_string(),
            ty: ty.to_string(),
        }
    }
}

/// Bidirectional literal conversion.
///
/// Implementations must be stateless or internally synchronized; a single
/// instance is shared by every entry that names it.
pub trait Converter: Send + Sync {
    /// Converts a literal into a value of type `ty`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] if the literal is not valid for `ty`.
    fn from_literal(&self, ty: &TypeDescriptor, literal: &str) -> Result<Value, ConversionError>;

    /// Renders a value of type `ty` as a literal.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] if `value` is not an instance of `ty`.
    fn to_literal(&self, ty: &TypeDescriptor, value: &Value) -> Result<String, ConversionError>;
}

/// The default converter, registered under the id `main`.
#[derive(Debug, Clone)]
pub struct MainConverter {
    scalar: ScalarConverter,
    array: CollectionConverter,
    list: CollectionConverter,
    set: CollectionConverter,
}

impl Default for MainConverter {
    fn default() -> Self {
        Self {
            scalar: ScalarConverter,
            array: CollectionConverter::new(CollectionKind::Array),
            list: CollectionConverter::new(CollectionKind::List),
            set: CollectionConverter::new(CollectionKind::Set),
        }
    }
}

impl MainConverter {
    fn route(&self, ty: &TypeDescriptor) -> &dyn Converter {
        match ty {
            TypeDescriptor::Array(_) => &self.array,
            TypeDescriptor::List(_) => &self.list,
            TypeDescriptor::Set(_) => &self.set,
            _ => &self.scalar,
        }
    }
}

impl Converter for MainConverter {
    fn from_literal(&self, ty: &TypeDescriptor, literal: &str) -> Result<Value, ConversionError> {
        self.route(ty).from_literal(ty, literal)
    }

    fn to_literal(&self, ty: &TypeDescriptor, value: &Value) -> Result<String, ConversionError> {
        self.route(ty).to_literal(ty, value)
    }
}
