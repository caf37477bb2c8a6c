//! Mapping between Rust types and configuration values.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;

use super::{ConversionError, TypeDescriptor, Value};

/// A Rust type that can be bound to a schema entry.
///
/// Implemented for `bool`, `i8`, `i16`, `i32`, `i64`, `f32`, `f64`,
/// `String`, [`Duration`], [`PathBuf`], [`Regex`], `Vec<T>` (list),
/// `Box<[T]>` (array) and `BTreeSet<T>` (set). Enums get an implementation
/// from [`config_enum!`](crate::config_enum).
pub trait ConfigValue: Sized + Clone + Send + Sync + 'static {
    /// The descriptor values of this type are converted with.
    fn type_descriptor() -> TypeDescriptor;

    /// Extracts a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::TypeMismatch`] if `value` has the wrong
    /// shape.
    fn from_value(value: Value) -> Result<Self, ConversionError>;

    /// Wraps a typed value.
    fn into_value(self) -> Value;
}

macro_rules! scalar_config_value {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl ConfigValue for $ty {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::$variant
                }

                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(ConversionError::mismatch(Self::type_descriptor(), &other)),
                    }
                }

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }
        )+
    };
}

scalar_config_value! {
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    Duration => Duration,
    Regex => Pattern,
}

impl ConfigValue for PathBuf {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Path
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Path(p) | Value::File(p) => Ok(p),
            other => Err(ConversionError::mismatch(Self::type_descriptor(), &other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Path(self)
    }
}

fn collect<T: ConfigValue, C: FromIterator<T>>(items: Vec<Value>) -> Result<C, ConversionError> {
    items.into_iter().map(T::from_value).collect()
}

impl<T: ConfigValue> ConfigValue for Vec<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::List(Box::new(T::type_descriptor()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::List(items) => collect::<T, _>(items),
            other => Err(ConversionError::mismatch(Self::type_descriptor(), &other)),
        }
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(ConfigValue::into_value).collect())
    }
}

impl<T: ConfigValue> ConfigValue for Box<[T]> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Array(Box::new(T::type_descriptor()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Array(items) => collect::<T, _>(items),
            other => Err(ConversionError::mismatch(Self::type_descriptor(), &other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Array(self.into_vec().into_iter().map(ConfigValue::into_value).collect())
    }
}

impl<T: ConfigValue + Ord> ConfigValue for BTreeSet<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Set(Box::new(T::type_descriptor()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Set(items) => collect::<T, _>(items),
            other => Err(ConversionError::mismatch(Self::type_descriptor(), &other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Set(self.into_iter().map(ConfigValue::into_value).collect())
    }
}

/// Declares a configuration enum.
///
/// Generates the enum (ordered by declaration), an `ALL` constant, a
/// `name()` accessor and a [`ConfigValue`] implementation.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use layercfg::{config_enum, ConfigValue, Converter, MainConverter};
///
/// config_enum! {
///     /// Game difficulty.
///     pub enum Difficulty { Easy, Normal, Hard }
/// }
///
/// let ty = <BTreeSet<Difficulty>>::type_descriptor();
/// let value = MainConverter::default().from_literal(&ty, "*").unwrap();
/// let set = BTreeSet::<Difficulty>::from_value(value).unwrap();
/// assert_eq!(set.len(), Difficulty::ALL.len());
/// ```
#[macro_export]
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every constant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The constant's name as written in property files.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl $crate::ConfigValue for $name {
            fn type_descriptor() -> $crate::TypeDescriptor {
                static TYPE: ::std::sync::OnceLock<$crate::EnumType> = ::std::sync::OnceLock::new();
                $crate::TypeDescriptor::Enum(
                    TYPE.get_or_init(|| {
                        $crate::EnumType::new(stringify!($name), [$(stringify!($variant)),+])
                    })
                    .clone(),
                )
            }

            fn from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<Self, $crate::ConversionError> {
                if let $crate::Value::Enum(constant) = &value {
                    $(
                        if constant == stringify!($variant) {
                            return Ok($name::$variant);
                        }
                    )+
                }
                Err($crate::ConversionError::mismatch(stringify!($name), &value))
            }

            fn into_value(self) -> $crate::Value {
                $crate::Value::Enum(self.name().to_string())
            }
        }
    };
}
