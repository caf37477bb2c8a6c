//! Conversion of non-collection values.

use std::path::PathBuf;

use regex::Regex;

use super::duration::{format_duration, parse_duration};
use super::{ConversionError, Converter, TypeDescriptor, Value};

/// Converter for every scalar [`TypeDescriptor`].
///
/// Collection descriptors are rejected with [`ConversionError::Unsupported`];
/// [`super::MainConverter`] routes those to a
/// [`super::CollectionConverter`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarConverter;

impl Converter for ScalarConverter {
    fn from_literal(&self, ty: &TypeDescriptor, literal: &str) -> Result<Value, ConversionError> {
        let invalid = |reason: String| ConversionError::invalid(ty, literal, reason);

        match ty {
            TypeDescriptor::Bool => parse_bool(literal).map(Value::Bool).map_err(invalid),
            TypeDescriptor::Byte => decode_as(literal).map(Value::Byte).map_err(invalid),
            TypeDescriptor::Short => decode_as(literal).map(Value::Short).map_err(invalid),
            TypeDescriptor::Int => decode_as(literal).map(Value::Int).map_err(invalid),
            TypeDescriptor::Long => decode_as(literal).map(Value::Long).map_err(invalid),
            TypeDescriptor::Float => literal
                .trim()
                .parse()
                .map(Value::Float)
                .map_err(|e: std::num::ParseFloatError| invalid(e.to_string())),
            TypeDescriptor::Double => literal
                .trim()
                .parse()
                .map(Value::Double)
                .map_err(|e: std::num::ParseFloatError| invalid(e.to_string())),
            TypeDescriptor::String => Ok(Value::String(literal.to_string())),
            TypeDescriptor::Enum(e) => {
                if e.contains(literal) {
                    Ok(Value::Enum(literal.to_string()))
                } else {
                    Err(invalid(format!(
                        "no constant '{literal}' in {}, expected one of {}",
                        e.name(),
                        e.constants().join("|")
                    )))
                }
            }
            TypeDescriptor::Duration => parse_duration(literal).map(Value::Duration).map_err(
                |source| ConversionError::MalformedDuration {
                    literal: literal.to_string(),
                    source,
                },
            ),
            TypeDescriptor::Path => Ok(Value::Path(PathBuf::from(literal))),
            TypeDescriptor::File => Ok(Value::File(PathBuf::from(literal))),
            TypeDescriptor::Pattern => Regex::new(literal)
                .map(Value::Pattern)
                .map_err(|e| invalid(e.to_string())),
            TypeDescriptor::Array(_) | TypeDescriptor::List(_) | TypeDescriptor::Set(_) => {
                Err(ConversionError::unsupported("scalar", ty))
            }
        }
    }

    fn to_literal(&self, ty: &TypeDescriptor, value: &Value) -> Result<String, ConversionError> {
        if ty.is_collection() {
            return Err(ConversionError::unsupported("scalar", ty));
        }
        if !value.conforms_to(ty) {
            return Err(ConversionError::mismatch(ty, value));
        }

        let literal = match value {
            Value::Bool(v) => v.to_string(),
            Value::Byte(v) => v.to_string(),
            Value::Short(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Long(v) => v.to_string(),
            Value::Float(v) => format!("{v:?}"),
            Value::Double(v) => format!("{v:?}"),
            Value::String(v) | Value::Enum(v) => v.clone(),
            Value::Duration(v) => format_duration(*v),
            Value::Path(v) | Value::File(v) => v.display().to_string(),
            Value::Pattern(v) => v.as_str().to_string(),
            Value::Array(_) | Value::List(_) | Value::Set(_) => {
                return Err(ConversionError::mismatch(ty, value))
            }
        };
        Ok(literal)
    }
}

/// Parses a boolean.
///
/// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(format!(
            "invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
        )),
    }
}

fn decode_as<T: TryFrom<i128>>(literal: &str) -> Result<T, String> {
    let value = decode_integer(literal)?;
    T::try_from(value).map_err(|_| format!("value {value} is out of range"))
}

/// Decodes an integer literal: optional sign, then `0x`, `0X` or `#` for
/// hexadecimal, a leading `0` for octal, decimal otherwise.
pub(crate) fn decode_integer(literal: &str) -> Result<i128, String> {
    let s = literal.trim();
    if s.is_empty() {
        return Err("zero length string".to_string());
    }

    let (negative, unsigned) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
        .or_else(|| unsigned.strip_prefix('#'))
    {
        (16, hex)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    if digits.is_empty() {
        return Err("missing digits".to_string());
    }
    if digits.starts_with(['-', '+']) {
        return Err("sign character in wrong position".to_string());
    }

    let magnitude = u64::from_str_radix(digits, radix).map_err(|e| e.to_string())?;
    let magnitude = i128::from(magnitude);
    Ok(if negative { -magnitude } else { magnitude })
}
