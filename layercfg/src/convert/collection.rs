//! Array, list and set conversion.
//!
//! Literals are split on `,`. Each element is trimmed and trailing empty
//! segments are dropped; an empty literal is an empty collection. For sets of
//! enums, `*` stands for every constant and a full set is rendered as `*`.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::scalar::ScalarConverter;
use super::value::compare;
use super::{ConversionError, Converter, TypeDescriptor, Value};

/// Which collection shape a [`CollectionConverter`] handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// Sorted when the element type is ordered.
    Array,
    /// Literal order.
    List,
    /// Deduplicated.
    Set,
}

impl CollectionKind {
    fn element_of(self, ty: &TypeDescriptor) -> Option<&TypeDescriptor> {
        match (self, ty) {
            (Self::Array, TypeDescriptor::Array(e))
            | (Self::List, TypeDescriptor::List(e))
            | (Self::Set, TypeDescriptor::Set(e)) => Some(e),
            _ => None,
        }
    }

    fn wrap(self, items: Vec<Value>) -> Value {
        match self {
            Self::Array => Value::Array(items),
            Self::List => Value::List(items),
            Self::Set => Value::Set(items),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::List => "list",
            Self::Set => "set",
        }
    }
}

/// Converter for one collection shape. Elements go through an element
/// converter, [`ScalarConverter`] unless another is supplied.
#[derive(Clone)]
pub struct CollectionConverter {
    kind: CollectionKind,
    element: Arc<dyn Converter>,
}

impl CollectionConverter {
    /// Creates a converter whose elements use [`ScalarConverter`].
    #[must_use]
    pub fn new(kind: CollectionKind) -> Self {
        Self::with_element(kind, Arc::new(ScalarConverter))
    }

    /// Creates a converter with a custom element converter.
    #[must_use]
    pub fn with_element(kind: CollectionKind, element: Arc<dyn Converter>) -> Self {
        Self { kind, element }
    }

    /// The collection shape handled.
    #[must_use]
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    fn element_type<'a>(&self, ty: &'a TypeDescriptor) -> Result<&'a TypeDescriptor, ConversionError> {
        self.kind
            .element_of(ty)
            .ok_or_else(|| ConversionError::unsupported(self.kind.name(), ty))
    }

    fn normalize(&self, element: &TypeDescriptor, mut items: Vec<Value>) -> Vec<Value> {
        match self.kind {
            CollectionKind::List => items,
            CollectionKind::Array => {
                if element.is_ordered() {
                    sort(element, &mut items);
                }
                items
            }
            CollectionKind::Set if element.is_ordered() => {
                sort(element, &mut items);
                items.dedup();
                items
            }
            CollectionKind::Set => {
                let mut unique: Vec<Value> = Vec::with_capacity(items.len());
                for item in items {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                unique
            }
        }
    }

    fn is_full_enum_set(&self, element: &TypeDescriptor, items: &[Value]) -> bool {
        match (self.kind, element) {
            (CollectionKind::Set, TypeDescriptor::Enum(e)) => {
                !e.constants().is_empty() && items.len() == e.constants().len()
            }
            _ => false,
        }
    }
}

fn sort(element: &TypeDescriptor, items: &mut [Value]) {
    items.sort_by(|a, b| compare(element, a, b).unwrap_or(Ordering::Equal));
}

/// Splits a collection literal into trimmed element literals.
fn split_elements(literal: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = literal.split(',').map(str::trim).collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

impl Converter for CollectionConverter {
    fn from_literal(&self, ty: &TypeDescriptor, literal: &str) -> Result<Value, ConversionError> {
        let element = self.element_type(ty)?;
        let literal = literal.trim();

        if self.kind == CollectionKind::Set && literal == "*" {
            if let TypeDescriptor::Enum(e) = element {
                let all = e.constants().iter().cloned().map(Value::Enum).collect();
                return Ok(Value::Set(all));
            }
        }

        let items = split_elements(literal)
            .into_iter()
            .map(|part| self.element.from_literal(element, part))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.kind.wrap(self.normalize(element, items)))
    }

    fn to_literal(&self, ty: &TypeDescriptor, value: &Value) -> Result<String, ConversionError> {
        let element = self.element_type(ty)?;
        if !value.conforms_to(ty) {
            return Err(ConversionError::mismatch(ty, value));
        }
        let items = self.normalize(element, value.elements().unwrap_or_default().to_vec());

        if self.is_full_enum_set(element, &items) {
            return Ok("*".to_string());
        }

        let parts = items
            .iter()
            .map(|item| self.element.to_literal(element, item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(","))
    }
}

impl fmt::Debug for CollectionConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionConverter")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
