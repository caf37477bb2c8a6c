//! Value suppliers: resolve a literal and convert it.

use crate::convert::{Converter, Value};
use crate::error::{Error, Result};
use crate::event::ConfigEvent;
use crate::resolve::{resolve, LoadScope, ValueOrigin};
use crate::schema::SchemaEntry;

/// A typed value and the layer it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Supplied {
    /// The converted value.
    pub value: Value,
    /// Where its literal came from.
    pub origin: ValueOrigin,
}

/// Produces the value for an entry.
pub trait ValueSupplier: Send + Sync {
    /// Supplies the value for `entry`, converting with `converter`.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable value can be produced.
    fn supply(
        &self,
        scope: &LoadScope<'_>,
        entry: &SchemaEntry,
        converter: &dyn Converter,
    ) -> Result<Supplied>;
}

/// The standard supplier, registered under the id `default`.
///
/// Runs the resolution chain and converts the result. A literal that fails
/// conversion is reported with [`ConfigEvent::InvalidValue`] and replaced by
/// the default literal.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSupplier;

impl ValueSupplier for DefaultSupplier {
    fn supply(
        &self,
        scope: &LoadScope<'_>,
        entry: &SchemaEntry,
        converter: &dyn Converter,
    ) -> Result<Supplied> {
        let resolved = resolve(scope, entry);
        let ty = entry.declared_type();

        if resolved.origin != ValueOrigin::Default {
            match converter.from_literal(ty, &resolved.literal) {
                Ok(value) => {
                    return Ok(Supplied {
                        value,
                        origin: resolved.origin,
                    })
                }
                Err(err) => scope.sink.emit(&ConfigEvent::InvalidValue {
                    namespace: scope.context.namespace.clone(),
                    file: scope.file_path.to_path_buf(),
                    key: entry.key().to_string(),
                    supplied: resolved.literal.clone(),
                    default: entry.default_literal().to_string(),
                    reason: err.to_string(),
                }),
            }
        }

        let value = converter
            .from_literal(ty, entry.default_literal())
            .map_err(|source| Error::Conversion {
                key: entry.key().to_string(),
                source,
            })?;
        Ok(Supplied {
            value,
            origin: ValueOrigin::Default,
        })
    }
}
