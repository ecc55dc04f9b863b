///
/// Result-row view.
///
/// A `Row` exists only for the duration of one decode call: a
/// name-to-position map built from the statement's column names plus a
/// cursor into the engine's current result row. Lookups are by name,
/// never by position, so the SELECT list order need not match field
/// declaration order.
///

use indexmap::IndexMap;
use rusqlite::types::ValueRef;

use crate::errors::DecodeError;
use crate::value::{FromValue, Value};

pub struct Row<'a> {
    positions: &'a IndexMap<String, usize>,
    inner: &'a rusqlite::Row<'a>,
}

impl<'a> Row<'a> {
    pub(crate) fn new(positions: &'a IndexMap<String, usize>, inner: &'a rusqlite::Row<'a>) -> Self {
        Row { positions, inner }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    fn position(&self, name: &str) -> Result<usize, DecodeError> {
        self.positions.get(name).copied().ok_or_else(|| {
            DecodeError::UnrecognizedKey {
                name: name.to_string(),
            }
            .logged()
        })
    }

    /// The raw value under a column name, widened to the 64-bit model.
    pub fn value(&self, name: &str) -> Result<Value, DecodeError> {
        let position = self.position(name)?;
        let value = self.inner.get_ref(position).map_err(|_| {
            DecodeError::UnrecognizedKey {
                name: name.to_string(),
            }
            .logged()
        })?;
        match value {
            ValueRef::Null => Ok(Value::Null),
            ValueRef::Integer(i) => Ok(Value::Signed(i)),
            ValueRef::Real(r) => Ok(Value::Real(r)),
            ValueRef::Text(t) => Ok(Value::Text(String::from_utf8_lossy(t).into_owned())),
            ValueRef::Blob(_) => Err(DecodeError::Mismatch {
                found: "blob",
                target: "a primitive value",
            }
            .logged()),
        }
    }

    /// Decodes the value under a column name into a caller primitive,
    /// applying the checked narrowing contract.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, DecodeError> {
        T::from_value(self.value(name)?)
    }
}
