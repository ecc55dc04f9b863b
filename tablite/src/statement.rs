///
/// Prepared-statement shim over the storage engine.
///
/// Wraps a rusqlite statement with positional bind primitives keyed by
/// value tag. Lifecycle: prepared, bound, stepped to rows or done, and
/// finalized — finalization happens when the wrapper drops, on every
/// exit path. `reset()` clears the bindings so one prepared statement
/// can be executed again with fresh parameters.
///

use indexmap::IndexMap;

use crate::errors::{DatabaseError, EngineError, Error};
use crate::value::Value;

pub struct Statement<'conn> {
    inner: rusqlite::Statement<'conn>,
}

impl<'conn> Statement<'conn> {
    pub(crate) fn new(inner: rusqlite::Statement<'conn>) -> Self {
        Statement { inner }
    }

    /// Insertion-ordered map from result column name to position,
    /// captured once per statement for name-indexed decoding.
    pub fn column_positions(&self) -> IndexMap<String, usize> {
        self.inner
            .column_names()
            .into_iter()
            .enumerate()
            .map(|(position, name)| (name.to_string(), position))
            .collect()
    }

    pub fn column_count(&self) -> usize {
        self.inner.column_count()
    }

    /// Binds a value at a 1-based position. Unsigned values travel
    /// through the engine's signed 64-bit channel; values above
    /// i64::MAX are rejected rather than wrapped.
    pub fn bind_value(&mut self, position: usize, value: &Value) -> Result<(), Error> {
        let result = match value {
            Value::Null => self
                .inner
                .raw_bind_parameter(position, rusqlite::types::Null),
            Value::Bool(b) => self.inner.raw_bind_parameter(position, i64::from(*b)),
            Value::Signed(i) => self.inner.raw_bind_parameter(position, *i),
            Value::Unsigned(u) => {
                let i = i64::try_from(*u).map_err(|_| {
                    DatabaseError::UnbindableValue {
                        value: u.to_string(),
                    }
                    .logged()
                })?;
                self.inner.raw_bind_parameter(position, i)
            }
            Value::Real(r) => self.inner.raw_bind_parameter(position, *r),
            Value::Text(s) => self.inner.raw_bind_parameter(position, s.as_str()),
        };
        result.map_err(EngineError::from)?;
        Ok(())
    }

    /// Steps the statement to completion, returning the number of rows
    /// changed. The underlying statement is reset afterwards; bindings
    /// are kept until `reset()`.
    pub fn execute(&mut self) -> Result<usize, Error> {
        Ok(self.inner.raw_execute().map_err(EngineError::from)?)
    }

    /// Clears the bindings for the next execution round.
    pub fn reset(&mut self) {
        self.inner.clear_bindings();
    }

    pub(crate) fn raw_query(&mut self) -> rusqlite::Rows<'_> {
        self.inner.raw_query()
    }
}
