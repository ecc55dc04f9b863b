///
/// Named, typed parameter values.
///
/// A `Binding` pairs a column name with a value ready for positional
/// substitution into a prepared statement. The record encoder produces
/// bindings in field declaration order; statement binding consumes them
/// one position at a time.
///

use std::fmt;

use crate::errors::Error;
use crate::statement::Statement;
use crate::value::{ToValue, Value};

pub type Bindings = Vec<Binding>;

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub column: String,
    pub value: Value,
}

impl Binding {
    pub fn new(column: impl Into<String>, value: impl ToValue) -> Self {
        Binding {
            column: column.into(),
            value: value.to_value(),
        }
    }

    pub fn null(column: impl Into<String>) -> Self {
        Binding {
            column: column.into(),
            value: Value::Null,
        }
    }

    /// Binds this value at the given 1-based statement position.
    pub fn bind(&self, stmt: &mut Statement<'_>, position: usize) -> Result<(), Error> {
        stmt.bind_value(position, &self.value)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.column, self.value)
    }
}
