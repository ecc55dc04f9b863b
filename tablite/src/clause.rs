///
/// WHERE clause fragments.
///
/// A `Clause` is a (conjunction, column fragment, typed value) triple.
/// Clauses are appended to a SELECT in list order and their values are
/// bound positionally in the same order; the first clause's conjunction
/// keyword is omitted. The column fragment carries its own comparison
/// placeholder, e.g. `"S = ?"`.
///

use crate::errors::Error;
use crate::statement::Statement;
use crate::value::{ToValue, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    First,
    And,
    Or,
}

impl Conjunction {
    pub fn keyword(self) -> &'static str {
        match self {
            Conjunction::First => "",
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub conjunction: Conjunction,
    pub column: String,
    pub value: Value,
}

impl Clause {
    fn new(conjunction: Conjunction, value: impl ToValue, column: impl Into<String>) -> Self {
        Clause {
            conjunction,
            column: column.into(),
            value: value.to_value(),
        }
    }

    pub fn first(value: impl ToValue, column: impl Into<String>) -> Self {
        Clause::new(Conjunction::First, value, column)
    }

    pub fn and(value: impl ToValue, column: impl Into<String>) -> Self {
        Clause::new(Conjunction::And, value, column)
    }

    pub fn or(value: impl ToValue, column: impl Into<String>) -> Self {
        Clause::new(Conjunction::Or, value, column)
    }

    /// The SQL text appended for this clause, leading space included.
    pub(crate) fn fragment(&self) -> String {
        match self.conjunction {
            Conjunction::First => format!(" {}", self.column),
            other => format!(" {} {}", other.keyword(), self.column),
        }
    }

    pub(crate) fn bind(&self, stmt: &mut Statement<'_>, position: usize) -> Result<(), Error> {
        stmt.bind_value(position, &self.value)
    }
}
