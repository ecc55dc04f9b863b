///
/// tablite error types.
///
/// All errors that can occur while mapping records to tables: schema
/// derivation, row decoding, gateway operations, and failures reported
/// by the storage engine itself.
///
/// Error categories:
/// - SchemaError: malformed or unsupported record shape
/// - DecodeError: a result row could not be turned back into a record
/// - DatabaseError: invalid gateway input or a missing record
/// - EngineError: wraps the engine's native result code and message
///
/// Every error is emitted to the tracing sink at error severity when it
/// is constructed through `logged()`, annotated with the construction
/// call site. Logging never changes control flow.
///

use std::panic::Location;

use thiserror::Error;
use tracing::error;

use crate::column::ColumnKind;
use crate::record::RowId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Table {table} is missing columns")]
    MissingColumns { table: String },

    #[error("Primary can't be optional: {column}")]
    OptionalPrimary { column: String },

    #[error("{kind} is not supported as a primary index: {column}")]
    UnsupportedPrimary { column: String, kind: ColumnKind },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unrecognized key: {name}")]
    UnrecognizedKey { name: String },

    #[error("cannot decode {found} into {target}")]
    Mismatch {
        found: &'static str,
        target: &'static str,
    },

    #[error("{value} does not fit in {target}")]
    Narrow {
        value: String,
        target: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    #[error("statement is empty")]
    EmptyStatement,

    #[error("Invalid RowId")]
    InvalidRowId,

    #[error("{row_id} not found for {table}")]
    NotFound { table: String, row_id: RowId },

    #[error("{value} can't be bound as a signed integer")]
    UnbindableValue { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct EngineError {
    pub code: i64,
    pub message: String,
}

impl From<rusqlite::Error> for EngineError {
    fn from(e: rusqlite::Error) -> Self {
        let code = match &e {
            rusqlite::Error::SqliteFailure(err, _) => err.extended_code as i64,
            _ => -1,
        };
        EngineError {
            code,
            message: e.to_string(),
        }
        .logged()
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Engine(e.into())
    }
}

impl SchemaError {
    #[track_caller]
    pub(crate) fn logged(self) -> Self {
        let at = Location::caller();
        error!("{} at {}:{}", self, at.file(), at.line());
        self
    }
}

impl DecodeError {
    #[track_caller]
    pub(crate) fn logged(self) -> Self {
        let at = Location::caller();
        error!("{} at {}:{}", self, at.file(), at.line());
        self
    }
}

impl DatabaseError {
    #[track_caller]
    pub(crate) fn logged(self) -> Self {
        let at = Location::caller();
        error!("{} at {}:{}", self, at.file(), at.line());
        self
    }
}

impl EngineError {
    #[track_caller]
    pub(crate) fn logged(self) -> Self {
        let at = Location::caller();
        error!("{} at {}:{}", self, at.file(), at.line());
        self
    }
}
