///
/// tablite - Typed table mapping over embedded SQLite
///
/// A record type declares its fields once; tablite derives the table
/// schema, generates the CREATE/INSERT/SELECT statements, binds record
/// fields to query parameters, decodes result rows back into records,
/// and caches loaded records by row id. It includes:
///
/// - value: the closed primitive value model and its conversion rules
/// - column: column descriptors and the field-type to kind mapping
/// - schema: validated column-list derivation from a record type
/// - record: the per-record traversal contract and the record! macro
/// - binding: named parameter values in declaration order
/// - clause: WHERE clause fragments with positional binding
/// - row: the ephemeral name-indexed result-row view
/// - statement: the prepared-statement shim over the storage engine
/// - cache: the per-table identity cache keyed by row id
/// - database: the gateway composing all of the above
///
/// Entry points:
/// - `record!`: declare a record type and its table mapping
/// - `Database::open`: open a database session
/// - `Database::create_table` / `insert` / `select_*` / `fetch`
///

pub mod binding;
pub mod cache;
pub mod clause;
pub mod column;
pub mod database;
pub mod errors;
pub mod record;
pub mod row;
pub mod schema;
pub mod statement;
pub mod value;

pub use binding::{Binding, Bindings};
pub use cache::Cache;
pub use clause::{Clause, Conjunction};
pub use column::{Column, ColumnKind, ColumnType, Columns};
pub use database::{Database, Order};
pub use errors::{DatabaseError, DecodeError, EngineError, Error, SchemaError};
pub use record::{INVALID_ROW_ID, Record, RowId};
pub use row::Row;
pub use schema::table_columns;
pub use statement::Statement;
pub use value::{FromValue, ToValue, Value};
