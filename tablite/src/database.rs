///
/// The table gateway.
///
/// Owns the storage engine connection and the identity cache, composes
/// CREATE/INSERT/SELECT statements from derived columns, and
/// orchestrates encoding, decoding, and caching. Single-threaded,
/// synchronous, blocking: every operation runs to completion on the
/// caller's thread. The connection is opened with the engine's
/// full-mutex flag; this layer adds no locking of its own.
///

use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::binding::Binding;
use crate::cache::Cache;
use crate::clause::Clause;
use crate::column::Column;
use crate::errors::{DatabaseError, EngineError, Error, SchemaError};
use crate::record::{INVALID_ROW_ID, Record, RowId};
use crate::row::Row;
use crate::schema;
use crate::statement::Statement;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

pub struct Database {
    conn: Connection,
    cache: Cache,
}

impl Database {
    /// Opens (or creates) a database file in read-write mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
    }

    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
    }

    /// The full-mutex flag is always added: the engine serializes
    /// concurrent callers internally.
    pub fn open_with_flags(path: impl AsRef<Path>, flags: OpenFlags) -> Result<Self, Error> {
        let conn = Connection::open_with_flags(path, flags | OpenFlags::SQLITE_OPEN_FULL_MUTEX)
            .map_err(EngineError::from)?;
        Ok(Self::with_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory().map_err(EngineError::from)?;
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        Database {
            conn,
            cache: Cache::new(),
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>, Error> {
        if sql.is_empty() {
            return Err(DatabaseError::EmptyStatement.logged().into());
        }
        let inner = self.conn.prepare(sql).map_err(EngineError::from)?;
        Ok(Statement::new(inner))
    }

    /// Emits CREATE TABLE IF NOT EXISTS for the record's derived
    /// columns.
    pub fn create_table<T: Record>(&self) -> Result<(), Error> {
        let columns = schema::table_columns::<T>()?;
        let definitions = columns
            .iter()
            .map(Column::command)
            .collect::<Result<Vec<_>, _>>()?;
        let sql = create_command(T::TABLE, &definitions);
        self.execute(&sql)
    }

    /// Encodes the record, drops the row-id binding (the identifier is
    /// never client-supplied), inserts, writes the engine-assigned row
    /// id back onto the record, and caches it under the new key.
    pub fn insert<T: Record>(&self, record: &mut T) -> Result<RowId, Error> {
        let mut bindings = record.to_bindings();
        if bindings.is_empty() {
            return Err(SchemaError::MissingColumns {
                table: T::TABLE.to_string(),
            }
            .logged()
            .into());
        }
        bindings.remove(0);
        // a table with nothing but a row id is not insertable
        if bindings.is_empty() {
            return Err(SchemaError::MissingColumns {
                table: T::TABLE.to_string(),
            }
            .logged()
            .into());
        }

        let sql = insert_command(T::TABLE, &bindings);
        self.execute_with(&sql, |stmt| {
            for (index, binding) in bindings.iter().enumerate() {
                binding.bind(stmt, index + 1)?;
            }
            Ok(())
        })?;

        let row_id = self.last_insert_row_id();
        record.set_row_id(row_id);
        self.cache.put(record);
        Ok(row_id)
    }

    /// First record under the primary key, or None. The invalid
    /// sentinel is rejected before any SQL is generated.
    pub fn select_by_row_id<T: Record>(&self, row_id: RowId) -> Result<Option<T>, Error> {
        if row_id == INVALID_ROW_ID {
            return Err(DatabaseError::InvalidRowId.logged().into());
        }

        let columns = schema::table_columns::<T>()?;
        let sql = select_by_primary_command(T::TABLE, &columns);

        let mut rows: Vec<T> = Vec::new();
        self.for_each_row(
            &sql,
            |stmt| stmt.bind_value(1, &Value::Signed(row_id)),
            |row, _| {
                rows.push(T::from_row(row)?);
                Ok(())
            },
        )?;
        Ok(rows.into_iter().next())
    }

    pub fn select_all<T: Record>(&self) -> Result<Vec<T>, Error> {
        let columns = schema::table_columns::<T>()?;
        let sql = select_command(T::TABLE, &columns);

        let mut rows: Vec<T> = Vec::new();
        self.for_each_row(
            &sql,
            |_| Ok(()),
            |row, _| {
                rows.push(T::from_row(row)?);
                Ok(())
            },
        )?;
        Ok(rows)
    }

    /// Clause-filtered select. Clauses are appended in list order and
    /// bound positionally in the same order; an empty list degrades to
    /// select_all.
    pub fn select_where<T: Record>(&self, clauses: &[Clause]) -> Result<Vec<T>, Error> {
        if clauses.is_empty() {
            return self.select_all();
        }

        let columns = schema::table_columns::<T>()?;
        let sql = where_command(T::TABLE, &columns, clauses);

        let mut rows: Vec<T> = Vec::new();
        self.for_each_row(
            &sql,
            |stmt| {
                for (index, clause) in clauses.iter().enumerate() {
                    clause.bind(stmt, index + 1)?;
                }
                Ok(())
            },
            |row, _| {
                rows.push(T::from_row(row)?);
                Ok(())
            },
        )?;
        Ok(rows)
    }

    /// Primary-key values only, ordered, with optional paging — used to
    /// enumerate a table without materializing full records.
    pub fn select_row_ids<T: Record>(
        &self,
        order: Order,
        offset: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<RowId>, Error> {
        let columns = schema::table_columns::<T>()?;
        let primary = columns[0].name.clone();
        let sql = row_ids_command(T::TABLE, &primary, order, offset, limit);

        let mut row_ids: Vec<RowId> = Vec::new();
        self.for_each_row(
            &sql,
            |_| Ok(()),
            |row, _| {
                row_ids.push(row.get::<RowId>(&primary)?);
                Ok(())
            },
        )?;
        Ok(row_ids)
    }

    pub fn select_last_row_id<T: Record>(&self) -> Result<Option<RowId>, Error> {
        Ok(self
            .select_row_ids::<T>(Order::Desc, None, Some(1))?
            .into_iter()
            .next())
    }

    /// Cache-backed load; call this when the record is expected to
    /// exist.
    pub fn fetch<T: Record>(&self, row_id: RowId) -> Result<T, Error> {
        self.cache
            .fetch_or_load(row_id, |id| self.select_by_row_id::<T>(id))
    }

    pub fn execute(&self, sql: &str) -> Result<(), Error> {
        self.for_each_row(sql, |_| Ok(()), |_, _| Ok(()))
    }

    pub fn execute_with<B>(&self, sql: &str, bind: B) -> Result<(), Error>
    where
        B: FnOnce(&mut Statement<'_>) -> Result<(), Error>,
    {
        self.for_each_row(sql, bind, |_, _| Ok(()))
    }

    /// Runs one prepared statement `count` times, re-binding each round
    /// through the binder. Rounds are 1-based.
    pub fn execute_count<B>(&self, sql: &str, count: usize, mut bind: B) -> Result<(), Error>
    where
        B: FnMut(&mut Statement<'_>, usize) -> Result<(), Error>,
    {
        let mut stmt = self.prepare(sql)?;
        for index in 1..=count {
            bind(&mut stmt, index)?;
            stmt.execute()?;
            stmt.reset();
        }
        Ok(())
    }

    /// BEGIN, body, COMMIT; on a body failure the transaction is rolled
    /// back and the original error is rethrown. A failed rollback is
    /// fatal and propagates instead.
    pub fn with_transaction<T, F>(&self, body: F) -> Result<T, Error>
    where
        F: FnOnce(&Database) -> Result<T, Error>,
    {
        self.execute("BEGIN")?;
        match body(self) {
            Ok(value) => {
                self.execute("COMMIT")?;
                Ok(value)
            }
            Err(failure) => {
                self.execute("ROLLBACK")?;
                Err(failure)
            }
        }
    }

    pub fn last_insert_row_id(&self) -> RowId {
        self.conn.last_insert_rowid()
    }

    /// Rows changed by the most recent statement.
    pub fn changes(&self) -> usize {
        self.conn.changes() as usize
    }

    /// Prepares, binds, steps, and hands each result row to the
    /// handler with its 1-based row number. The statement is finalized
    /// on every exit path when it drops.
    fn for_each_row<B, H>(&self, sql: &str, bind: B, mut handle: H) -> Result<(), Error>
    where
        B: FnOnce(&mut Statement<'_>) -> Result<(), Error>,
        H: FnMut(&Row<'_>, usize) -> Result<(), Error>,
    {
        let mut stmt = self.prepare(sql)?;
        bind(&mut stmt)?;

        let positions = stmt.column_positions();
        let mut rows = stmt.raw_query();
        let mut row_num = 1;
        while let Some(inner) = rows.next().map_err(EngineError::from)? {
            handle(&Row::new(&positions, inner), row_num)?;
            row_num += 1;
        }
        Ok(())
    }
}

fn create_command(table: &str, definitions: &[String]) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} ( {} )",
        table,
        definitions.join(", ")
    )
}

fn insert_command(table: &str, bindings: &[Binding]) -> String {
    let columns: Vec<&str> = bindings.iter().map(|b| b.column.as_str()).collect();
    let markers: Vec<&str> = bindings.iter().map(|_| "?").collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(","),
        markers.join(",")
    )
}

fn select_command(table: &str, columns: &[Column]) -> String {
    let selected: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    format!("SELECT {} FROM {}", selected.join(", "), table)
}

fn select_by_primary_command(table: &str, columns: &[Column]) -> String {
    format!(
        "{} WHERE {} = ?",
        select_command(table, columns),
        columns[0].name
    )
}

fn where_command(table: &str, columns: &[Column], clauses: &[Clause]) -> String {
    let mut sql = format!("{} WHERE", select_command(table, columns));
    for clause in clauses {
        sql.push_str(&clause.fragment());
    }
    sql
}

/// SQLite only accepts OFFSET after LIMIT; offset-only paging rides on
/// the engine's unlimited LIMIT of -1.
fn row_ids_command(
    table: &str,
    primary: &str,
    order: Order,
    offset: Option<u32>,
    limit: Option<u32>,
) -> String {
    let mut sql = format!(
        "SELECT {} FROM {} ORDER BY {} {}",
        primary,
        table,
        primary,
        order.keyword()
    );
    if limit.is_some() || offset.is_some() {
        match limit {
            Some(n) => sql.push_str(&format!(" LIMIT {}", n)),
            None => sql.push_str(" LIMIT -1"),
        }
        if let Some(n) = offset {
            sql.push_str(&format!(" OFFSET {}", n));
        }
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnKind;

    fn speedtest_columns() -> Vec<Column> {
        let mut columns = vec![
            Column::new("_id", ColumnKind::Int64, false),
            Column::new("Q0", ColumnKind::Int64, false),
            Column::new("T1", ColumnKind::Real64, false),
            Column::new("T2", ColumnKind::Real64, false),
            Column::new("S", ColumnKind::Text, false),
        ];
        columns[0].primary = true;
        columns
    }

    #[test]
    fn test_create_command_text() {
        let definitions: Vec<String> = speedtest_columns()
            .iter()
            .map(|c| c.command().unwrap())
            .collect();
        assert_eq!(
            create_command("speedtest", &definitions),
            "CREATE TABLE IF NOT EXISTS speedtest ( \
             _id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, \
             Q0 INTEGER NOT NULL, T1 DOUBLE NOT NULL, \
             T2 DOUBLE NOT NULL, S TEXT NOT NULL )"
        );
    }

    #[test]
    fn test_insert_command_text() {
        let bindings = vec![
            Binding::new("Q0", 1i64),
            Binding::new("T1", 2.0f64),
            Binding::new("T2", 3.0f64),
            Binding::new("S", "ok"),
        ];
        assert_eq!(
            insert_command("speedtest", &bindings),
            "INSERT INTO speedtest (Q0,T1,T2,S) VALUES (?,?,?,?)"
        );
    }

    #[test]
    fn test_select_command_text() {
        let columns = speedtest_columns();
        assert_eq!(
            select_command("speedtest", &columns),
            "SELECT _id, Q0, T1, T2, S FROM speedtest"
        );
        assert_eq!(
            select_by_primary_command("speedtest", &columns),
            "SELECT _id, Q0, T1, T2, S FROM speedtest WHERE _id = ?"
        );
    }

    #[test]
    fn test_where_command_text() {
        let columns = speedtest_columns();
        let clauses = vec![
            Clause::first("Success", "S = ?"),
            Clause::and(5i64, "Q0 = ?"),
            Clause::or(1.5f64, "T1 < ?"),
        ];
        assert_eq!(
            where_command("speedtest", &columns, &clauses),
            "SELECT _id, Q0, T1, T2, S FROM speedtest WHERE S = ? AND Q0 = ? OR T1 < ?"
        );
    }

    #[test]
    fn test_row_ids_command_text() {
        assert_eq!(
            row_ids_command("speedtest", "_id", Order::Asc, None, None),
            "SELECT _id FROM speedtest ORDER BY _id ASC"
        );
        assert_eq!(
            row_ids_command("speedtest", "_id", Order::Desc, None, Some(1)),
            "SELECT _id FROM speedtest ORDER BY _id DESC LIMIT 1"
        );
        assert_eq!(
            row_ids_command("speedtest", "_id", Order::Asc, Some(10), Some(5)),
            "SELECT _id FROM speedtest ORDER BY _id ASC LIMIT 5 OFFSET 10"
        );
        assert_eq!(
            row_ids_command("speedtest", "_id", Order::Asc, Some(10), None),
            "SELECT _id FROM speedtest ORDER BY _id ASC LIMIT -1 OFFSET 10"
        );
    }

    #[test]
    fn test_empty_statement_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let err = db.execute("").unwrap_err();
        assert!(matches!(
            err,
            Error::Database(DatabaseError::EmptyStatement)
        ));
    }

    #[test]
    fn test_execute_count_reuses_one_statement() {
        let db = Database::open_in_memory().unwrap();
        db.execute("CREATE TABLE IF NOT EXISTS t ( n INTEGER NOT NULL )")
            .unwrap();
        db.execute_count("INSERT INTO t (n) VALUES (?)", 3, |stmt, index| {
            stmt.bind_value(1, &Value::Signed(index as i64 * 10))
        })
        .unwrap();

        let mut total = 0i64;
        let mut stmt = db.prepare("SELECT n FROM t").unwrap();
        let positions = stmt.column_positions();
        let mut rows = stmt.raw_query();
        while let Some(inner) = rows.next().unwrap() {
            total += Row::new(&positions, inner).get::<i64>("n").unwrap();
        }
        assert_eq!(total, 60);
        assert_eq!(db.changes(), 1, "last insert changed one row");
    }
}
