///
/// Per-table identity cache.
///
/// Maps (table name, row id) to the most recently loaded record for
/// that key, short-circuiting redundant storage reads. Owned by the
/// database session; its lifetime equals the session's. Entries are
/// type-erased and recovered by downcast. The cache is intentionally
/// unbounded: single session, modest row counts, no eviction.
///
/// The map sits behind a mutex so lookups work through a shared
/// reference; the workload is read-mostly and small.
///

use std::any::Any;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::{DatabaseError, Error};
use crate::record::{Record, RowId};

type Table = HashMap<RowId, Box<dyn Any>>;

#[derive(Default)]
pub struct Cache {
    tables: Mutex<HashMap<String, Table>>,
}

impl Cache {
    pub fn new() -> Self {
        Cache {
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// Pure lookup; never touches storage.
    pub fn get<T: Record>(&self, row_id: RowId) -> Option<T> {
        let tables = self.tables.lock().unwrap();
        tables
            .get(T::TABLE)?
            .get(&row_id)?
            .downcast_ref::<T>()
            .cloned()
    }

    /// Unconditional overwrite under the record's table and row id.
    pub fn put<T: Record>(&self, record: &T) {
        let mut tables = self.tables.lock().unwrap();
        tables
            .entry(T::TABLE.to_string())
            .or_default()
            .insert(record.row_id(), Box::new(record.clone()));
    }

    /// Returns the cached record if present; otherwise invokes the
    /// loader, stores its result, and returns it. A loader miss fails
    /// with NotFound.
    pub fn fetch_or_load<T, F>(&self, row_id: RowId, loader: F) -> Result<T, Error>
    where
        T: Record,
        F: FnOnce(RowId) -> Result<Option<T>, Error>,
    {
        if let Some(hit) = self.get::<T>(row_id) {
            return Ok(hit);
        }
        match loader(row_id)? {
            Some(record) => {
                self.put(&record);
                Ok(record)
            }
            None => Err(DatabaseError::NotFound {
                table: T::TABLE.to_string(),
                row_id,
            }
            .logged()
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RowId;

    crate::record! {
        struct Reading("reading") {
            row_id: RowId as "_id",
            value: f64 as "value",
        }
    }

    fn reading(row_id: RowId, value: f64) -> Reading {
        Reading { row_id, value }
    }

    #[test]
    fn test_get_misses_before_put() {
        let cache = Cache::new();
        assert!(cache.get::<Reading>(1).is_none());
    }

    #[test]
    fn test_put_then_get_round_trips() {
        let cache = Cache::new();
        cache.put(&reading(1, 2.5));
        assert_eq!(cache.get::<Reading>(1), Some(reading(1, 2.5)));
        assert!(cache.get::<Reading>(2).is_none());
    }

    #[test]
    fn test_put_overwrites_the_same_key() {
        let cache = Cache::new();
        cache.put(&reading(1, 2.5));
        cache.put(&reading(1, 9.0));
        assert_eq!(cache.get::<Reading>(1), Some(reading(1, 9.0)));
    }

    #[test]
    fn test_fetch_or_load_skips_the_loader_on_a_hit() {
        let cache = Cache::new();
        cache.put(&reading(1, 2.5));

        let mut loads = 0;
        let got = cache
            .fetch_or_load::<Reading, _>(1, |_| {
                loads += 1;
                Ok(Some(reading(1, 0.0)))
            })
            .unwrap();
        assert_eq!(got, reading(1, 2.5));
        assert_eq!(loads, 0, "a cache hit must not reach the loader");
    }

    #[test]
    fn test_fetch_or_load_stores_the_loaded_record() {
        let cache = Cache::new();
        let got = cache
            .fetch_or_load::<Reading, _>(3, |row_id| Ok(Some(reading(row_id, 7.0))))
            .unwrap();
        assert_eq!(got, reading(3, 7.0));
        assert_eq!(cache.get::<Reading>(3), Some(reading(3, 7.0)));
    }

    #[test]
    fn test_fetch_or_load_misses_fail_with_not_found() {
        let cache = Cache::new();
        let err = cache
            .fetch_or_load::<Reading, _>(3, |_| Ok(None))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Database(DatabaseError::NotFound { row_id: 3, .. })
        ));
    }
}
