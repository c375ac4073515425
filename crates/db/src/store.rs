use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use libris_kernel::settings::DatabaseSettings;
use libris_kernel::Migration;
use rusqlite::{params_from_iter, Connection};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::open;
use crate::predicate::Predicate;
use crate::record::{id_column, select_sql, upsert_sql, Record};

/// Narrow storage interface used by the catalog.
///
/// Absence is never an error: `get` returns `None` and `scan` an empty list.
pub trait RecordStore: Send + Sync {
    fn get<R: Record>(&self, id: &str) -> StoreResult<Option<R>>;

    /// Insert, or replace every column of the existing row with the same id.
    fn put<R: Record>(&self, record: &R) -> StoreResult<()>;

    /// Remove every record of kind `R`, returning how many were deleted.
    fn delete_all<R: Record>(&self) -> StoreResult<usize>;

    /// Records of kind `R` matching `predicate`, in insertion order.
    fn scan<R: Record>(&self, predicate: &Predicate) -> StoreResult<Vec<R>>;
}

/// SQLite store shared behind a mutex; clones share one connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    location: Arc<str>,
}

impl SqliteStore {
    pub fn open(settings: &DatabaseSettings) -> StoreResult<Self> {
        let busy_timeout = Duration::from_millis(settings.busy_timeout_ms);
        if settings.is_in_memory() {
            let conn = open::open_memory(busy_timeout)?;
            Ok(Self::from_connection(conn, &settings.path))
        } else {
            let path = Path::new(&settings.path);
            let conn = open::open_file(path, busy_timeout)?;
            Ok(Self::from_connection(conn, &settings.path))
        }
    }

    pub fn open_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let settings = DatabaseSettings {
            path: path.to_string_lossy().into_owned(),
            ..DatabaseSettings::default()
        };
        Self::open(&settings)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open(&DatabaseSettings::in_memory())
    }

    fn from_connection(conn: Connection, location: &str) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            location: Arc::from(location),
        }
    }

    /// Where the data lives, as configured.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Scoped access to the connection; the guard releases it on every exit path.
    fn session(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn apply_migrations(&self, migrations: &[(String, Migration)]) -> StoreResult<usize> {
        let mut conn = self.session()?;
        migrations::apply_migrations(&mut conn, migrations)
    }

    pub fn applied_migrations(&self) -> StoreResult<Vec<(String, String)>> {
        let conn = self.session()?;
        migrations::applied_migrations(&conn)
    }

    /// Round-trip a trivial query to prove the connection is usable.
    pub fn ping(&self) -> StoreResult<()> {
        let conn = self.session()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    pub fn count<R: Record>(&self) -> StoreResult<usize> {
        let conn = self.session()?;
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", R::KIND), [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    pub fn optimize(&self) -> StoreResult<()> {
        let conn = self.session()?;
        conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}

impl RecordStore for SqliteStore {
    fn get<R: Record>(&self, id: &str) -> StoreResult<Option<R>> {
        let conn = self.session()?;
        let mut stmt = conn.prepare_cached(&format!(
            "{} WHERE {} = ?1",
            select_sql::<R>(),
            id_column::<R>()
        ))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(R::from_row(row)?));
        }

        Ok(None)
    }

    fn put<R: Record>(&self, record: &R) -> StoreResult<()> {
        record
            .validate()
            .map_err(|reason| StoreError::InvalidRecord {
                kind: R::KIND,
                reason,
            })?;

        let conn = self.session()?;
        let mut stmt = conn.prepare_cached(&upsert_sql::<R>())?;
        stmt.execute(params_from_iter(record.values()))?;

        tracing::debug!(target: "libris-db", kind = R::KIND, id = record.id(), "record stored");
        Ok(())
    }

    fn delete_all<R: Record>(&self) -> StoreResult<usize> {
        let conn = self.session()?;
        let deleted = conn.execute(&format!("DELETE FROM {}", R::KIND), [])?;

        tracing::info!(target: "libris-db", kind = R::KIND, deleted, "records deleted");
        Ok(deleted)
    }

    fn scan<R: Record>(&self, predicate: &Predicate) -> StoreResult<Vec<R>> {
        let (where_clause, values) = predicate.to_sql();
        let sql = format!("{}{} ORDER BY rowid", select_sql::<R>(), where_clause);

        let conn = self.session()?;
        let mut stmt = conn.prepare_cached(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values), |row| R::from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            target: "libris-db",
            kind = R::KIND,
            conditions = predicate.conditions().len(),
            matched = records.len(),
            "scan complete"
        );
        Ok(records)
    }
}
