//! Connection bootstrap for SQLite.

use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::StoreResult;

pub(crate) fn open_file(path: &Path, busy_timeout: Duration) -> StoreResult<Connection> {
    let started_at = Instant::now();
    tracing::info!(target: "libris-db", path = %path.display(), "opening database file");

    let conn = Connection::open(path).map_err(|err| {
        tracing::error!(
            target: "libris-db",
            path = %path.display(),
            duration_ms = started_at.elapsed().as_millis() as u64,
            error = %err,
            "failed to open database file"
        );
        err
    })?;
    bootstrap(&conn, busy_timeout)?;

    tracing::info!(
        target: "libris-db",
        path = %path.display(),
        duration_ms = started_at.elapsed().as_millis() as u64,
        "database file ready"
    );
    Ok(conn)
}

pub(crate) fn open_memory(busy_timeout: Duration) -> StoreResult<Connection> {
    tracing::info!(target: "libris-db", "opening in-memory database");
    let conn = Connection::open_in_memory()?;
    bootstrap(&conn, busy_timeout)?;
    Ok(conn)
}

fn bootstrap(conn: &Connection, busy_timeout: Duration) -> StoreResult<()> {
    conn.busy_timeout(busy_timeout)?;
    // Journal mode is reported back as a row, so it cannot go through execute_batch.
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    Ok(())
}
