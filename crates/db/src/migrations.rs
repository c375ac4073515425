//! Module migration executor.
//!
//! Applied migrations are recorded in `schema_migrations` keyed by
//! `(module, id)`; pending ones run inside a single transaction.

use libris_kernel::Migration;
use rusqlite::{params, Connection};

use crate::error::{StoreError, StoreResult};

const LEDGER_SQL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    module TEXT NOT NULL,
    id TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    PRIMARY KEY (module, id)
);";

/// Apply every migration not yet recorded. Returns how many ran.
pub fn apply_migrations(
    conn: &mut Connection,
    migrations: &[(String, Migration)],
) -> StoreResult<usize> {
    conn.execute_batch(LEDGER_SQL)?;

    let tx = conn.transaction()?;
    let mut applied = 0;

    for (module, migration) in migrations {
        let already_applied: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE module = ?1 AND id = ?2)",
            params![module, migration.id],
            |row| row.get(0),
        )?;
        if already_applied {
            continue;
        }

        tracing::info!(
            target: "libris-db",
            module = %module,
            migration = migration.id,
            "applying migration"
        );
        tx.execute_batch(migration.up)
            .map_err(|source| StoreError::Migration {
                module: module.clone(),
                id: migration.id.to_string(),
                source,
            })?;
        tx.execute(
            "INSERT INTO schema_migrations (module, id) VALUES (?1, ?2)",
            params![module, migration.id],
        )?;
        applied += 1;
    }

    tx.commit()?;
    Ok(applied)
}

/// List applied migrations as `(module, id)` in application order.
pub fn applied_migrations(conn: &Connection) -> StoreResult<Vec<(String, String)>> {
    conn.execute_batch(LEDGER_SQL)?;
    let mut stmt = conn.prepare("SELECT module, id FROM schema_migrations ORDER BY rowid")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
