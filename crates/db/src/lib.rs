//! SQLite-backed record store for the catalog service.
//!
//! Records are keyed by a caller-supplied string id. The store offers four
//! operations: exact lookup, full-overwrite upsert, delete-all, and a
//! predicate scan. Module migrations are tracked per `(module, id)`.

pub mod error;
pub mod migrations;
pub mod module;
mod open;
pub mod predicate;
pub mod record;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use rusqlite;
pub use module::DbModule;
pub use predicate::{Condition, Predicate};
pub use record::Record;
pub use store::{RecordStore, SqliteStore};
