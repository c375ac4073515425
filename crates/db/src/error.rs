use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record failed its shape checks and was not written.
    #[error("invalid {kind} record: {reason}")]
    InvalidRecord { kind: &'static str, reason: String },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A previous holder of the connection panicked mid-operation.
    #[error("database connection lock poisoned")]
    Poisoned,

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    /// True for I/O, connection and engine failures, as opposed to rejected input.
    pub fn is_storage_failure(&self) -> bool {
        !matches!(self, StoreError::InvalidRecord { .. })
    }
}
