use std::path::PathBuf;

use crate::Domain;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The domain's database file was absent or unreadable at startup.
    #[error("no open database for domain {domain} (expected {path})")]
    DomainUnavailable { domain: Domain, path: PathBuf },

    /// A single-row query matched nothing.
    #[error("query returned no rows")]
    NoRows,

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The blocking query task was cancelled or panicked.
    #[error("query execution task failed")]
    ExecutionTask,
}
