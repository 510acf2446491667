//! Read-only SQLite access for the BIRD benchmark databases.
//!
//! Each benchmark domain is one fixed `.sqlite` file opened read-only behind
//! a small connection pool. Queries execute on the blocking thread pool and
//! come back as JSON rows keyed by column name.

mod catalog;
mod domain;
mod error;
mod pool;
mod rows;

pub use catalog::DomainCatalog;
pub use domain::Domain;
pub use error::StorageError;
pub use pool::ReadPool;
pub use rows::query_rows;

/// Owned SQL parameter value, bindable across threads.
pub use rusqlite::types::Value as SqlParam;
