use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use rusqlite::{Connection, OpenFlags};

use crate::StorageError;

/// Fixed-size pool of read-only connections to one database file.
///
/// Connections are handed out under a mutex with round-robin selection, so no
/// two requests ever interleave statements on the same connection.
pub struct ReadPool {
    connections: Vec<Mutex<Connection>>,
    cursor: AtomicUsize,
}

impl ReadPool {
    /// Opens `size` read-only connections to the database at `path`.
    pub fn open(path: &Path, size: usize) -> Result<Self, StorageError> {
        let size = size.max(1);
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
            connections.push(Mutex::new(connection));
        }
        Ok(Self {
            connections,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Returns the next connection using round-robin selection.
    fn connection(&self) -> &Mutex<Connection> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        &self.connections[index]
    }

    /// Runs `f` with exclusive use of one pooled connection.
    pub fn with<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        // The connections are read-only, so a poisoned lock cannot have left
        // database state behind.
        let guard = self
            .connection()
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture_db(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("fixture.sqlite");
        let connection = Connection::open(&path).unwrap();
        connection
            .execute_batch(
                "CREATE TABLE t (id INTEGER PRIMARY KEY, label TEXT);
                 INSERT INTO t (id, label) VALUES (1, 'one'), (2, 'two');",
            )
            .unwrap();
        path
    }

    #[test]
    fn round_robin_cycles_through_all_connections() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ReadPool::open(&fixture_db(&dir), 3).unwrap();
        let first = pool.connection() as *const _;
        let second = pool.connection() as *const _;
        let third = pool.connection() as *const _;
        let fourth = pool.connection() as *const _;
        assert!(first != second && second != third && first != third);
        assert_eq!(first, fourth);
    }

    #[test]
    fn pool_size_is_at_least_one() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ReadPool::open(&fixture_db(&dir), 0).unwrap();
        assert_eq!(pool.connections.len(), 1);
    }

    #[test]
    fn connections_reject_writes() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ReadPool::open(&fixture_db(&dir), 1).unwrap();
        let result = pool.with(|connection| {
            connection
                .execute("INSERT INTO t (id, label) VALUES (3, 'three')", [])
                .map_err(StorageError::from)
        });
        assert!(matches!(result, Err(StorageError::Sqlite(_))));
    }

    #[test]
    fn open_fails_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ReadPool::open(&dir.path().join("absent.sqlite"), 1).is_err());
    }
}
