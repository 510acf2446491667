use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::rows::query_rows;
use crate::{Domain, ReadPool, SqlParam, StorageError};

/// The set of benchmark databases this process serves.
///
/// Opened once at startup from a directory of `<domain>.sqlite` files. A
/// missing or unreadable file leaves that domain unavailable rather than
/// failing startup; requests against it answer with
/// [`StorageError::DomainUnavailable`].
#[derive(Clone)] // Cheap to clone, the pools live behind an `Arc`
pub struct DomainCatalog {
    pools: Arc<HashMap<Domain, ReadPool>>,
    db_dir: PathBuf,
}

impl DomainCatalog {
    pub fn open(db_dir: &Path, read_connections: usize) -> Self {
        let mut pools = HashMap::new();
        for domain in Domain::ALL {
            let path = db_dir.join(domain.file_name());
            if !path.is_file() {
                warn!(%domain, path = %path.display(), "domain database file not found");
                continue;
            }
            match ReadPool::open(&path, read_connections) {
                Ok(pool) => {
                    info!(%domain, path = %path.display(), "opened domain database");
                    pools.insert(domain, pool);
                }
                Err(error) => {
                    warn!(%domain, %error, "could not open domain database");
                }
            }
        }
        Self {
            pools: Arc::new(pools),
            db_dir: db_dir.to_path_buf(),
        }
    }

    pub fn is_available(&self, domain: Domain) -> bool {
        self.pools.contains_key(&domain)
    }

    fn pool(&self, domain: Domain) -> Result<&ReadPool, StorageError> {
        self.pools
            .get(&domain)
            .ok_or_else(|| StorageError::DomainUnavailable {
                domain,
                path: self.db_dir.join(domain.file_name()),
            })
    }

    /// Runs one read-only query and returns every row.
    pub async fn fetch_all(
        &self,
        domain: Domain,
        sql: impl Into<String>,
        params: Vec<SqlParam>,
    ) -> Result<Vec<Value>, StorageError> {
        let catalog = self.clone();
        let sql = sql.into();
        tokio::task::spawn_blocking(move || {
            let pool = catalog.pool(domain)?;
            pool.with(|connection| query_rows(connection, &sql, &params))
        })
        .await
        .map_err(|_| StorageError::ExecutionTask)?
    }

    /// Runs one read-only query and returns the first row, or
    /// [`StorageError::NoRows`] when the query matched nothing.
    pub async fn fetch_one(
        &self,
        domain: Domain,
        sql: impl Into<String>,
        params: Vec<SqlParam>,
    ) -> Result<Value, StorageError> {
        self.fetch_all(domain, sql, params)
            .await?
            .into_iter()
            .next()
            .ok_or(StorageError::NoRows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rusqlite::Connection;
    use serde_json::json;

    fn catalog_with_superhero(dir: &tempfile::TempDir) -> Arc<DomainCatalog> {
        let connection = Connection::open(dir.path().join("superhero.sqlite")).unwrap();
        connection
            .execute_batch(
                "CREATE TABLE superhero (id INTEGER PRIMARY KEY, superhero_name TEXT);
                 INSERT INTO superhero VALUES (1, 'A-Bomb'), (2, 'Abraxas');",
            )
            .unwrap();
        drop(connection);
        Arc::new(DomainCatalog::open(dir.path(), 2))
    }

    #[tokio::test]
    async fn fetch_all_returns_rows_for_open_domains() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog_with_superhero(&dir);
        assert!(catalog.is_available(Domain::Superhero));
        let rows = catalog
            .fetch_all(
                Domain::Superhero,
                "SELECT superhero_name FROM superhero ORDER BY id",
                vec![],
            )
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![
                json!({"superhero_name": "A-Bomb"}),
                json!({"superhero_name": "Abraxas"})
            ]
        );
    }

    #[tokio::test]
    async fn fetch_one_reports_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog_with_superhero(&dir);
        let result = catalog
            .fetch_one(
                Domain::Superhero,
                "SELECT id FROM superhero WHERE superhero_name = ?1",
                vec![SqlParam::Text("Zzz".into())],
            )
            .await;
        assert!(matches!(result, Err(StorageError::NoRows)));
    }

    #[tokio::test]
    async fn absent_domains_stay_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog_with_superhero(&dir);
        assert!(!catalog.is_available(Domain::Financial));
        let result = catalog
            .fetch_all(Domain::Financial, "SELECT 1", vec![])
            .await;
        assert!(matches!(
            result,
            Err(StorageError::DomainUnavailable {
                domain: Domain::Financial,
                ..
            })
        ));
    }
}
