use std::sync::Arc;

use axum::Json;
use serde_json::Value;

use bird_storage::{Domain, DomainCatalog, SqlParam};

use crate::error::{ApiError, ExposeInternalErrors};

/// Shared request state for every domain router.
#[derive(Clone)] // Cheap to clone, the catalog is behind an `Arc`
pub struct AppState {
    pub catalog: Arc<DomainCatalog>,
    pub expose_internal_errors: ExposeInternalErrors,
}

impl AppState {
    /// Runs one query and answers with the full row set as a JSON array.
    pub async fn rows(
        &self,
        domain: Domain,
        sql: impl Into<String>,
        params: Vec<SqlParam>,
    ) -> Result<Json<Value>, ApiError> {
        let sql = sql.into();
        tracing::debug!(%domain, sql, "executing query");
        self.catalog
            .fetch_all(domain, sql, params)
            .await
            .map(|rows| Json(Value::Array(rows)))
            .map_err(|error| ApiError::from_storage(error, self.expose_internal_errors))
    }

    /// Runs one query expected to match a single row; answers 404 when it
    /// matches nothing.
    pub async fn row(
        &self,
        domain: Domain,
        sql: impl Into<String>,
        params: Vec<SqlParam>,
    ) -> Result<Json<Value>, ApiError> {
        let sql = sql.into();
        tracing::debug!(%domain, sql, "executing query");
        self.catalog
            .fetch_one(domain, sql, params)
            .await
            .map(Json)
            .map_err(|error| ApiError::from_storage(error, self.expose_internal_errors))
    }
}
