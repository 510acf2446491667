use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use bird_storage::StorageError;

/// Whether internal error detail is shown in responses or censored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposeInternalErrors {
    Expose,
    Censor,
}

/// JSON body carried by every service-produced error response.
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub details: Value,
}

/// An error already shaped for the HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    /// Maps a storage failure onto the HTTP error contract, censoring SQLite
    /// detail unless the server was started with `--expose-internal-errors`.
    pub fn from_storage(error: StorageError, expose: ExposeInternalErrors) -> Self {
        match error {
            StorageError::NoRows => Self {
                status: StatusCode::NOT_FOUND,
                body: ErrorResponse {
                    message: "no rows matched the query".into(),
                    details: Value::Null,
                },
            },
            StorageError::DomainUnavailable { domain, path } => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: ErrorResponse {
                    message: format!("domain {domain} is not available"),
                    details: match expose {
                        ExposeInternalErrors::Expose => {
                            serde_json::json!({ "expected_file": path.display().to_string() })
                        }
                        ExposeInternalErrors::Censor => Value::Null,
                    },
                },
            },
            error @ (StorageError::Sqlite(_) | StorageError::ExecutionTask) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: ErrorResponse {
                    message: match expose {
                        ExposeInternalErrors::Expose => error.to_string(),
                        ExposeInternalErrors::Censor => "internal error".into(),
                    },
                    details: Value::Null,
                },
            },
        }
    }

    /// A comma-separated list parameter held an element that does not parse.
    pub fn invalid_parameter(name: &'static str, value: &str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorResponse {
                message: format!("invalid value for parameter {name}"),
                details: serde_json::json!({ "parameter": name, "value": value }),
            },
        }
    }

    /// A list parameter was empty after trimming.
    pub fn empty_parameter(name: &'static str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorResponse {
                message: format!("parameter {name} must contain at least one value"),
                details: serde_json::json!({ "parameter": name }),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sqlite_errors_are_censored_by_default() {
        let error = StorageError::Sqlite(rusqlite::Error::InvalidQuery);
        let api_error = ApiError::from_storage(error, ExposeInternalErrors::Censor);
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.body.message, "internal error");
    }

    #[test]
    fn sqlite_errors_surface_when_exposed() {
        let error = StorageError::Sqlite(rusqlite::Error::InvalidQuery);
        let api_error = ApiError::from_storage(error, ExposeInternalErrors::Expose);
        assert!(api_error.body.message.contains("sqlite error"));
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let api_error =
            ApiError::from_storage(StorageError::NoRows, ExposeInternalErrors::Censor);
        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
    }
}
