//! Router modules for the BIRD benchmark domains.
//!
//! One module per benchmark database; every handler maps URL plus query
//! parameters onto exactly one predetermined SQL statement and returns the
//! resulting rows as JSON.

pub mod codebase_community;
pub mod error;
pub mod financial;
pub mod formula_1;
pub mod params;
mod state;
pub mod student_club;
pub mod superhero;

use axum::Router;

pub use error::{ApiError, ErrorResponse, ExposeInternalErrors};
pub use state::AppState;

/// Mounts every domain router under `/v1/bird/<domain>`.
pub fn bird_router(state: AppState) -> Router {
    Router::new()
        .nest("/v1/bird/codebase_community", codebase_community::router())
        .nest("/v1/bird/financial", financial::router())
        .nest("/v1/bird/formula_1", formula_1::router())
        .nest("/v1/bird/student_club", student_club::router())
        .nest("/v1/bird/superhero", superhero::router())
        .with_state(state)
}
