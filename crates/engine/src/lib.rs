mod cors;
mod routes;
mod state;
mod types;

pub use cors::build_cors_layer;
pub use routes::EngineRouter;
pub use state::build_state;
pub use types::{EngineState, StartupError};

/// The version of the engine release.
pub static VERSION: &str = env!("CARGO_PKG_VERSION");
