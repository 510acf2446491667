use std::path::PathBuf;

/// Shared request state; the domain routers and the base routes use the same
/// one.
pub type EngineState = bird_domains::AppState;

#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error("data directory {0} does not exist or is not a directory")]
    DataDirectory(PathBuf),
}
