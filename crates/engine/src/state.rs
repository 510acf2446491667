use std::path::Path;
use std::sync::Arc;

use bird_domains::ExposeInternalErrors;
use bird_storage::DomainCatalog;

use crate::{EngineState, StartupError};

/// Opens the benchmark databases and assembles the shared request state.
pub fn build_state(
    db_dir: &Path,
    read_connections: usize,
    expose_internal_errors: ExposeInternalErrors,
) -> Result<EngineState, StartupError> {
    if !db_dir.is_dir() {
        return Err(StartupError::DataDirectory(db_dir.to_path_buf()));
    }
    let catalog = DomainCatalog::open(db_dir, read_connections);
    Ok(EngineState {
        catalog: Arc::new(catalog),
        expose_internal_errors,
    })
}
