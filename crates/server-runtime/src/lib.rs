//! # CIPA Vote Server Runtime
//!
//! Composition root for the election service.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `CIPA_*` environment variables
//! 2. Open the election store (snapshot-backed when a data dir is set)
//! 3. Wire the authorization core over the store (ports + adapters)
//! 4. Serve the gateway until a shutdown signal arrives

pub mod config;

use api_gateway::AppState;
use config::ServerConfig;
use election_store::{ElectionStore, StoreError};
use std::fs;
use std::sync::Arc;
use tracing::info;

/// Opens the store named by the configuration and wires the application
/// state over it.
///
/// # Errors
///
/// Fails if the data directory cannot be created or the snapshot file is
/// unreadable or corrupted.
pub fn build_state(config: &ServerConfig) -> Result<AppState, StoreError> {
    let store = match config.snapshot_path() {
        Some(path) => {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)
                    .map_err(|e| StoreError::Io(format!("create {}: {e}", dir.display())))?;
            }
            info!(path = %path.display(), "Opening snapshot-backed election store");
            Arc::new(ElectionStore::open(path)?)
        }
        None => {
            info!("Using in-memory election store (no CIPA_DATA_DIR set)");
            Arc::new(ElectionStore::in_memory())
        }
    };
    Ok(AppState::new(store))
}
