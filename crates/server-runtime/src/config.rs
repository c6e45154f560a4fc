//! # Server Configuration
//!
//! Unified configuration for the gateway and storage, overridable from
//! `CIPA_*` environment variables:
//!
//! | Variable | Effect | Default |
//! |----------|--------|---------|
//! | `CIPA_HTTP_HOST` | gateway listen host | `0.0.0.0` |
//! | `CIPA_HTTP_PORT` | gateway listen port | `8000` |
//! | `CIPA_DATA_DIR`  | snapshot directory; unset = in-memory store | unset |

use api_gateway::GatewayConfig;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Snapshot file name inside the data directory.
const SNAPSHOT_FILE: &str = "election.dat";

/// Complete server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Gateway (HTTP/WebSocket) configuration.
    pub gateway: GatewayConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Directory for the store snapshot; `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `CIPA_HTTP_PORT` did not parse as a port number.
    #[error("CIPA_HTTP_PORT is not a valid port: {0}")]
    InvalidPort(String),
}

impl ServerConfig {
    /// Builds a configuration from defaults plus environment overrides.
    ///
    /// # Errors
    /// - `ConfigError::InvalidPort` for an unparsable `CIPA_HTTP_PORT`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(host) = env::var("CIPA_HTTP_HOST") {
            config.gateway.host = host;
        }
        if let Ok(port) = env::var("CIPA_HTTP_PORT") {
            config.gateway.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Ok(dir) = env::var("CIPA_DATA_DIR") {
            config.storage.data_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Full path of the snapshot file, if a data directory is configured.
    #[must_use]
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.storage
            .data_dir
            .as_ref()
            .map(|dir| dir.join(SNAPSHOT_FILE))
    }
}
