//! Gateway configuration.

use crate::error::GatewayError;
use std::net::{IpAddr, SocketAddr};

/// HTTP/WebSocket listener configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listen address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Whether to answer cross-origin requests from any origin.
    pub permissive_cors: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            permissive_cors: true,
        }
    }
}

impl GatewayConfig {
    /// Validates the configuration and resolves the bind address.
    ///
    /// # Errors
    /// - `GatewayError::Config` if the host is not a literal IP address or
    ///   the port is zero
    pub fn bind_addr(&self) -> Result<SocketAddr, GatewayError> {
        if self.port == 0 {
            return Err(GatewayError::Config("port must not be 0".to_string()));
        }
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| GatewayError::Config(format!("invalid listen host: {}", self.host)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
