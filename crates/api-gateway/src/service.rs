//! Gateway service: router assembly, bind and serve.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::{rest, ws};
use axum::routing::get;
use axum::Router;
use election_store::ElectionStore;
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use vote_authorization::{adapt, AuthorizationManager, ChannelRegistry};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Durable record store (CRUD surface).
    pub store: Arc<ElectionStore>,
    /// Authorization core (permits, votes, observer registry).
    pub manager: Arc<AuthorizationManager>,
}

impl AppState {
    /// Wires the authorization core over a store and bundles both.
    #[must_use]
    pub fn new(store: Arc<ElectionStore>) -> Self {
        let (permits, directory) = adapt(&store);
        let manager = Arc::new(AuthorizationManager::new(
            permits,
            directory,
            Arc::new(ChannelRegistry::new()),
        ));
        Self { store, manager }
    }
}

/// The gateway HTTP/WebSocket service.
pub struct GatewayService {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayService {
    /// Creates a service over validated configuration.
    ///
    /// # Errors
    /// - `GatewayError::Config` for an unusable listen address
    pub fn new(config: GatewayConfig, state: AppState) -> Result<Self, GatewayError> {
        config.bind_addr()?;
        Ok(Self { config, state })
    }

    /// Builds the full route table for a state (REST under `/api`, observer
    /// sockets under `/ws`).
    #[must_use]
    pub fn router_for(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .nest("/api", rest::routes())
            .route("/ws/sessions/:session_id/booth", get(ws::booth_ws))
            .route("/ws/sessions/:session_id/station", get(ws::station_ws))
            .layer(TraceLayer::new_for_http());

        if config.permissive_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        router.with_state(state)
    }

    /// Binds the listener and serves until the shutdown future resolves.
    ///
    /// # Errors
    /// - `GatewayError::Bind` if the listen socket cannot be bound
    /// - `GatewayError::Serve` if the server loop fails
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), GatewayError> {
        let addr = self.config.bind_addr()?;
        let router = Self::router_for(&self.config, self.state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(e.to_string()))?;
        info!(addr = %addr, "Gateway listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Serve(e.to_string()))
    }
}
