//! Relay server using Axum
//!
//! Serves the prebuilt wall UI and the WebSocket relay endpoint.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::config::ServerConfig;
use crate::error::{RelayError, Result};
use crate::relay::ConnectionRegistry;

use super::middleware::cors_layer;
use super::routes;

/// Shared state for handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
    pub started_at: Instant,
}

/// Relay server
pub struct RelayServer {
    config: ServerConfig,
    state: AppState,
}

impl RelayServer {
    /// Create a new relay server
    pub fn new(config: ServerConfig, registry: Arc<ConnectionRegistry>) -> Self {
        let state = AppState {
            registry,
            started_at: Instant::now(),
        };

        Self { config, state }
    }

    /// Build the router
    fn build_router(&self) -> Router {
        routes::create_router(self.state.clone(), &self.config.static_dir)
            .layer(cors_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the relay server
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        // The asset bundle must be mountable before we accept anyone.
        if !Path::new(&self.config.static_dir).is_dir() {
            return Err(RelayError::StaticAssets(self.config.static_dir.clone()));
        }

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                RelayError::InvalidConfig(format!(
                    "Invalid listen address {}:{}",
                    self.config.host, self.config.port
                ))
            })?;

        let router = self.build_router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| RelayError::Bind {
                addr: addr.to_string(),
                source: e,
            })?;

        info!("Relay server listening on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await
            .map_err(|e| RelayError::Internal(e.to_string()))?;

        info!("Relay server shut down");
        Ok(())
    }
}
