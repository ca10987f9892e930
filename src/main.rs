//! Pixelwall Relay Server - Entry Point
//!
//! Starts the relay server with graceful shutdown support.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod models;
mod relay;

use api::RelayServer;
use config::Config;
use error::RelayError;
use relay::ConnectionRegistry;

#[tokio::main]
async fn main() -> error::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "pixelwall={},tower_http=info",
            config.log.level
        ))
    });
    if config.log.format == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!("Starting Pixelwall Relay Server");

    // The registry is the only shared state: every connection task
    // and every broadcast goes through it.
    let registry = Arc::new(ConnectionRegistry::new());

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let server = RelayServer::new(config.server.clone(), registry);
    let mut server_task = tokio::spawn(async move { server.run(shutdown_rx).await });

    info!("Relay server starting on {}", config.listen_addr());

    tokio::select! {
        res = &mut server_task => {
            // Startup failures (asset mount, bind) land here and are
            // fatal to the process.
            match res {
                Ok(run_result) => run_result?,
                Err(e) => {
                    error!("Relay server task failed: {}", e);
                    return Err(RelayError::Internal(e.to_string()));
                }
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
            // Open WebSocket connections would hold a graceful drain
            // forever; give the accept loop a moment and then exit.
            let _ = tokio::time::timeout(Duration::from_secs(1), server_task).await;
        }
    }

    info!("Pixelwall Relay Server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
