//! Route definitions

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;

use super::handlers;
use super::server::AppState;
use super::websocket;

/// Create the router with all routes
///
/// Anything that is not a known endpoint falls through to the static
/// asset bundle; paths with no matching file get ServeDir's default
/// 404.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        .route("/api/status", get(handlers::health::status))
        // WebSocket relay endpoint
        .route("/ws", get(websocket::pixels::pixels_ws))
        // Prebuilt wall UI
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}
