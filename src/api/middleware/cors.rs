//! CORS middleware configuration
//!
//! The relay performs no origin checks: the wall UI may be loaded
//! from anywhere and still reach the server.

use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// Create a CORS layer that accepts any origin
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any)
}
