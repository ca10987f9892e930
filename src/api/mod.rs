//! Relay server implementation
//!
//! Provides the WebSocket relay endpoint, health endpoints, and the
//! static asset bundle.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod websocket;

pub use server::RelayServer;
