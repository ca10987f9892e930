//! WebSocket handlers

pub mod pixels;
