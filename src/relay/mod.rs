//! The broadcast relay core: connection registry and fan-out.

pub mod registry;

pub use registry::{ConnectionId, ConnectionRegistry, ConnectionSender};
