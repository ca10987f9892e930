//! Connection registry and broadcast fan-out.
//!
//! The registry is the only shared mutable state in the relay. A
//! single mutex serializes every complete operation on the connection
//! set, so broadcasts and (de)registrations never interleave.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::Message;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::models::PixelUpdate;

/// Identifier for one registered connection
pub type ConnectionId = u64;

/// Sender half of a connection's writer channel. The receiver half is
/// drained by that connection's writer task; a failed send means the
/// task is gone and the connection is dead.
pub type ConnectionSender = mpsc::UnboundedSender<Message>;

/// Registry of live WebSocket connections.
///
/// A connection appears here iff it has been registered and not yet
/// deregistered. The receive loop deregisters its own connection on
/// exit; `broadcast` removes any connection whose write fails.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    connections: Mutex<HashMap<ConnectionId, ConnectionSender>>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new connection, returning its id
    pub fn register(&self, sender: ConnectionSender) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.connections.lock().insert(id, sender);
        debug!(conn_id = id, "Connection registered");
        id
    }

    /// Remove a connection. Idempotent: removing an id that is already
    /// gone is a no-op and returns false.
    pub fn deregister(&self, id: ConnectionId) -> bool {
        let removed = self.connections.lock().remove(&id).is_some();
        if removed {
            debug!(conn_id = id, "Connection deregistered");
        }
        removed
    }

    /// Send one update to every registered connection, the originator
    /// included.
    ///
    /// The full iteration runs under the registry lock as one atomic
    /// operation. Connections whose write fails are collected during
    /// the iteration and pruned after it, still under the same lock;
    /// delivery to the rest is unaffected. Returns the number of live
    /// recipients.
    pub fn broadcast(&self, update: &PixelUpdate) -> usize {
        let payload = match serde_json::to_string(update) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize pixel update: {}", e);
                return 0;
            }
        };

        let mut connections = self.connections.lock();

        let mut dead: Vec<ConnectionId> = Vec::new();
        for (&id, sender) in connections.iter() {
            if sender.send(Message::Text(payload.clone())).is_err() {
                dead.push(id);
            }
        }

        for id in dead {
            warn!(conn_id = id, "Dropping connection after failed write");
            connections.remove(&id);
        }

        connections.len()
    }

    /// Number of registered connections
    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.lock().is_empty()
    }
}
