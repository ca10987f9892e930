//! Pixel relay WebSocket handler
//!
//! One receive loop per connection: decode each inbound frame into a
//! `PixelUpdate` and hand it to the registry for fan-out. Any decode
//! or transport failure is fatal to this connection only; the client
//! must reconnect to rejoin.

use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::server::AppState;
use crate::models::PixelUpdate;
use crate::relay::{ConnectionId, ConnectionRegistry};

/// WebSocket handler for the pixel relay
///
/// A failed handshake registers nothing; the request just fails.
pub async fn pixels_ws(
    State(state): State<AppState>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    match ws {
        Ok(ws) => ws
            .on_upgrade(move |socket| handle_pixels_ws(socket, state.registry.clone()))
            .into_response(),
        Err(rejection) => {
            warn!("WebSocket upgrade failed: {}", rejection);
            rejection.into_response()
        }
    }
}

/// Deregisters the connection when the receive loop exits, whatever
/// the exit path.
struct RegistryGuard {
    registry: Arc<ConnectionRegistry>,
    conn_id: ConnectionId,
}

impl Drop for RegistryGuard {
    fn drop(&mut self) {
        self.registry.deregister(self.conn_id);
    }
}

/// Handle one relay connection for its full lifetime
async fn handle_pixels_ws(socket: WebSocket, registry: Arc<ConnectionRegistry>) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    // Register before the first read so this client sees every update
    // broadcast from now on.
    let conn_id = registry.register(tx);
    let _guard = RegistryGuard {
        registry: registry.clone(),
        conn_id,
    };

    info!(conn_id, "Pixel WebSocket connected");

    // Writer task: owns the sink, drains the registry-facing channel.
    let writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    // Receive loop: one decode, one broadcast, fully sequential.
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if !dispatch(conn_id, text.as_bytes(), &registry) {
                    break;
                }
            }
            Ok(Message::Binary(data)) => {
                if !dispatch(conn_id, &data, &registry) {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                debug!(conn_id, "Pixel WebSocket received close");
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // Pong is handled automatically by axum
            }
            Err(e) => {
                debug!(conn_id, "Pixel WebSocket error: {}", e);
                break;
            }
        }
    }

    writer_handle.abort();

    info!(conn_id, "Pixel WebSocket disconnected");
}

/// Decode one frame and broadcast it. Returns false when the frame is
/// malformed and the connection must close.
fn dispatch(conn_id: ConnectionId, payload: &[u8], registry: &ConnectionRegistry) -> bool {
    match PixelUpdate::decode(payload) {
        Ok(update) => {
            registry.broadcast(&update);
            true
        }
        Err(e) => {
            warn!(conn_id, "Closing connection on malformed update: {}", e);
            false
        }
    }
}

/// Writer task: forwards broadcast frames to the WebSocket sink
async fn writer_task(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            // Connection is broken; the next broadcast prunes us.
            break;
        }
    }
}
