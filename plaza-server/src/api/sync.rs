//! Realtime sync WebSocket
//!
//! Clients connect to `/api/sync/ws` and receive every bus message as JSON:
//! resource sync signals for cache invalidation plus targeted
//! notifications (clients filter on `target`). The stream is best-effort:
//! a lagging client misses messages and is expected to resync using the
//! version numbers in the sync payloads.

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
    routing::get,
};
use tokio::sync::broadcast::error::RecvError;

use crate::core::AppState;

/// GET /api/sync/ws
async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut rx = state.broadcast.subscribe();
    tracing::debug!("Sync WebSocket connected");

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Ok(bus_msg) => {
                    let Ok(text) = serde_json::to_string(&bus_msg) else {
                        continue;
                    };
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Sync WebSocket lagged, client must resync");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                // Inbound frames are ignored; the socket is one-way
                Some(Ok(_)) => continue,
                _ => break,
            },
        }
    }

    tracing::debug!("Sync WebSocket disconnected");
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/sync/ws", get(ws_upgrade))
}
