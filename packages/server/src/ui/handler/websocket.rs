//! WebSocket connection handler.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::stream::StreamExt;

use crate::{
    infrastructure::connection::{WebSocketFrameSink, frame_stream},
    relay::Session,
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Name the connection and run a session on it until it finishes.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session = Session::new(state.names.next(), &state.session_config);
    tracing::info!("Client connected as '{}'", session.name());

    let (sender, receiver) = socket.split();
    match session
        .run(
            &state.room,
            frame_stream(receiver),
            WebSocketFrameSink::new(sender),
        )
        .await
    {
        Ok(reason) => {
            tracing::info!("Session '{}' finished: {:?}", session.name(), reason);
        }
        Err(e) => {
            tracing::error!("Session '{}' could not start: {}", session.name(), e);
        }
    }
}
