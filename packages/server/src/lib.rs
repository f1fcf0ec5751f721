//! Single-room broadcast relay over WebSocket.
//!
//! Every text message sent by one connected client is delivered to all
//! other connected clients. The crate is split into layers the same way
//! the rest of the workspace is:
//!
//! - `domain`: value objects, the connection abstraction and domain errors
//! - `relay`: the outbound queue, the per-connection session and the room
//! - `infrastructure`: wire DTOs and the axum WebSocket adapter
//! - `ui`: the HTTP/WebSocket server shell

// layers
pub mod domain;
pub mod infrastructure;
pub mod relay;
pub mod ui;
