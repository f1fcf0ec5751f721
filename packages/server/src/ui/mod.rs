//! HTTP/WebSocket server shell.
//!
//! Accepts connections, names them and hands each one to a relay session.

mod handler;
mod server;
mod signal;
pub mod state;
pub mod status;

pub use server::{DEFAULT_PORT, Server, ServerConfig};
pub use signal::shutdown_signal;
