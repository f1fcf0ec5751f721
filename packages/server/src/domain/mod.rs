//! Domain layer: value objects and the interfaces the relay depends on.

mod connection;
mod display_name;
mod error;
mod message;

#[cfg(test)]
pub use connection::MockFrameSink;
pub use connection::{Frame, FrameSink};
pub use display_name::{DisplayName, DisplayNameFactory};
pub use error::{ProtocolError, RoomError, TransportError};
pub use message::{Author, ChatMessage, SYSTEM_AUTHOR};
