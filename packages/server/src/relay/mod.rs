//! Relay core: per-connection sessions fanning messages out through a
//! shared room.
//!
//! ```text
//! connection ─▶ inbound pump ─▶ Room::broadcast ─▶ OutboundQueue (per member)
//!                                                        │
//! connection ◀──────────────── outbound pump ◀───────────┘
//! ```

mod outbound_queue;
mod room;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use outbound_queue::{DEFAULT_QUEUE_CAPACITY, OutboundQueue, QueueFull};
pub use room::Room;
pub use session::{
    CloseReason, DEFAULT_CLOSE_TIMEOUT, DEFAULT_HEARTBEAT_INTERVAL, Session, SessionConfig,
    SessionState,
};
