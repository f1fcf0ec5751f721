//! Connection adapters.
//!
//! Implementations of the domain's connection abstraction for concrete
//! transports.

pub mod websocket;

pub use websocket::{WebSocketFrameSink, frame_stream};
