//! Data Transfer Objects (DTOs) for the relay.
//!
//! - `websocket`: frames exchanged with clients over WebSocket
//! - `http`: HTTP API response DTOs
//! - `conversion`: domain model to DTO conversions

pub mod conversion;
pub mod http;
pub mod websocket;
