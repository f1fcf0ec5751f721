//! Infrastructure layer: wire format and transport adapters.

pub mod connection;
pub mod dto;
