//! Domain error types.

use thiserror::Error;

/// Room membership bookkeeping errors.
///
/// Each session joins exactly once and leaves exactly once, so either of
/// these indicates a bug in the caller rather than a client condition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("Session '{0}' is already a member of the room")]
    AlreadyJoined(String),

    #[error("Session '{0}' is not a member of the room")]
    NotJoined(String),
}

/// Connection-level failures. Fatal to the session that hits them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Failed to send frame: {0}")]
    SendFailed(String),

    #[error("Failed to close connection: {0}")]
    CloseFailed(String),
}

/// Errors decoding frames from, or encoding messages for, the wire.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Message frame has no 'message' field")]
    MissingBody,

    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}
