//! Connection trait 定義
//!
//! Session が必要とする双方向チャネルのインターフェースを定義します。
//! 具体的な実装（axum の WebSocket）は Infrastructure 層が提供します（依存性の逆転）。
//!
//! - 受信側: `Frame` を流す任意の `Stream`
//! - 送信側: `FrameSink` trait

use async_trait::async_trait;

use super::TransportError;

/// A frame read from a client connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A text data frame.
    Text(String),
    /// Reply to a keep-alive ping.
    Pong,
    /// The peer closed the connection cleanly.
    Close,
    /// The transport reported an error; the connection is unusable.
    Error(String),
    /// Anything the relay does not act on (binary data, pings).
    Other,
}

/// Write half of a client connection.
///
/// Owned by exactly one writer (the session's outbound pump).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameSink: Send {
    /// Send a single text frame.
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Send a keep-alive ping.
    async fn ping(&mut self) -> Result<(), TransportError>;

    /// Close the connection.
    async fn close(&mut self) -> Result<(), TransportError>;
}
