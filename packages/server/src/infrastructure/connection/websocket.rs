//! axum WebSocket を使った Connection 実装
//!
//! WebSocket の生成（upgrade）は UI 層で行われます。
//! この実装は split された送信側・受信側を受け取り、Session が扱う
//! `FrameSink` / `Frame` ストリームに変換します。

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::ws::{Message, WebSocket},
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, Stream, StreamExt},
};

use crate::domain::{Frame, FrameSink, TransportError};

/// `FrameSink` backed by the write half of an axum WebSocket.
pub struct WebSocketFrameSink {
    sender: SplitSink<WebSocket, Message>,
}

impl WebSocketFrameSink {
    pub fn new(sender: SplitSink<WebSocket, Message>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl FrameSink for WebSocketFrameSink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.sender
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn ping(&mut self) -> Result<(), TransportError> {
        self.sender
            .send(Message::Ping(Bytes::new()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sender
            .close()
            .await
            .map_err(|e| TransportError::CloseFailed(e.to_string()))
    }
}

/// Map the read half of an axum WebSocket to relay frames.
pub fn frame_stream(
    receiver: SplitStream<WebSocket>,
) -> impl Stream<Item = Frame> + Send + Unpin + 'static {
    receiver.map(into_frame)
}

fn into_frame(message: Result<Message, axum::Error>) -> Frame {
    match message {
        Ok(Message::Text(text)) => Frame::Text(text.to_string()),
        Ok(Message::Pong(_)) => Frame::Pong,
        Ok(Message::Close(_)) => Frame::Close,
        // Pings are answered by axum itself.
        Ok(Message::Ping(_)) | Ok(Message::Binary(_)) => Frame::Other,
        Err(e) => Frame::Error(e.to_string()),
    }
}
