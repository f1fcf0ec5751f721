//! WebSocket message DTOs.
//!
//! Inbound (client to server):
//!
//! ```json
//! {"type": "message", "message": "hi"}
//! ```
//!
//! Outbound (server to every client):
//!
//! ```json
//! {"author": "User#1", "message": "hi"}
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, ProtocolError};

/// `type` value of a chat message frame.
pub const MESSAGE_TYPE: &str = "message";

/// Raw inbound frame. Unknown fields (a claimed `author`, for example) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Message delivered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub author: String,
    pub message: String,
}

/// What a decoded inbound frame asks the relay to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Broadcast this text to the room.
    Message(String),
    /// A frame whose `type` the relay does not understand.
    Unknown(String),
}

/// Decode an inbound text frame.
pub fn decode_inbound(text: &str) -> Result<ClientCommand, ProtocolError> {
    let frame: InboundFrame = serde_json::from_str(text).map_err(ProtocolError::Malformed)?;

    if frame.kind != MESSAGE_TYPE {
        return Ok(ClientCommand::Unknown(frame.kind));
    }

    frame
        .message
        .map(ClientCommand::Message)
        .ok_or(ProtocolError::MissingBody)
}

/// Encode a chat message into its outbound text form.
pub fn encode_outbound(message: &ChatMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(&OutboundMessage::from(message)).map_err(ProtocolError::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DisplayName;

    #[test]
    fn test_decode_message_frame() {
        // テスト項目: message タイプのフレームが本文付きでデコードされる
        // given (前提条件):
        let text = r#"{"type":"message","message":"hi"}"#;

        // when (操作):
        let result = decode_inbound(text);

        // then (期待する結果):
        assert_eq!(result.unwrap(), ClientCommand::Message("hi".to_string()));
    }

    #[test]
    fn test_decode_ignores_claimed_author() {
        // テスト項目: クライアントが author を名乗っても無視される
        // given (前提条件):
        let text = r#"{"type":"message","message":"hi","author":"SYSTEM"}"#;

        // when (操作):
        let result = decode_inbound(text);

        // then (期待する結果):
        assert_eq!(result.unwrap(), ClientCommand::Message("hi".to_string()));
    }

    #[test]
    fn test_decode_unknown_type() {
        // テスト項目: 未知の type はエラーではなく Unknown として返される
        // given (前提条件):
        let text = r#"{"type":"ping"}"#;

        // when (操作):
        let result = decode_inbound(text);

        // then (期待する結果):
        assert_eq!(result.unwrap(), ClientCommand::Unknown("ping".to_string()));
    }

    #[test]
    fn test_decode_malformed_json() {
        // テスト項目: JSON でないフレームは Malformed エラーになる
        // given (前提条件):
        let text = "hello";

        // when (操作):
        let result = decode_inbound(text);

        // then (期待する結果):
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn test_decode_message_without_body() {
        // テスト項目: message フィールドのない message フレームはエラーになる
        // given (前提条件):
        let text = r#"{"type":"message"}"#;

        // when (操作):
        let result = decode_inbound(text);

        // then (期待する結果):
        assert!(matches!(result, Err(ProtocolError::MissingBody)));
    }

    #[test]
    fn test_encode_outbound_field_order() {
        // テスト項目: 送信メッセージは author, message の順でシリアライズされる
        // given (前提条件):
        let message = ChatMessage::joined(&DisplayName::from_sequence(2));

        // when (操作):
        let json = encode_outbound(&message).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            r#"{"author":"SYSTEM","message":"User#2 has joined the room."}"#
        );
    }
}
