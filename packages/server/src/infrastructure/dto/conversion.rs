//! Domain Model から DTO への変換

use crate::domain::ChatMessage;

use super::websocket::OutboundMessage;

impl From<&ChatMessage> for OutboundMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            author: message.author().as_str().to_string(),
            message: message.body().to_string(),
        }
    }
}
