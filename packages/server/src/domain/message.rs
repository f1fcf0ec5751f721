//! Chat message value object.

use std::fmt;

use super::DisplayName;

/// Author tag used for join/leave notifications.
pub const SYSTEM_AUTHOR: &str = "SYSTEM";

/// Who wrote a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Author {
    /// Notifications generated by the room itself.
    System,
    /// A connected client, identified by its display name.
    User(DisplayName),
}

impl Author {
    pub fn as_str(&self) -> &str {
        match self {
            Author::System => SYSTEM_AUTHOR,
            Author::User(name) => name.as_str(),
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable message relayed to the members of the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    author: Author,
    body: String,
}

impl ChatMessage {
    pub fn new(author: Author, body: impl Into<String>) -> Self {
        Self {
            author,
            body: body.into(),
        }
    }

    /// A message written by a client.
    ///
    /// The author is always the sending session's own name; whatever the
    /// client claims inside the frame is never consulted.
    pub fn from_user(name: &DisplayName, body: impl Into<String>) -> Self {
        Self::new(Author::User(name.clone()), body)
    }

    pub fn system(body: impl Into<String>) -> Self {
        Self::new(Author::System, body)
    }

    /// `"<name> has joined the room."`
    pub fn joined(name: &DisplayName) -> Self {
        Self::system(format!("{} has joined the room.", name))
    }

    /// `"<name> has left the room."`
    pub fn left(name: &DisplayName) -> Self {
        Self::system(format!("{} has left the room.", name))
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_user_uses_display_name_as_author() {
        // テスト項目: クライアントのメッセージは表示名を author に持つ
        // given (前提条件):
        let name = DisplayName::from_sequence(3);

        // when (操作):
        let message = ChatMessage::from_user(&name, "hello");

        // then (期待する結果):
        assert_eq!(message.author().as_str(), "User#3");
        assert_eq!(message.body(), "hello");
    }

    #[test]
    fn test_join_and_leave_notifications_are_system_messages() {
        // テスト項目: 入退室通知は SYSTEM author で定型文になる
        // given (前提条件):
        let name = DisplayName::from_sequence(1);

        // when (操作):
        let joined = ChatMessage::joined(&name);
        let left = ChatMessage::left(&name);

        // then (期待する結果):
        assert_eq!(joined.author(), &Author::System);
        assert_eq!(joined.body(), "User#1 has joined the room.");
        assert_eq!(left.author().to_string(), SYSTEM_AUTHOR);
        assert_eq!(left.body(), "User#1 has left the room.");
    }
}
