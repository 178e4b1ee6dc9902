//! Message and Transcript domain types.
//!
//! These are the value objects of a chat session: the user types a
//! message, the session posts the transcript to the gateway, and the
//! reply is appended. The transcript is append-only for the lifetime
//! of a session; entries are never mutated or removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message author in a conversation.
///
/// `Tool` never appears in a session transcript; it exists on the wire
/// so the gateway can carry tool results between model turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// An agent reply
    Assistant,
    /// System instructions
    System,
    /// Tool execution result (server-side only)
    Tool,
}

/// A single entry in a session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who authored this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Display label of the agent that produced this message, if any.
    /// Cosmetic only; carries no behavioral weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            sender: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant message without a sender label.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: content.into(),
            sender: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant message tagged with the agent that produced it.
    pub fn assistant_from(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: content.into(),
            sender: Some(sender.into()),
            timestamp: Utc::now(),
        }
    }

}

/// An append-only ordered log of messages owned by one chat session.
///
/// Grows monotonically while the session lives and is discarded with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Create a new empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. There is no way to remove or rewrite one.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello!");
        assert!(msg.sender.is_none());
    }

    #[test]
    fn assistant_message_carries_sender() {
        let msg = Message::assistant_from("Weather Expert", "Sunny, 75°F");
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.sender.as_deref(), Some("Weather Expert"));
    }

    #[test]
    fn transcript_is_append_only() {
        let mut log = Transcript::new();
        assert!(log.is_empty());

        log.push(Message::user("First"));
        log.push(Message::assistant("Second"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.last().unwrap().content, "Second");
        assert_eq!(log.messages()[0].content, "First");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(serde_json::to_string(&Role::Tool).unwrap(), "\"tool\"");
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = Message::assistant_from("Assistant", "Hi there");
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content, "Hi there");
        assert_eq!(back.role, Role::Assistant);
        assert_eq!(back.sender.as_deref(), Some("Assistant"));
    }

    #[test]
    fn sender_omitted_when_absent() {
        let json = serde_json::to_string(&Message::user("hey")).unwrap();
        assert!(!json.contains("sender"));
    }
}
