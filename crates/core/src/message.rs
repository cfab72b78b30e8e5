//! Message and Conversation domain types.
//!
//! A conversation is an append-only sequence of messages owned by the
//! session. Only the trailing window of it is replayed to the remote
//! inference service; older history stays local.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How many trailing messages are replayed to the remote service.
pub const REMOTE_WINDOW: usize = 16;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant (any tier)
    Assistant,
    /// Grounding instructions for the local tier; never appended to history
    System,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// BCP-47-ish language tag ("en", "es")
    #[serde(rename = "lang")]
    pub language: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<String>, language: impl Into<String>) -> Self {
        Self::new(Role::User, content, language)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>, language: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, language)
    }

    fn new(role: Role, content: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            language: language.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An append-only message sequence owned by one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. There is no removal: history is retained for
    /// the lifetime of the session.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent `REMOTE_WINDOW` messages, oldest first.
    pub fn trailing_window(&self) -> &[Message] {
        let start = self.messages.len().saturating_sub(REMOTE_WINDOW);
        &self.messages[start..]
    }

    /// The most recent user message, if any.
    pub fn last_user(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
