//! Message and conversation state domain types.
//!
//! User utterance → orchestrator logs it → provider replies → reply is logged.
//! Insertion order is the chronological order; timestamps are advisory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Composed instruction text. Only ever sent outward, never logged.
    System,
    /// The end user
    User,
    /// The LLM's reply
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Capture time
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    /// Create a user message stamped at `timestamp`.
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Role::User, content, timestamp)
    }

    /// Create an assistant message stamped at `timestamp`.
    pub fn assistant(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Role::Assistant, content, timestamp)
    }

    /// Create the leading instruction message for an outgoing request.
    pub fn system(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Role::System, content, timestamp)
    }
}

/// Per-user dialogue state owned by the conversation store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Selected kit. `None` until setup or the first chat turn defaults it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kit_id: Option<String>,

    /// Logged user and assistant messages, oldest first
    #[serde(default)]
    pub messages: Vec<Message>,

    pub created_at: DateTime<Utc>,

    /// Last time the entry was read or written; consulted by eviction only.
    pub last_active: DateTime<Utc>,
}

impl ConversationState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            kit_id: None,
            messages: Vec::new(),
            created_at: now,
            last_active: now,
        }
    }

    /// The trailing `window` messages, in original order.
    pub fn window(&self, window: usize) -> &[Message] {
        Self::window_of(&self.messages, window)
    }

    /// The trailing `window` entries of any message log.
    pub fn window_of(messages: &[Message], window: usize) -> &[Message] {
        let start = messages.len().saturating_sub(window);
        &messages[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn create_user_message() {
        let msg = Message::user("I cut my finger", at(0));
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "I cut my finger");
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        assert_eq!(Role::System.as_str(), "system");
    }

    #[test]
    fn window_keeps_trailing_messages_in_order() {
        let mut state = ConversationState::new(at(0));
        for i in 0..15 {
            state.messages.push(Message::user(format!("m{i}"), at(i)));
        }
        let window = state.window(10);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0].content, "m5");
        assert_eq!(window[9].content, "m14");
    }

    #[test]
    fn window_larger_than_log_returns_everything() {
        let mut state = ConversationState::new(at(0));
        state.messages.push(Message::user("only", at(1)));
        assert_eq!(state.window(10).len(), 1);
        assert!(ConversationState::new(at(0)).window(10).is_empty());
    }
}
