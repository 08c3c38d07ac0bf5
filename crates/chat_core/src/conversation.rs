//! Conversation - one chat thread.

use serde::{Deserialize, Serialize};

use crate::message::{ChatMessage, Role};
use crate::text;

/// Maximum number of user-authored messages per conversation for guests.
pub const GUEST_USER_MESSAGE_LIMIT: usize = 20;

/// One chat thread: a stable id, a display title, and the ordered message
/// list (insertion order = display order).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Create a conversation containing only the greeting.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            messages: vec![ChatMessage::assistant(text::GREETING)],
        }
    }

    /// Create a conversation from an already-loaded message list. An empty
    /// list falls back to the greeting so the thread never renders blank.
    pub fn with_messages(
        id: impl Into<String>,
        title: impl Into<String>,
        messages: Vec<ChatMessage>,
    ) -> Self {
        let messages = if messages.is_empty() {
            vec![ChatMessage::assistant(text::GREETING)]
        } else {
            messages
        };
        Self {
            id: id.into(),
            title: title.into(),
            messages,
        }
    }

    /// Number of user-authored messages (the guest quota counts these).
    pub fn user_message_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .count()
    }

    /// Whether this thread still holds only the initial greeting, i.e. its
    /// full message list has never been hydrated from the remote store.
    pub fn is_greeting_stub(&self) -> bool {
        self.messages.len() == 1
            && self.messages[0].role == Role::Assistant
            && self.messages[0].content == text::GREETING
    }

    /// Prior turns, oldest first, with in-flight placeholders dropped.
    /// This is what gets sent to the RAG backend as context.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .filter(|m| !m.is_placeholder())
            .cloned()
            .collect()
    }
}
