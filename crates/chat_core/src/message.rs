//! Message types shared across the chat crates.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A source excerpt attached to an assistant reply.
///
/// Citations are set once when the reply is stored and never mutated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Citation {
    pub source: String,
    pub content: String,
}

/// One entry in a conversation's message list.
///
/// `content` is only mutable while an assistant reply is streaming in; an
/// assistant message with empty content is the in-flight placeholder.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            citations: None,
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            citations: None,
        }
    }

    /// The streaming placeholder: an assistant message with no content yet.
    pub fn placeholder() -> Self {
        Self::assistant("")
    }

    pub fn is_placeholder(&self) -> bool {
        self.role == Role::Assistant && self.content.is_empty()
    }
}
