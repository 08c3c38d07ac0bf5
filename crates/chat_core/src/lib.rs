//! chat_core - Core types for the Zufan legal-document chat client
//!
//! This crate provides the foundational types used across the chat crates:
//! - `message` - ChatMessage, Role, Citation
//! - `conversation` - Conversation and its invariants
//! - `text` - localized fixed strings (greeting, error reply, titles)
//! - `ids` - time-based conversation/message id allocation
//! - `config` - client configuration

pub mod config;
pub mod conversation;
pub mod ids;
pub mod message;
pub mod paths;
pub mod text;

// Re-export commonly used types
pub use config::Config;
pub use conversation::{Conversation, GUEST_USER_MESSAGE_LIMIT};
pub use message::{ChatMessage, Citation, Role};
