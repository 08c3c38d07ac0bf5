use thiserror::Error;

use chat_core::GUEST_USER_MESSAGE_LIMIT;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("session service error: {0}")]
    Remote(#[from] session_client::SessionApiError),

    #[error("guest limit of {GUEST_USER_MESSAGE_LIMIT} messages reached, sign in to continue")]
    GuestLimitReached,

    #[error("unknown conversation: {0}")]
    UnknownConversation(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
