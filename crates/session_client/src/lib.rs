//! session_client - client for the remote chat-session service
//!
//! Authenticated users have their conversations mirrored server-side; this
//! crate speaks that service's JSON API (list/get/create/delete session,
//! add message).

mod client;
mod error;
mod types;

pub use client::SessionClient;
pub use error::{Result, SessionApiError};
pub use types::{SessionRecord, SessionSummary};
