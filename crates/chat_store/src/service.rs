//! Seam between the store and the remote session service.
//!
//! The store talks to this trait so its logic can be exercised against a
//! scripted implementation; `session_client::SessionClient` is the real
//! one.

use async_trait::async_trait;
use chat_core::{Citation, Role};
use session_client::{SessionClient, SessionRecord, SessionSummary};

#[async_trait]
pub trait SessionService: Send + Sync {
    async fn list_sessions(&self) -> session_client::Result<Vec<SessionSummary>>;

    async fn get_session(&self, id: &str) -> session_client::Result<SessionRecord>;

    async fn create_session(&self, id: &str, title: &str) -> session_client::Result<SessionRecord>;

    async fn delete_session(&self, id: &str) -> session_client::Result<()>;

    async fn add_message(
        &self,
        session_id: &str,
        message_id: &str,
        role: Role,
        content: &str,
        citations: Option<&[Citation]>,
    ) -> session_client::Result<()>;
}

#[async_trait]
impl SessionService for SessionClient {
    async fn list_sessions(&self) -> session_client::Result<Vec<SessionSummary>> {
        SessionClient::list_sessions(self).await
    }

    async fn get_session(&self, id: &str) -> session_client::Result<SessionRecord> {
        SessionClient::get_session(self, id).await
    }

    async fn create_session(&self, id: &str, title: &str) -> session_client::Result<SessionRecord> {
        SessionClient::create_session(self, id, title).await
    }

    async fn delete_session(&self, id: &str) -> session_client::Result<()> {
        SessionClient::delete_session(self, id).await
    }

    async fn add_message(
        &self,
        session_id: &str,
        message_id: &str,
        role: Role,
        content: &str,
        citations: Option<&[Citation]>,
    ) -> session_client::Result<()> {
        SessionClient::add_message(self, session_id, message_id, role, content, citations).await
    }
}
