use chat_core::{Citation, Config, Role};
use log::debug;
use serde::Serialize;

use crate::error::{Result, SessionApiError};
use crate::types::{SessionRecord, SessionSummary};

#[derive(Serialize)]
struct CreateSessionBody<'a> {
    id: &'a str,
    title: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddMessageBody<'a> {
    session_id: &'a str,
    id: &'a str,
    role: Role,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    citations: Option<&'a [Citation]>,
}

/// Client for the remote session service.
#[derive(Clone, Debug)]
pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
}

impl SessionClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(&config.session_base)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(SessionApiError::Status(status))
        }
    }

    /// List the user's sessions, most recently updated first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let response = self.http.get(self.url("/api/chat/sessions")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Fetch one session with its full message list.
    pub async fn get_session(&self, id: &str) -> Result<SessionRecord> {
        let response = self
            .http
            .get(self.url(&format!("/api/chat/sessions/{id}")))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Create a session with a client-allocated id.
    pub async fn create_session(&self, id: &str, title: &str) -> Result<SessionRecord> {
        debug!("creating remote session {id} ({title})");
        let response = self
            .http
            .post(self.url("/api/chat/sessions"))
            .json(&CreateSessionBody { id, title })
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn delete_session(&self, id: &str) -> Result<()> {
        debug!("deleting remote session {id}");
        let response = self
            .http
            .delete(self.url(&format!("/api/chat/sessions/{id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Append a message to a session.
    pub async fn add_message(
        &self,
        session_id: &str,
        message_id: &str,
        role: Role,
        content: &str,
        citations: Option<&[Citation]>,
    ) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/chat/messages"))
            .json(&AddMessageBody {
                session_id,
                id: message_id,
                role,
                content,
                citations,
            })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
