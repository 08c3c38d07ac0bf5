use async_stream::stream;
use chat_core::{ChatMessage, Config, Role};
use futures_util::StreamExt;
use log::{debug, info};
use serde::Serialize;

use crate::decode::Utf8Decoder;
use crate::error::{RagError, Result, TextStream};

/// One prior turn, as the backend expects it (role + text, nothing else).
#[derive(Serialize, Clone, Debug)]
pub struct TurnMessage {
    pub role: Role,
    pub content: String,
}

impl From<&ChatMessage> for TurnMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Payload of the streaming chat endpoint: the full history (oldest first)
/// plus identifying context.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<TurnMessage>,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Client for the RAG backend.
#[derive(Clone, Debug)]
pub struct RagClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
}

impl RagClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(&config.api_base)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send the chat request and expose the reply as a stream of decoded
    /// text fragments.
    ///
    /// The stream is finite and cannot be restarted; a non-success status
    /// fails before the first fragment, a mid-body transport error surfaces
    /// through the stream itself. Neither is retried here.
    pub async fn chat_stream(&self, request: &ChatRequest) -> Result<TextStream> {
        info!(
            "chat request: session={} history={} messages",
            request.session_id,
            request.messages.len()
        );

        let response = self
            .http
            .post(self.url("/api/chat"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RagError::Status(status));
        }

        let mut body = response.bytes_stream();
        let stream = stream! {
            let mut decoder = Utf8Decoder::new();
            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(bytes) => {
                        let text = decoder.feed(&bytes);
                        if !text.is_empty() {
                            yield Ok(text);
                        }
                    }
                    Err(err) => {
                        debug!("chat stream transport error: {err}");
                        yield Err(RagError::Stream(err.to_string()));
                        return;
                    }
                }
            }
            let tail = decoder.finish();
            if !tail.is_empty() {
                yield Ok(tail);
            }
        };

        Ok(Box::pin(stream))
    }
}
