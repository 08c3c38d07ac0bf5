//! Seam between the reconciler and the streaming transport.
//!
//! The reconciler only needs "a request becomes a sequence of text
//! fragments"; anything that can produce a [`TextStream`] can drive it.

use async_trait::async_trait;
use rag_client::{ChatRequest, RagClient, TextStream};

#[async_trait]
pub trait ChatStreamer: Send + Sync {
    async fn chat_stream(&self, request: ChatRequest) -> rag_client::Result<TextStream>;
}

#[async_trait]
impl ChatStreamer for RagClient {
    async fn chat_stream(&self, request: ChatRequest) -> rag_client::Result<TextStream> {
        RagClient::chat_stream(self, &request).await
    }
}
