//! Admin surface of the RAG backend: documents, vector store, audit logs.
//!
//! Plain request/response JSON calls; success is status-driven and errors
//! are surfaced to the caller to report.

use std::path::Path;

use log::info;
use serde::Deserialize;
use serde_json::Value;

use crate::client::RagClient;
use crate::error::{RagError, Result};

#[derive(Deserialize, Clone, Debug)]
pub struct DocumentStats {
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub chunks: u64,
    pub total_chars: u64,
    pub page_count: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct VectorStats {
    pub total_vectors: u64,
    pub index_size: String,
    pub model_info: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SearchResult {
    pub content: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: Value,
}

impl RagClient {
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(RagError::Status(status))
        }
    }

    // ---- Knowledge base ----

    pub async fn list_documents(&self) -> Result<Vec<DocumentStats>> {
        let response = self.http.get(self.url("/api/documents")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Upload a source document as a multipart form.
    pub async fn upload_document(&self, path: &Path) -> Result<Value> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);
        info!("uploading document: {}", path.display());
        let response = self
            .http
            .post(self.url("/api/upload/file"))
            .multipart(form)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Index pre-chunked document content.
    pub async fn upload_chunks(&self, chunks: &[Value]) -> Result<Value> {
        let response = self
            .http
            .post(self.url("/api/upload/chunks"))
            .json(chunks)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn delete_document(&self, filename: &str) -> Result<Value> {
        let mut url = reqwest::Url::parse(&self.url("/api/documents"))
            .map_err(|e| RagError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| RagError::InvalidUrl(self.base_url.clone()))?
            .push(filename);
        let response = self.http.delete(url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    // ---- Vector store ----

    pub async fn vector_stats(&self) -> Result<VectorStats> {
        let response = self.http.get(self.url("/api/vector/stats")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn vector_search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .http
            .post(self.url("/api/vector/search"))
            .json(&serde_json::json!({ "query": query, "k": k }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn clear_vector_store(&self) -> Result<Value> {
        let response = self.http.delete(self.url("/api/vector/clear")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    // ---- Audit logs ----

    pub async fn audit_logs(&self, limit: usize) -> Result<Vec<Value>> {
        let response = self
            .http
            .get(self.url("/api/audit/logs"))
            .query(&[("limit", limit)])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn clear_audit_logs(&self) -> Result<Value> {
        let response = self.http.delete(self.url("/api/audit/logs")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
