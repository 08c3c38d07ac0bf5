use std::pin::Pin;

use futures::Stream;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("stream error: {0}")]
    Stream(String),
}

pub type Result<T> = std::result::Result<T, RagError>;

/// A lazy, finite, non-restartable sequence of decoded reply fragments.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;
