//! rag_client - client for the RAG backend
//!
//! The chat endpoint streams the assistant reply as raw text (no event
//! framing); everything else on the backend is plain request/response JSON.

mod decode;

pub mod admin;
pub mod client;
pub mod error;

pub use client::{ChatRequest, RagClient, TurnMessage};
pub use error::{RagError, Result, TextStream};
