//! Local state persistence trait and implementations.
//!
//! The persisted shape mirrors the two local-storage keys of the web
//! client: the serialized conversation list and the active conversation
//! id. Corrupt state is treated as absent.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chat_core::Conversation;
use log::warn;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::Result;

const CHATS_FILE: &str = "chats.json";
const ACTIVE_FILE: &str = "active_chat";

/// What gets written to local storage after every mutation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersistedState {
    pub conversations: Vec<Conversation>,
    pub active_id: Option<String>,
}

/// Local state storage.
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Load the persisted state; `None` means absent (or unreadable,
    /// which is treated the same).
    async fn load(&self) -> Result<Option<PersistedState>>;

    /// Replace the persisted state.
    async fn save(&self, state: &PersistedState) -> Result<()>;
}

/// File-based state storage: one file per key under a base directory.
#[derive(Clone)]
pub struct FileStateStorage {
    base_path: PathBuf,
}

impl FileStateStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl StateStorage for FileStateStorage {
    async fn load(&self) -> Result<Option<PersistedState>> {
        let chats_path = self.base_path.join(CHATS_FILE);
        if !chats_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&chats_path).await?;
        let conversations: Vec<Conversation> = match serde_json::from_str(&contents) {
            Ok(conversations) => conversations,
            Err(err) => {
                warn!("corrupt local chat state, treating as absent: {err}");
                return Ok(None);
            }
        };

        let active_id = match fs::read_to_string(self.base_path.join(ACTIVE_FILE)).await {
            Ok(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
            _ => None,
        };

        Ok(Some(PersistedState {
            conversations,
            active_id,
        }))
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;

        let contents = serde_json::to_string_pretty(&state.conversations)?;
        fs::write(self.base_path.join(CHATS_FILE), contents).await?;

        let active = state.active_id.clone().unwrap_or_default();
        fs::write(self.base_path.join(ACTIVE_FILE), active).await?;

        Ok(())
    }
}

/// In-memory state storage, for tests and ephemeral sessions.
#[derive(Clone, Default)]
pub struct MemoryStateStorage {
    state: Arc<tokio::sync::Mutex<Option<PersistedState>>>,
}

impl MemoryStateStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStorage for MemoryStateStorage {
    async fn load(&self) -> Result<Option<PersistedState>> {
        Ok(self.state.lock().await.clone())
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        *self.state.lock().await = Some(state.clone());
        Ok(())
    }
}
