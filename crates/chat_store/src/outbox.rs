//! Persistence Bridge: best-effort mirroring of local message mutations.
//!
//! Every locally-applied message gets queued here and written to the
//! remote session service in the background. The UI never waits on these
//! writes, failures never roll back local state, and entries are not
//! retried - a failed mirror stays `Failed` in the ledger and is dropped.
//! No ordering is enforced between entries.

use std::sync::Arc;

use chat_core::{ids, Citation, Role};
use log::warn;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::service::SessionService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorStatus {
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct MirrorEntry {
    pub message_id: String,
    pub session_id: String,
    pub role: Role,
    pub status: MirrorStatus,
}

#[derive(Clone)]
pub struct Outbox {
    service: Arc<dyn SessionService>,
    entries: Arc<RwLock<Vec<MirrorEntry>>>,
}

impl Outbox {
    pub fn new(service: Arc<dyn SessionService>) -> Self {
        Self {
            service,
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Queue a mirror write and return without waiting for it.
    ///
    /// The returned handle is for tests; callers in the send path drop it.
    pub async fn enqueue(
        &self,
        session_id: &str,
        role: Role,
        content: String,
        citations: Option<Vec<Citation>>,
    ) -> JoinHandle<()> {
        let message_id = ids::next_id();
        let index = {
            let mut entries = self.entries.write().await;
            entries.push(MirrorEntry {
                message_id: message_id.clone(),
                session_id: session_id.to_string(),
                role,
                status: MirrorStatus::Pending,
            });
            entries.len() - 1
        };

        let service = self.service.clone();
        let entries = self.entries.clone();
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            let result = service
                .add_message(
                    &session_id,
                    &message_id,
                    role,
                    &content,
                    citations.as_deref(),
                )
                .await;
            let status = match result {
                Ok(()) => MirrorStatus::Confirmed,
                Err(err) => {
                    warn!(
                        "failed to mirror {} message to session {session_id}: {err}",
                        role.as_str()
                    );
                    MirrorStatus::Failed
                }
            };
            let mut entries = entries.write().await;
            if let Some(entry) = entries.get_mut(index) {
                entry.status = status;
            }
        })
    }

    /// Snapshot of the mirror ledger.
    pub async fn entries(&self) -> Vec<MirrorEntry> {
        self.entries.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use session_client::{SessionApiError, SessionRecord, SessionSummary};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingService {
        fail: AtomicBool,
        added: Mutex<Vec<(String, Role, String)>>,
    }

    #[async_trait]
    impl SessionService for RecordingService {
        async fn list_sessions(&self) -> session_client::Result<Vec<SessionSummary>> {
            Ok(vec![])
        }

        async fn get_session(&self, _id: &str) -> session_client::Result<SessionRecord> {
            Err(SessionApiError::Status(reqwest::StatusCode::NOT_FOUND))
        }

        async fn create_session(
            &self,
            _id: &str,
            _title: &str,
        ) -> session_client::Result<SessionRecord> {
            Err(SessionApiError::Status(reqwest::StatusCode::NOT_FOUND))
        }

        async fn delete_session(&self, _id: &str) -> session_client::Result<()> {
            Ok(())
        }

        async fn add_message(
            &self,
            session_id: &str,
            _message_id: &str,
            role: Role,
            content: &str,
            _citations: Option<&[Citation]>,
        ) -> session_client::Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(SessionApiError::Status(
                    reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                ));
            }
            self.added
                .lock()
                .await
                .push((session_id.to_string(), role, content.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_enqueue_confirms_on_success() {
        let service = Arc::new(RecordingService::default());
        let outbox = Outbox::new(service.clone());

        let handle = outbox
            .enqueue("s-1", Role::User, "ጥያቄ".to_string(), None)
            .await;
        handle.await.unwrap();

        let entries = outbox.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, MirrorStatus::Confirmed);

        let added = service.added.lock().await;
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].2, "ጥያቄ");
    }

    #[tokio::test]
    async fn test_enqueue_marks_failed_and_drops() {
        let service = Arc::new(RecordingService::default());
        service.fail.store(true, Ordering::SeqCst);
        let outbox = Outbox::new(service.clone());

        let handle = outbox
            .enqueue("s-1", Role::Assistant, "መልስ".to_string(), None)
            .await;
        handle.await.unwrap();

        let entries = outbox.entries().await;
        assert_eq!(entries[0].status, MirrorStatus::Failed);
        assert!(service.added.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_entries_keep_queue_order() {
        let service = Arc::new(RecordingService::default());
        let outbox = Outbox::new(service);

        let first = outbox
            .enqueue("s-1", Role::User, "ሀ".to_string(), None)
            .await;
        let second = outbox
            .enqueue("s-1", Role::Assistant, "ለ".to_string(), None)
            .await;
        first.await.unwrap();
        second.await.unwrap();

        let entries = outbox.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[1].role, Role::Assistant);
        assert!(entries[0].message_id < entries[1].message_id);
    }
}
