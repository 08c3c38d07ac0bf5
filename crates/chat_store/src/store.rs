//! The conversation store.
//!
//! Owns `{conversations, active_id}` and keeps it durable: every mutation
//! is written back to local storage, whatever the identity, so a crash or
//! sign-out never loses the visible state. The list is only ever updated
//! by copy-and-replace under the lock, never edited in place.

use std::collections::HashSet;
use std::sync::Arc;

use chat_core::{ids, text, ChatMessage, Conversation, Role, GUEST_USER_MESSAGE_LIMIT};
use futures::StreamExt;
use log::warn;
use rag_client::{ChatRequest, RagError, TurnMessage};
use tokio::sync::RwLock;

use crate::backend::SessionBackend;
use crate::error::{Result, StoreError};
use crate::outbox::Outbox;
use crate::service::SessionService;
use crate::storage::{PersistedState, StateStorage};
use crate::streamer::ChatStreamer;

#[derive(Clone, Debug, Default)]
struct ChatState {
    conversations: Vec<Conversation>,
    active_id: String,
}

/// How a send ended. Both variants leave the conversation in its final
/// visible state; `Failed` means the assistant bubble now carries the
/// fixed error text.
#[derive(Debug)]
pub enum SendOutcome {
    Completed { content: String },
    Failed { error: RagError },
}

pub struct ConversationStore<S: StateStorage> {
    storage: Arc<S>,
    backend: SessionBackend,
    outbox: Option<Outbox>,
    state: Arc<RwLock<ChatState>>,
    hydrated: Arc<RwLock<HashSet<String>>>,
}

impl<S: StateStorage> ConversationStore<S> {
    pub fn new(storage: S, backend: SessionBackend) -> Self {
        let outbox = backend.service().map(|service| Outbox::new(service.clone()));
        Self {
            storage: Arc::new(storage),
            backend,
            outbox,
            state: Arc::new(RwLock::new(ChatState::default())),
            hydrated: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub fn backend(&self) -> &SessionBackend {
        &self.backend
    }

    /// The mirror ledger, when authenticated.
    pub fn outbox(&self) -> Option<&Outbox> {
        self.outbox.as_ref()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub async fn conversations(&self) -> Vec<Conversation> {
        self.state.read().await.conversations.clone()
    }

    pub async fn active_id(&self) -> String {
        self.state.read().await.active_id.clone()
    }

    pub async fn active_conversation(&self) -> Option<Conversation> {
        let state = self.state.read().await;
        state
            .conversations
            .iter()
            .find(|c| c.id == state.active_id)
            .cloned()
    }

    // ------------------------------------------------------------------
    // Load
    // ------------------------------------------------------------------

    /// Initialize the store.
    ///
    /// Authenticated sessions load from the remote service (summaries
    /// first, full messages for the active conversation only) and fall
    /// back to local storage if that fails. Guests load local storage
    /// directly; absent or corrupt state becomes one fresh default
    /// conversation.
    pub async fn load(&self) -> Result<()> {
        match &self.backend {
            SessionBackend::Guest => self.load_local().await,
            SessionBackend::Authenticated { service, .. } => {
                let service = service.clone();
                match self.load_remote(service).await {
                    Ok(()) => Ok(()),
                    Err(err) => {
                        warn!("remote session load failed, using local state: {err}");
                        self.load_local().await
                    }
                }
            }
        }
    }

    async fn load_local(&self) -> Result<()> {
        let persisted = self.storage.load().await?;
        let (conversations, saved_active) = match persisted {
            Some(state) if !state.conversations.is_empty() => {
                (state.conversations, state.active_id)
            }
            _ => (vec![Conversation::new("1", text::default_title(1))], None),
        };

        let active_id = saved_active
            .filter(|id| conversations.iter().any(|c| &c.id == id))
            .unwrap_or_else(|| conversations[0].id.clone());

        {
            let mut state = self.state.write().await;
            *state = ChatState {
                conversations,
                active_id,
            };
        }
        self.persist().await
    }

    async fn load_remote(&self, service: Arc<dyn SessionService>) -> Result<()> {
        let summaries = service.list_sessions().await?;

        if summaries.is_empty() {
            // First sign-in: create the initial session server-side before
            // adopting it locally.
            let id = ids::next_id();
            let title = text::default_title(1);
            service.create_session(&id, &title).await?;

            let conversation = Conversation::new(&id, &title);
            {
                let mut state = self.state.write().await;
                *state = ChatState {
                    conversations: vec![conversation],
                    active_id: id.clone(),
                };
            }
            self.hydrated.write().await.insert(id);
            return self.persist().await;
        }

        // Summaries arrive most-recently-updated first; prefer the id the
        // user last had open if it still exists.
        let saved_active = match self.storage.load().await {
            Ok(Some(state)) => state.active_id,
            _ => None,
        };
        let target_id = saved_active
            .filter(|id| summaries.iter().any(|s| &s.id == id))
            .unwrap_or_else(|| summaries[0].id.clone());

        // Full messages only for the conversation being shown; the rest
        // stay greeting-only stubs until first activation.
        let record = service.get_session(&target_id).await?;

        let conversations = summaries
            .iter()
            .map(|summary| {
                if summary.id == target_id {
                    Conversation::with_messages(
                        &record.id,
                        &record.title,
                        record.messages.clone(),
                    )
                } else {
                    Conversation::new(&summary.id, &summary.title)
                }
            })
            .collect();

        {
            let mut state = self.state.write().await;
            *state = ChatState {
                conversations,
                active_id: target_id.clone(),
            };
        }
        self.hydrated.write().await.insert(target_id);
        self.persist().await
    }

    // ------------------------------------------------------------------
    // Conversation lifecycle
    // ------------------------------------------------------------------

    /// Make `id` the active conversation. Purely local; call
    /// [`hydrate_active`](Self::hydrate_active) afterwards to pull its
    /// messages if it has never been shown.
    pub async fn switch_active(&self, id: &str) -> Result<()> {
        {
            let state = self.state.read().await;
            if !state.conversations.iter().any(|c| c.id == id) {
                return Err(StoreError::UnknownConversation(id.to_string()));
            }
        }
        let id = id.to_string();
        self.mutate(move |state| state.active_id = id).await
    }

    /// Switch and hydrate in one step - what a conversation click does.
    pub async fn activate(&self, id: &str) -> Result<()> {
        self.switch_active(id).await?;
        self.hydrate_active().await
    }

    /// Fetch the active conversation's full message list if it is still an
    /// unhydrated greeting stub. At most one fetch per conversation per
    /// store lifetime; a failed fetch does not count and may be retried by
    /// the next activation.
    pub async fn hydrate_active(&self) -> Result<()> {
        let SessionBackend::Authenticated { service, .. } = &self.backend else {
            return Ok(());
        };

        let active_id = self.active_id().await;
        if self.hydrated.read().await.contains(&active_id) {
            return Ok(());
        }

        let is_stub = {
            let state = self.state.read().await;
            state
                .conversations
                .iter()
                .find(|c| c.id == active_id)
                .map(|c| c.is_greeting_stub())
                .unwrap_or(false)
        };
        if !is_stub {
            // Already has real content (e.g. messages arrived in this
            // session); nothing to fetch, ever.
            self.hydrated.write().await.insert(active_id);
            return Ok(());
        }

        let record = service.get_session(&active_id).await?;
        let id = active_id.clone();
        self.mutate(move |state| {
            if let Some(conversation) = state.conversations.iter_mut().find(|c| c.id == id) {
                *conversation =
                    Conversation::with_messages(&id, conversation.title.clone(), record.messages);
            }
        })
        .await?;
        self.hydrated.write().await.insert(active_id);
        Ok(())
    }

    /// Create a new conversation and make it active.
    ///
    /// Authenticated: the remote create happens first and a failure aborts
    /// the whole operation - the local list is untouched.
    pub async fn create_conversation(&self) -> Result<Conversation> {
        let id = ids::next_id();
        let title = {
            let state = self.state.read().await;
            text::default_title(state.conversations.len() + 1)
        };

        if let Some(service) = self.backend.service() {
            service.create_session(&id, &title).await?;
        }

        let conversation = Conversation::new(&id, &title);
        {
            let conversation = conversation.clone();
            let id = id.clone();
            self.mutate(move |state| {
                state.conversations.push(conversation);
                state.active_id = id;
            })
            .await?;
        }
        self.hydrated.write().await.insert(id);
        Ok(conversation)
    }

    /// Delete a conversation.
    ///
    /// Authenticated: the remote delete happens first and a failure aborts
    /// the operation. Deleting the active conversation activates the first
    /// remaining one; deleting the last one synthesizes a fresh default
    /// conversation (created remotely best-effort when authenticated).
    pub async fn delete_conversation(&self, id: &str) -> Result<()> {
        {
            let state = self.state.read().await;
            if !state.conversations.iter().any(|c| c.id == id) {
                return Err(StoreError::UnknownConversation(id.to_string()));
            }
        }

        if let Some(service) = self.backend.service() {
            service.delete_session(id).await?;
        }

        let fresh = Conversation::new(ids::next_id(), text::default_title(1));
        let deleted_id = id.to_string();
        let used_fresh = {
            let fresh = fresh.clone();
            self.mutate(move |state| {
                state.conversations.retain(|c| c.id != deleted_id);
                if state.active_id != deleted_id {
                    return false;
                }
                match state.conversations.first() {
                    Some(first) => {
                        state.active_id = first.id.clone();
                        false
                    }
                    None => {
                        state.active_id = fresh.id.clone();
                        state.conversations.push(fresh);
                        true
                    }
                }
            })
            .await?
        };

        if used_fresh {
            self.hydrated.write().await.insert(fresh.id.clone());
            if let Some(service) = self.backend.service() {
                let service = service.clone();
                tokio::spawn(async move {
                    if let Err(err) = service.create_session(&fresh.id, &fresh.title).await {
                        warn!("failed to create replacement session {}: {err}", fresh.id);
                    }
                });
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Send / streaming reconciliation
    // ------------------------------------------------------------------

    /// Send a user message in the active conversation and reconcile the
    /// streamed reply into it.
    ///
    /// The user message and an empty assistant placeholder are appended
    /// before the request is made; fragments then overwrite the tail of
    /// the conversation that was active when the send started. Switching
    /// away mid-stream neither cancels the stream nor redirects it.
    pub async fn send_message(
        &self,
        content: &str,
        streamer: &dyn ChatStreamer,
    ) -> Result<SendOutcome> {
        let content = content.trim();

        let (target_id, request) = {
            let state = self.state.read().await;
            let active = state
                .conversations
                .iter()
                .find(|c| c.id == state.active_id)
                .ok_or_else(|| StoreError::UnknownConversation(state.active_id.clone()))?;

            if !self.backend.is_authenticated()
                && active.user_message_count() >= GUEST_USER_MESSAGE_LIMIT
            {
                return Err(StoreError::GuestLimitReached);
            }

            let mut messages: Vec<TurnMessage> =
                active.history().iter().map(TurnMessage::from).collect();
            messages.push(TurnMessage {
                role: Role::User,
                content: content.to_string(),
            });

            let request = ChatRequest {
                messages,
                session_id: active.id.clone(),
                user_id: self.backend.user_id().map(str::to_string),
            };
            (active.id.clone(), request)
        };

        // Optimistic: the user's message is visible before any network
        // traffic, and stays even if mirroring or the stream fails.
        self.append_message(&target_id, ChatMessage::user(content))
            .await?;
        if let Some(outbox) = &self.outbox {
            outbox
                .enqueue(&target_id, Role::User, content.to_string(), None)
                .await;
        }
        self.append_message(&target_id, ChatMessage::placeholder())
            .await?;

        let mut accumulated = String::new();
        let failure = match streamer.chat_stream(request).await {
            Ok(mut stream) => {
                let mut failure = None;
                while let Some(item) = stream.next().await {
                    match item {
                        Ok(fragment) => {
                            accumulated.push_str(&fragment);
                            self.apply_stream_text(&target_id, &accumulated).await?;
                        }
                        Err(err) => {
                            failure = Some(err);
                            break;
                        }
                    }
                }
                failure
            }
            Err(err) => Some(err),
        };

        if failure.is_some() {
            // A failed reply must never be shown empty or half-finished:
            // whatever partial text was applied is replaced by the fixed
            // error string as the final visible state.
            let partial = accumulated.clone();
            let id = target_id.clone();
            self.mutate(move |state| {
                if let Some(conversation) = state.conversations.iter_mut().find(|c| c.id == id) {
                    if let Some(last) = conversation.messages.last_mut() {
                        if last.role == Role::Assistant
                            && (last.content.is_empty() || last.content == partial)
                        {
                            last.content = text::REPLY_ERROR.to_string();
                        }
                    }
                }
            })
            .await?;
        }

        let final_content = if failure.is_some() {
            text::REPLY_ERROR.to_string()
        } else {
            accumulated.clone()
        };
        if let Some(outbox) = &self.outbox {
            outbox
                .enqueue(&target_id, Role::Assistant, final_content, None)
                .await;
        }

        Ok(match failure {
            None => SendOutcome::Completed {
                content: accumulated,
            },
            Some(error) => SendOutcome::Failed { error },
        })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Copy-and-replace mutation of the shared state, followed by the
    /// local-storage write every mutation owes.
    async fn mutate<R>(&self, f: impl FnOnce(&mut ChatState) -> R) -> Result<R> {
        let value = {
            let mut guard = self.state.write().await;
            let mut next = guard.clone();
            let value = f(&mut next);
            *guard = next;
            value
        };
        self.persist().await?;
        Ok(value)
    }

    async fn persist(&self) -> Result<()> {
        let state = self.state.read().await.clone();
        self.storage
            .save(&PersistedState {
                conversations: state.conversations,
                active_id: Some(state.active_id),
            })
            .await
    }

    async fn append_message(&self, target_id: &str, message: ChatMessage) -> Result<()> {
        let id = target_id.to_string();
        self.mutate(move |state| {
            if let Some(conversation) = state.conversations.iter_mut().find(|c| c.id == id) {
                conversation.messages.push(message);
            }
        })
        .await
    }

    /// Overwrite the streaming tail of the target conversation with the
    /// accumulated reply so far. Only an assistant tail is touched, so a
    /// stream whose conversation gained other messages, or whose user
    /// navigated elsewhere, stops being visibly applied.
    async fn apply_stream_text(&self, target_id: &str, accumulated: &str) -> Result<()> {
        let id = target_id.to_string();
        let accumulated = accumulated.to_string();
        self.mutate(move |state| {
            if let Some(conversation) = state.conversations.iter_mut().find(|c| c.id == id) {
                if let Some(last) = conversation.messages.last_mut() {
                    if last.role == Role::Assistant {
                        last.content = accumulated;
                    }
                }
            }
        })
        .await
    }
}
