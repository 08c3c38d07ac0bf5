//! chat_store - the chat client's coordination core
//!
//! Keeps the conversation list consistent across three sources of change:
//! local mutations (send, create, delete, switch), an incrementally
//! streamed assistant reply, and the remote session service that mirrors
//! state for authenticated users.
//!
//! Guests and authenticated users are disjoint state spaces: a guest's
//! conversations live only in local storage and are never migrated into
//! the remote store on sign-in.

pub mod backend;
pub mod error;
pub mod outbox;
pub mod service;
pub mod storage;
pub mod store;
pub mod streamer;

pub use backend::SessionBackend;
pub use error::{Result, StoreError};
pub use outbox::{MirrorEntry, MirrorStatus, Outbox};
pub use service::SessionService;
pub use storage::{FileStateStorage, MemoryStateStorage, PersistedState, StateStorage};
pub use store::{ConversationStore, SendOutcome};
pub use streamer::ChatStreamer;
