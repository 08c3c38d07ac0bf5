//! Session identity.
//!
//! Guest and authenticated sessions are separate variants rather than a
//! nullable user id: the two state spaces are disjoint and nothing in the
//! store should branch on "user present" by accident.

use std::sync::Arc;

use crate::service::SessionService;

#[derive(Clone)]
pub enum SessionBackend {
    /// No identity; state lives only in local storage.
    Guest,
    /// Remote-mirrored state for a signed-in user.
    Authenticated {
        user_id: String,
        service: Arc<dyn SessionService>,
    },
}

impl SessionBackend {
    pub fn guest() -> Self {
        Self::Guest
    }

    pub fn authenticated(user_id: impl Into<String>, service: Arc<dyn SessionService>) -> Self {
        Self::Authenticated {
            user_id: user_id.into(),
            service,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Guest => None,
            Self::Authenticated { user_id, .. } => Some(user_id),
        }
    }

    pub fn service(&self) -> Option<&Arc<dyn SessionService>> {
        match self {
            Self::Guest => None,
            Self::Authenticated { service, .. } => Some(service),
        }
    }
}
