//! Authentication session state for the current client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route guards and user-aware views read [`SessionSnapshot`] and react to
//! changes through [`SessionManager::subscribe`]. Views never mutate the
//! session; every change goes through a manager operation.
//!
//! DESIGN
//! ======
//! ```text
//!   Anonymous --login--> Authenticating --user--> Authenticated
//!       ^                     |   \--error--> Failed(reason)
//!       |                     |                     |
//!       +------ token rejected / logout / restore failure
//! ```
//! A stored token found at construction starts the session in
//! `Authenticating`; [`SessionManager::start`] resolves it.

mod manager;
pub mod validate;

pub use manager::SessionManager;

use crate::net::types::User;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
    /// The last login attempt failed; carries the user-visible reason.
    Failed(String),
}

impl SessionStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Externally readable projection of the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub user: Option<User>,
    /// Most recent user-visible error; cleared when the next operation starts.
    pub error: Option<String>,
    /// Server-controlled flag gating the registration UI. Fails closed.
    pub registration_enabled: bool,
}

impl SessionSnapshot {
    /// Whether an unauthenticated route guard should send the user to login.
    pub fn should_redirect_unauth(&self) -> bool {
        matches!(self.status, SessionStatus::Anonymous | SessionStatus::Failed(_))
    }
}

/// Handle returned by [`SessionManager::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);
