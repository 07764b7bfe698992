//! # catweight-client
//!
//! Client-side session core for the cat weight tracker. Owns the bearer
//! token, the cached user record and the registration-availability flag, and
//! exposes login/registration/logout/refresh to view code through a
//! subscribe/notify projection.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server is an external REST collaborator. Browser builds (`hydrate`)
//! talk to it through `gloo-net` and persist the token in `sessionStorage`;
//! native callers plug in their own [`net::transport::Transport`] and use the
//! file-backed storage area.
//!
//! LAYOUT
//! ======
//! - `storage`: scoped key/value areas and the two-tier [`TokenStore`].
//! - `net`: wire types, error taxonomy, transport seam, [`ApiClient`].
//! - `session`: the [`SessionManager`] state machine and input validation.
//! - `reactive`: Leptos signal bridge for the session projection.

pub mod config;
pub mod net;
pub mod reactive;
pub mod session;
pub mod storage;

pub use config::{ClientConfig, ConfigError};
pub use net::api::ApiClient;
pub use net::error::{ApiError, ErrorKind};
pub use net::transport::{HttpRequest, HttpResponse, Method, RequestBody, Transport, TransportError};
pub use net::types::{Credentials, PasswordChange, ProfileUpdate, Registration, User};
pub use session::{SessionManager, SessionSnapshot, SessionStatus, SubscriptionId};
pub use storage::memory::MemoryArea;
pub use storage::token_store::TokenStore;
pub use storage::{StorageArea, StorageError};
