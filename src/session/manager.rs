//! Session manager: login/registration/logout/refresh orchestration.
//!
//! ARCHITECTURE
//! ============
//! One manager per running client. It owns the [`ApiClient`] (and through it
//! the shared token store) plus the session record behind `Rc<Shared>`. The
//! API client's unauthorized hook holds a `Weak` to the same record, so a
//! 401 from any request can drop the session without a reference cycle.
//!
//! CONCURRENCY
//! ===========
//! Single-threaded and cooperative: methods take `&self`, state sits in
//! `RefCell`s, and no borrow is held across an `.await`. Every
//! state-changing operation stamps a new generation before its first await;
//! a completion whose generation is no longer current is discarded with
//! [`ErrorKind::Superseded`] and leaves state alone. A superseded login
//! still removes the token it saved, unless a newer operation adopted it.
//! Rejected login input is not an operation: it records an error and never
//! supersedes anything.

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::validate;
use super::{SessionSnapshot, SessionStatus, SubscriptionId};
use crate::config::ClientConfig;
use crate::net::api::ApiClient;
use crate::net::error::{ApiError, ErrorKind};
use crate::net::transport::Transport;
use crate::net::types::{Credentials, PasswordChange, ProfileUpdate, Registration, User};
use crate::storage::StorageArea;
use crate::storage::token_store::TokenStore;

type Listener = Rc<dyn Fn(&SessionSnapshot)>;

#[derive(Debug, Default)]
struct Session {
    token: Option<String>,
    user: Option<User>,
    status: SessionStatus,
    error: Option<String>,
    registration_enabled: bool,
}

impl Session {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status.clone(),
            user: self.user.clone(),
            error: self.error.clone(),
            registration_enabled: self.registration_enabled,
        }
    }

    fn sign_out(&mut self) {
        self.token = None;
        self.user = None;
        self.status = SessionStatus::Anonymous;
    }
}

struct Shared {
    session: RefCell<Session>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_listener: Cell<u64>,
    generation: Cell<u64>,
}

impl Shared {
    fn snapshot(&self) -> SessionSnapshot {
        self.session.borrow().snapshot()
    }

    /// Apply `change` and notify subscribers.
    fn update(&self, change: impl FnOnce(&mut Session)) {
        {
            let mut session = self.session.borrow_mut();
            change(&mut session);
            debug_assert!(session.user.is_none() || session.token.is_some(), "cached user without token");
            debug_assert!(
                !session.status.is_authenticated() || (session.user.is_some() && session.token.is_some()),
                "authenticated without user and token"
            );
        }
        self.notify();
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        // Listeners may subscribe or unsubscribe; call them on a copy.
        let listeners: Vec<Listener> = self.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn begin(&self) -> u64 {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        next
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.get() == generation
    }

    /// Unauthorized hook target: the API client already cleared storage.
    fn invalidate(&self) {
        if !self.session.borrow().status.is_authenticated() {
            return;
        }
        info!("session invalidated by server");
        self.update(Session::sign_out);
    }
}

pub struct SessionManager<T, S> {
    api: ApiClient<T, S>,
    shared: Rc<Shared>,
}

impl<T: Transport, S: StorageArea> SessionManager<T, S> {
    /// Build a manager over `tokens`, reading any stored token immediately.
    pub fn new(transport: T, tokens: TokenStore<S>, config: ClientConfig) -> Self {
        Self::with_client(ApiClient::new(transport, Rc::new(tokens), config))
    }

    /// Build a manager around an existing API client, taking over its
    /// unauthorized hook.
    pub fn with_client(api: ApiClient<T, S>) -> Self {
        let token = api.tokens().load();
        let status = if token.is_some() { SessionStatus::Authenticating } else { SessionStatus::Anonymous };
        debug!(?status, "session created");

        let shared = Rc::new(Shared {
            session: RefCell::new(Session { token, status, ..Session::default() }),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            generation: Cell::new(0),
        });
        let weak = Rc::downgrade(&shared);
        api.set_unauthorized_hook(move || {
            if let Some(shared) = weak.upgrade() {
                shared.invalidate();
            }
        });

        Self { api, shared }
    }

    /// Client for requests outside the session endpoints. A 401 on any of
    /// them still invalidates this session.
    pub fn api(&self) -> &ApiClient<T, S> {
        &self.api
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.snapshot()
    }

    pub fn status(&self) -> SessionStatus {
        self.shared.session.borrow().status.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.shared.session.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.shared.session.borrow().status.is_authenticated()
    }

    pub fn registration_enabled(&self) -> bool {
        self.shared.session.borrow().registration_enabled
    }

    /// Call `listener` with a fresh snapshot after every change.
    pub fn subscribe(&self, listener: impl Fn(&SessionSnapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.shared.next_listener.get());
        self.shared.next_listener.set(id.0 + 1);
        self.shared.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.shared.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Startup sequence: resolve a stored token (if any) and probe the
    /// registration flag concurrently.
    pub async fn start(&self) -> SessionSnapshot {
        let restoring = self.status() == SessionStatus::Authenticating;
        let restore = async {
            if restoring {
                // Failures are already reflected in state.
                let _ = self.refresh().await;
            }
        };
        futures::join!(restore, self.probe_registration());
        self.snapshot()
    }

    /// Log in with `credentials`, storing the issued token and caching the user.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty fields (no request sent), the
    /// API error for a failed login or user fetch, or
    /// [`ErrorKind::Superseded`] if a newer operation started meanwhile.
    pub async fn login(&self, credentials: Credentials) -> Result<User, ApiError> {
        if let Err(err) = validate::login(&credentials) {
            self.reject_login_input(&err);
            return Err(err);
        }

        let generation = self.shared.begin();
        debug!(username = %credentials.username, "login started");
        self.shared.update(|s| {
            s.status = SessionStatus::Authenticating;
            s.error = None;
        });

        let issued = self.api.login_token(&credentials).await;
        if !self.shared.is_current(generation) {
            debug!(username = %credentials.username, "discarding superseded login");
            return Err(ApiError::superseded());
        }
        let token = match issued {
            Ok(issued) if !issued.access_token.is_empty() => issued.access_token,
            Ok(_) => {
                let err = ApiError::new(ErrorKind::Unknown, "Login failed");
                self.fail(&err);
                return Err(err);
            }
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        };

        self.api.tokens().save(&token);
        let held = token.clone();
        self.shared.update(|s| s.token = Some(held));

        let fetched = self.api.current_user().await;
        if !self.shared.is_current(generation) {
            debug!(username = %credentials.username, "discarding superseded login");
            self.discard_token(&token);
            return Err(ApiError::superseded());
        }
        match fetched {
            Ok(user) => {
                info!(user_id = user.id, username = %user.username, "logged in");
                let cached = user.clone();
                self.shared.update(|s| {
                    s.user = Some(cached);
                    s.status = SessionStatus::Authenticated;
                });
                Ok(user)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Create an account. Never logs the new user in and never changes status.
    ///
    /// # Errors
    ///
    /// Returns a validation error (no request sent) or the API error.
    pub async fn register(&self, registration: Registration) -> Result<User, ApiError> {
        if let Err(err) = validate::registration(&registration) {
            self.record_error(&err);
            return Err(err);
        }
        self.shared.update(|s| s.error = None);

        match self.api.register(&registration).await {
            Ok(user) => {
                info!(user_id = user.id, username = %user.username, "registered");
                Ok(user)
            }
            Err(err) => {
                warn!(code = err.code(), "registration failed");
                self.record_error(&err);
                Err(err)
            }
        }
    }

    /// Drop the token and cached user. Any in-flight login or refresh is
    /// superseded.
    pub fn logout(&self) {
        self.shared.begin();
        self.api.tokens().clear();
        self.shared.update(|s| {
            s.sign_out();
            s.error = None;
        });
        info!("logged out");
    }

    /// Re-resolve the stored token to a user, replacing the cached copy.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Unauthorized`] when no token is stored, the API
    /// error when the token does not resolve (the session is then cleared),
    /// or [`ErrorKind::Superseded`].
    pub async fn refresh(&self) -> Result<User, ApiError> {
        let generation = self.shared.begin();

        let Some(token) = self.api.tokens().load() else {
            self.shared.update(Session::sign_out);
            return Err(ApiError::not_authenticated());
        };

        self.shared.update(|s| {
            s.token = Some(token);
            if !s.status.is_authenticated() {
                s.status = SessionStatus::Authenticating;
            }
            s.error = None;
        });

        let fetched = self.api.current_user().await;
        if !self.shared.is_current(generation) {
            debug!("discarding superseded refresh");
            return Err(ApiError::superseded());
        }
        match fetched {
            Ok(user) => {
                debug!(user_id = user.id, "session resolved");
                let cached = user.clone();
                self.shared.update(|s| {
                    s.user = Some(cached);
                    s.status = SessionStatus::Authenticated;
                });
                Ok(user)
            }
            Err(err) => {
                warn!(code = err.code(), "stored token did not resolve; signing out");
                self.api.tokens().clear();
                self.shared.update(Session::sign_out);
                Err(err)
            }
        }
    }

    /// Update username and/or email, replacing the cached user with the
    /// server's copy.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Unauthorized`] without a session, a validation
    /// error, or the API error.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<User, ApiError> {
        self.require_token()?;
        if let Err(err) = validate::profile_update(&update) {
            self.record_error(&err);
            return Err(err);
        }
        self.shared.update(|s| s.error = None);

        match self.api.update_current_user(&update).await {
            Ok(user) => {
                info!(user_id = user.id, "profile updated");
                let cached = user.clone();
                self.shared.update(|s| {
                    if s.status.is_authenticated() {
                        s.user = Some(cached);
                    }
                });
                Ok(user)
            }
            Err(err) => {
                self.record_error(&err);
                Err(err)
            }
        }
    }

    /// Change the account password. Session state is unchanged on success.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Unauthorized`] without a session, a validation
    /// error, or the API error.
    pub async fn change_password(&self, change: PasswordChange) -> Result<(), ApiError> {
        self.require_token()?;
        if let Err(err) = validate::password_change(&change) {
            self.record_error(&err);
            return Err(err);
        }
        self.shared.update(|s| s.error = None);

        match self.api.change_password(&change).await {
            Ok(()) => {
                info!("password changed");
                Ok(())
            }
            Err(err) => {
                self.record_error(&err);
                Err(err)
            }
        }
    }

    /// Fetch the registration flag. Any failure hides registration.
    pub async fn probe_registration(&self) -> bool {
        let enabled = match self.api.registration_status().await {
            Ok(status) => status.enabled,
            Err(err) => {
                warn!(code = err.code(), error = %err, "registration status probe failed; hiding registration");
                false
            }
        };
        self.shared.update(|s| s.registration_enabled = enabled);
        enabled
    }

    fn require_token(&self) -> Result<(), ApiError> {
        if self.api.tokens().load().is_some() {
            Ok(())
        } else {
            let err = ApiError::not_authenticated();
            self.record_error(&err);
            Err(err)
        }
    }

    /// A failed login ends any previous session: `Failed` never holds a token.
    fn fail(&self, err: &ApiError) {
        warn!(code = err.code(), "login failed");
        self.api.tokens().clear();
        let reason = err.message.clone();
        self.shared.update(|s| {
            s.sign_out();
            s.status = SessionStatus::Failed(reason.clone());
            s.error = Some(reason);
        });
    }

    /// Rejected input leaves an existing or restoring session alone.
    fn reject_login_input(&self, err: &ApiError) {
        let message = err.message.clone();
        self.shared.update(|s| {
            if s.token.is_none() {
                s.user = None;
                s.status = SessionStatus::Failed(message.clone());
            }
            s.error = Some(message);
        });
    }

    /// Drop a token saved by a superseded login unless a newer operation
    /// picked it up from storage.
    fn discard_token(&self, token: &str) {
        if self.shared.session.borrow().token.as_deref() == Some(token) {
            return;
        }
        if self.api.tokens().load().as_deref() == Some(token) {
            debug!("clearing token saved by a superseded login");
            self.api.tokens().clear();
        }
    }

    fn record_error(&self, err: &ApiError) {
        let message = err.message.clone();
        self.shared.update(|s| s.error = Some(message));
    }
}
