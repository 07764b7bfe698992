//! Leptos bindings for the session projection.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read the session through an `RwSignal<SessionSnapshot>` kept
//! in context. The manager pushes every change into the signal, so views
//! and route guards never call the manager to poll.

#[cfg(test)]
#[path = "reactive_test.rs"]
mod reactive_test;

use leptos::prelude::*;

#[cfg(feature = "hydrate")]
use crate::config::{ClientConfig, ConfigError};
#[cfg(feature = "hydrate")]
use crate::net::browser::BrowserTransport;
use crate::net::transport::Transport;
use crate::session::{SessionManager, SessionSnapshot, SubscriptionId};
use crate::storage::StorageArea;
#[cfg(feature = "hydrate")]
use crate::storage::web::{WebStorageArea, browser_token_store};

pub const LOGIN_ROUTE: &str = "/login";

/// Mirror the manager's snapshot into a new signal.
///
/// The signal starts at the current snapshot. Pass the returned id to
/// [`SessionManager::unsubscribe`] to stop updates.
pub fn bind_signal<T, S>(manager: &SessionManager<T, S>) -> (RwSignal<SessionSnapshot>, SubscriptionId)
where
    T: Transport,
    S: StorageArea,
{
    let signal = RwSignal::new(manager.snapshot());
    let id = manager.subscribe(move |snapshot| {
        if signal.try_set(snapshot.clone()).is_some() {
            tracing::debug!("session signal disposed; dropping update");
        }
    });
    (signal, id)
}

/// Bind the manager's snapshot and provide the signal as context for the
/// lifetime of the app.
pub fn provide_session<T, S>(manager: &SessionManager<T, S>) -> RwSignal<SessionSnapshot>
where
    T: Transport,
    S: StorageArea,
{
    let (signal, _) = bind_signal(manager);
    provide_context(signal);
    signal
}

/// Manager wired to `gloo-net` and browser storage, configured at build time.
///
/// # Errors
///
/// Returns [`ConfigError`] if a `CATWEIGHT_*` build variable is malformed.
#[cfg(feature = "hydrate")]
pub fn browser_session() -> Result<SessionManager<BrowserTransport, WebStorageArea>, ConfigError> {
    init_browser_logging(log::Level::Info);
    let config = ClientConfig::from_build_env()?;
    let tokens = browser_token_store(&config);
    Ok(SessionManager::new(BrowserTransport, tokens, config))
}

/// Route `tracing` events to the browser console through `log`. Safe to
/// call more than once.
#[cfg(feature = "hydrate")]
pub fn init_browser_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    // Err means a logger is already installed.
    let _ = console_log::init_with_level(level);
}

/// Route a guard should send the viewer to, if any.
pub fn unauth_redirect(snapshot: &SessionSnapshot) -> Option<&'static str> {
    snapshot.should_redirect_unauth().then_some(LOGIN_ROUTE)
}

/// Navigate to the login route whenever the session settles unauthenticated.
pub fn install_unauth_redirect<F>(session: RwSignal<SessionSnapshot>, navigate: F)
where
    F: Fn(&str) + 'static,
{
    Effect::new(move || {
        if let Some(route) = session.with(unauth_redirect) {
            navigate(route);
        }
    });
}
