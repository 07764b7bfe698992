//! HTTP client adapter for the session endpoints.
//!
//! Every request goes through [`ApiClient::send`], which attaches the stored
//! bearer token, applies the configured timeout and maps the outcome into an
//! [`ApiError`]. Typed helpers for the `/auth/*` endpoints sit on top.
//!
//! ERROR HANDLING
//! ==============
//! A 401 for a request that carried the stored token clears the token store
//! and fires the unauthorized hook before the error is returned, so the
//! session core learns about expiry from any request, not only its own.
//! There are no automatic retries.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::cell::RefCell;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::{ApiError, ErrorKind};
use super::transport::{HttpRequest, HttpResponse, Method, RequestBody, Transport};
use super::types::{Credentials, PasswordChange, ProfileUpdate, Registration, RegistrationStatus, TokenResponse, User};
use crate::config::ClientConfig;
use crate::storage::StorageArea;
use crate::storage::token_store::TokenStore;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const ME_PATH: &str = "/auth/me";
pub const PASSWORD_PATH: &str = "/auth/me/password";
pub const REGISTRATION_STATUS_PATH: &str = "/auth/registration-status";

type Hook = Rc<dyn Fn()>;

pub struct ApiClient<T, S> {
    transport: T,
    tokens: Rc<TokenStore<S>>,
    config: ClientConfig,
    on_unauthorized: RefCell<Option<Hook>>,
}

impl<T: Transport, S: StorageArea> ApiClient<T, S> {
    pub fn new(transport: T, tokens: Rc<TokenStore<S>>, config: ClientConfig) -> Self {
        Self { transport, tokens, config, on_unauthorized: RefCell::new(None) }
    }

    pub fn tokens(&self) -> &Rc<TokenStore<S>> {
        &self.tokens
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Register the callback fired after a 401 invalidates the stored token.
    /// Replaces any previous hook.
    pub fn set_unauthorized_hook(&self, hook: impl Fn() + 'static) {
        *self.on_unauthorized.borrow_mut() = Some(Rc::new(hook));
    }

    /// Send a request and return the raw 2xx response. The stored bearer is
    /// attached except for the login and register endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport failures and non-2xx statuses.
    pub async fn send(&self, method: Method, path: &str, body: RequestBody) -> Result<HttpResponse, ApiError> {
        // Identity endpoints never carry the bearer, so a rejected login
        // cannot invalidate the session already held.
        let bearer = if matches!(path, LOGIN_PATH | REGISTER_PATH) { None } else { self.tokens.load() };
        let request = HttpRequest {
            method,
            url: self.config.endpoint(path),
            bearer: bearer.clone(),
            body,
            timeout_ms: self.config.request_timeout_ms,
        };
        debug!(method = method.as_str(), path, authenticated = bearer.is_some(), "api request");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(method = method.as_str(), path, error = %err, "api request failed");
                return Err(ApiError::network(&err));
            }
        };

        if response.is_success() {
            return Ok(response);
        }

        if response.status == 401 {
            if let Some(rejected) = bearer {
                self.invalidate(path, &rejected);
            }
        }
        let err = ApiError::from_response(response.status, &response.body);
        debug!(method = method.as_str(), path, status = response.status, code = err.code(), "api error response");
        Err(err)
    }

    /// Send a request and decode the JSON response body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport failures, non-2xx statuses, and
    /// bodies that do not match `R`.
    pub async fn request<R: DeserializeOwned>(&self, method: Method, path: &str, body: RequestBody) -> Result<R, ApiError> {
        let response = self.send(method, path, body).await?;
        serde_json::from_str(&response.body).map_err(|err| ApiError::decode(response.status, &err))
    }

    /// `POST /auth/login` with form-encoded credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any failure.
    pub async fn login_token(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        let body = RequestBody::form(&[
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ]);
        self.request(Method::Post, LOGIN_PATH, body).await
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any failure.
    pub async fn register(&self, registration: &Registration) -> Result<User, ApiError> {
        self.request(Method::Post, REGISTER_PATH, json_body(registration)?).await
    }

    /// `GET /auth/me` with the stored bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any failure.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.request(Method::Get, ME_PATH, RequestBody::Empty).await
    }

    /// `PUT /auth/me`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any failure.
    pub async fn update_current_user(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.request(Method::Put, ME_PATH, json_body(update)?).await
    }

    /// `PUT /auth/me/password`. The response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any failure.
    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        self.send(Method::Put, PASSWORD_PATH, json_body(change)?).await.map(|_| ())
    }

    /// `GET /auth/registration-status`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any failure.
    pub async fn registration_status(&self) -> Result<RegistrationStatus, ApiError> {
        self.request(Method::Get, REGISTRATION_STATUS_PATH, RequestBody::Empty).await
    }

    fn invalidate(&self, path: &str, rejected: &str) {
        // A newer login may have replaced the token while this request was in
        // flight; only the rejected token is cleared.
        if self.tokens.load().as_deref() != Some(rejected) {
            debug!(path, "401 for a token that is no longer stored");
            return;
        }
        warn!(path, "token rejected; clearing session");
        self.tokens.clear();
        let hook = self.on_unauthorized.borrow().clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}

fn json_body<B: serde::Serialize + ?Sized>(value: &B) -> Result<RequestBody, ApiError> {
    RequestBody::json(value).map_err(|err| {
        warn!(error = %err, "failed to encode request body");
        ApiError::new(ErrorKind::Unknown, ErrorKind::Unknown.default_message())
    })
}
