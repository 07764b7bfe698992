//! Transport seam between the API client and a concrete HTTP stack.
//!
//! DESIGN
//! ======
//! The API client builds a complete [`HttpRequest`] (URL, bearer, encoded
//! body, timeout) so transports stay dumb: they send bytes and hand back the
//! status and body text. Status interpretation happens in one place,
//! [`super::error::ApiError::from_response`].

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// Pre-encoded request payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    Json(String),
    Form(String),
}

impl RequestBody {
    /// Serialize `value` as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the serde error if `value` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_string(value).map(Self::Json)
    }

    /// Percent-encode `pairs` as an `application/x-www-form-urlencoded` body.
    pub fn form(pairs: &[(&str, &str)]) -> Self {
        let encoded = pairs
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        Self::Form(encoded)
    }

    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::Json(_) => Some(CONTENT_TYPE_JSON),
            Self::Form(_) => Some(CONTENT_TYPE_FORM),
        }
    }

    /// Encoded payload text, if any.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Json(raw) | Self::Form(raw) => Some(raw),
        }
    }
}

/// A fully-built outbound request.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: RequestBody,
    pub timeout_ms: u64,
}

impl HttpRequest {
    /// Value for the `Authorization` header, when a bearer token is attached.
    pub fn authorization(&self) -> Option<String> {
        self.bearer.as_ref().map(|token| format!("Bearer {token}"))
    }
}

// Keeps tokens and form passwords out of logs.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("content_type", &self.body.content_type())
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

/// Raw response: status code plus body text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// No response was received.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub timed_out: bool,
}

impl TransportError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self { message: message.into(), timed_out: false }
    }

    pub fn timed_out(timeout_ms: u64) -> Self {
        Self { message: format!("request timed out after {timeout_ms}ms"), timed_out: true }
    }
}

/// Sends one request. Futures are `!Send`; the session core is single-threaded.
#[async_trait(?Send)]
pub trait Transport {
    /// Send `request` and return whatever status the server produced.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only when no response arrived (network
    /// failure, timeout). Non-2xx statuses are successful sends.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
