//! Typed failure taxonomy for API calls.
//!
//! DESIGN
//! ======
//! [`ApiError`] is produced only at the API client boundary. Callers branch
//! on [`ErrorKind`] and show [`ApiError::message`]; nothing downstream ever
//! inspects status codes or response bodies.
//!
//! The message is the most specific text available: the server's structured
//! error body when it has one, otherwise a fixed default for the kind.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

use super::transport::TransportError;

/// Failure category with a stable grepable code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected locally before any request was sent.
    Validation,
    /// 400.
    BadRequest,
    /// 401. Invalidates the session.
    Unauthorized,
    /// 403.
    Forbidden,
    /// 404.
    NotFound,
    /// 409.
    Conflict,
    /// 422.
    UnprocessableEntity,
    /// 429.
    RateLimited,
    /// Any 5xx.
    ServerError,
    /// No response received (connection failure or timeout).
    Network,
    /// Anything else, including undecodable success bodies.
    Unknown,
    /// A newer session operation started before this one completed.
    Superseded,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            422 => Self::UnprocessableEntity,
            429 => Self::RateLimited,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Validation => "E_VALIDATION",
            Self::BadRequest => "E_BAD_REQUEST",
            Self::Unauthorized => "E_UNAUTHORIZED",
            Self::Forbidden => "E_FORBIDDEN",
            Self::NotFound => "E_NOT_FOUND",
            Self::Conflict => "E_CONFLICT",
            Self::UnprocessableEntity => "E_UNPROCESSABLE_ENTITY",
            Self::RateLimited => "E_RATE_LIMITED",
            Self::ServerError => "E_SERVER_ERROR",
            Self::Network => "E_NETWORK",
            Self::Unknown => "E_UNKNOWN",
            Self::Superseded => "E_SUPERSEDED",
        }
    }

    /// Whether a caller-driven retry could plausibly succeed.
    pub fn retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError | Self::Network)
    }

    pub fn default_message(self) -> &'static str {
        match self {
            Self::Validation => "Please check your input.",
            Self::BadRequest => "Invalid request. Please check your input.",
            Self::Unauthorized => "Authentication required. Please log in.",
            Self::Forbidden => "You do not have permission to perform this action.",
            Self::NotFound => "The requested resource was not found.",
            Self::Conflict => "A conflict occurred. The resource may already exist.",
            Self::UnprocessableEntity => "Validation error. Please check your input.",
            Self::RateLimited => "Too many requests. Please try again later.",
            Self::ServerError => "Server error. Please try again later.",
            Self::Network => "Unable to reach the server. Please check your connection.",
            Self::Unknown => "An unexpected error occurred. Please try again.",
            Self::Superseded => "This request was replaced by a newer one.",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    /// User-visible text.
    pub message: String,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), status: None }
    }

    /// Local input rejection; no request was sent.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Operation needs a session but no token is stored.
    pub fn not_authenticated() -> Self {
        Self::new(ErrorKind::Unauthorized, ErrorKind::Unauthorized.default_message())
    }

    pub fn superseded() -> Self {
        Self::new(ErrorKind::Superseded, ErrorKind::Superseded.default_message())
    }

    pub fn network(err: &TransportError) -> Self {
        let message = if err.timed_out {
            "The request timed out. Please try again."
        } else {
            ErrorKind::Network.default_message()
        };
        Self::new(ErrorKind::Network, message)
    }

    /// Error for a 2xx response whose body did not match the expected schema.
    pub fn decode(status: u16, err: &serde_json::Error) -> Self {
        tracing::warn!(status, error = %err, "unexpected response body");
        Self { status: Some(status), ..Self::new(ErrorKind::Unknown, ErrorKind::Unknown.default_message()) }
    }

    /// Error for a non-2xx response.
    pub fn from_response(status: u16, body: &str) -> Self {
        let kind = ErrorKind::from_status(status);
        let message = server_message(body).unwrap_or_else(|| kind.default_message().to_owned());
        Self { kind, message, status: Some(status) }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn retryable(&self) -> bool {
        self.kind.retryable()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }
}

/// Extract the human-readable message from a structured error body.
///
/// Precedence: `detail` string, `detail` list (validation errors, joined),
/// then `errors` list (joined). Returns `None` for anything else.
pub fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    match value.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => return Some(detail.clone()),
        Some(Value::Array(items)) => {
            if let Some(joined) = join_messages(items) {
                return Some(joined);
            }
        }
        _ => {}
    }

    match value.get("errors") {
        Some(Value::Array(items)) => join_messages(items),
        _ => None,
    }
}

fn join_messages(items: &[Value]) -> Option<String> {
    let parts: Vec<&str> = items
        .iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text.as_str()),
            Value::Object(fields) => fields.get("msg").and_then(Value::as_str),
            _ => None,
        })
        .filter(|text| !text.trim().is_empty())
        .collect();
    if parts.is_empty() { None } else { Some(parts.join(", ")) }
}
