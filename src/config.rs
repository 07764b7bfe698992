//! Client configuration.
//!
//! DESIGN
//! ======
//! Browser builds have no process environment, so [`ClientConfig::from_build_env`]
//! reads the same variables at compile time. Native callers use
//! [`ClientConfig::from_env`]. Both go through one parser so defaults and
//! validation never drift apart.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_BASE_URL: &str = "/api";
pub const DEFAULT_TOKEN_KEY: &str = "token";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

const ENV_API_URL: &str = "CATWEIGHT_API_URL";
const ENV_TOKEN_KEY: &str = "CATWEIGHT_TOKEN_KEY";
const ENV_LEGACY_TOKEN_KEY: &str = "CATWEIGHT_LEGACY_TOKEN_KEY";
const ENV_REQUEST_TIMEOUT_MS: &str = "CATWEIGHT_REQUEST_TIMEOUT_MS";

/// Error returned when a configuration value is present but unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The variable is set to an empty string.
    #[error("config value {0} must not be empty")]
    Empty(&'static str),

    /// The variable could not be parsed into the expected type.
    #[error("config parse failed: {var}={value:?}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix for every API path, without a trailing slash (e.g. `/api`).
    pub api_base_url: String,
    /// Key the bearer token is stored under in the current storage area.
    pub token_key: String,
    /// Key checked in the legacy storage area during migration.
    pub legacy_token_key: String,
    /// Per-request timeout; expiry surfaces as a network error.
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            token_key: DEFAULT_TOKEN_KEY.to_owned(),
            legacy_token_key: DEFAULT_TOKEN_KEY.to_owned(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    /// Build config from process environment variables.
    ///
    /// Optional:
    /// - `CATWEIGHT_API_URL`: default `/api`
    /// - `CATWEIGHT_TOKEN_KEY`: default `token`
    /// - `CATWEIGHT_LEGACY_TOKEN_KEY`: default `token`
    /// - `CATWEIGHT_REQUEST_TIMEOUT_MS`: default 10000
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set but empty or unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from the same variables captured at compile time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a captured value is empty or unparsable.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            let value = match key {
                ENV_API_URL => option_env!("CATWEIGHT_API_URL"),
                ENV_TOKEN_KEY => option_env!("CATWEIGHT_TOKEN_KEY"),
                ENV_LEGACY_TOKEN_KEY => option_env!("CATWEIGHT_LEGACY_TOKEN_KEY"),
                ENV_REQUEST_TIMEOUT_MS => option_env!("CATWEIGHT_REQUEST_TIMEOUT_MS"),
                _ => None,
            };
            value.map(str::to_owned)
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base_url = match lookup(ENV_API_URL) {
            Some(raw) => normalize_base_url(ENV_API_URL, &raw)?,
            None => defaults.api_base_url,
        };
        let token_key = non_empty(ENV_TOKEN_KEY, lookup(ENV_TOKEN_KEY))?.unwrap_or(defaults.token_key);
        let legacy_token_key =
            non_empty(ENV_LEGACY_TOKEN_KEY, lookup(ENV_LEGACY_TOKEN_KEY))?.unwrap_or(defaults.legacy_token_key);
        let request_timeout_ms = match lookup(ENV_REQUEST_TIMEOUT_MS) {
            Some(raw) => parse_timeout(&raw)?,
            None => defaults.request_timeout_ms,
        };

        Ok(Self { api_base_url, token_key, legacy_token_key, request_timeout_ms })
    }

    /// Replace the API base URL, trimming any trailing slash.
    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        url.trim_end_matches('/').clone_into(&mut self.api_base_url);
        self
    }

    /// Absolute (or origin-relative) URL for an API path such as `/auth/me`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }
}

fn normalize_base_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Empty(var));
    }
    Ok(trimmed.to_owned())
}

fn non_empty(var: &'static str, raw: Option<String>) -> Result<Option<String>, ConfigError> {
    match raw {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(var)),
        other => Ok(other),
    }
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(ConfigError::InvalidValue { var: ENV_REQUEST_TIMEOUT_MS, value: raw.to_owned() }),
    }
}
