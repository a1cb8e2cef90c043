//! Client configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Keychain service holding the API session token.
pub const KEYRING_SERVICE: &str = "update-session";

/// Keychain entry name for the API session token.
pub const KEYRING_TOKEN_KEY: &str = "api_session_id";

/// Environment variable consulted when the keychain has no token.
pub const TOKEN_ENV_VAR: &str = "VAPI_SESSION_ID";

/// Per-request timeout settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TimeoutConfig {
    /// Upper bound for a single remote round-trip.
    #[serde(default = "default_request_seconds")]
    pub request_seconds: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_seconds: default_request_seconds(),
        }
    }
}

/// Wait loop and keep-alive cadence.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct WaitConfig {
    /// Fixed delay between status polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Delay between keep-alive requests.
    #[serde(default = "default_keep_alive_seconds")]
    pub keep_alive_seconds: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            keep_alive_seconds: default_keep_alive_seconds(),
        }
    }
}

fn default_request_seconds() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_keep_alive_seconds() -> u64 {
    60
}

fn default_base_path() -> String {
    "/rest".into()
}

/// Client configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ClientConfig {
    /// Endpoint host name, or a full `http(s)://` origin.
    pub host: String,
    /// Path prefix of the REST API.
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Accept invalid TLS certificates (lab endpoints only).
    #[serde(default)]
    pub insecure: bool,
    /// Request timeouts.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Polling and keep-alive cadence.
    #[serde(default)]
    pub wait: WaitConfig,
    /// API session token (populated at runtime).
    #[serde(skip)]
    pub session_token: String,
}

impl ClientConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the API session token from OS keychain with env-var fallback.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither keychain nor environment
    /// provide a non-empty token.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.session_token = load_credential(KEYRING_TOKEN_KEY, TOKEN_ENV_VAR).await?;
        Ok(())
    }

    /// Origin plus base path, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        let origin = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_owned()
        } else {
            format!("https://{host}")
        };
        let path = self.base_path.trim_matches('/');
        if path.is_empty() {
            origin
        } else {
            format!("{origin}/{path}")
        }
    }

    /// Delay between status polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.wait.poll_interval_ms)
    }

    /// Delay between keep-alive requests.
    #[must_use]
    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.wait.keep_alive_seconds)
    }

    /// Upper bound for one round-trip.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.request_seconds)
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::Config("host must not be empty".into()));
        }

        if self.timeouts.request_seconds == 0 {
            return Err(AppError::Config(
                "timeouts.request_seconds must be greater than zero".into(),
            ));
        }

        if self.wait.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "wait.poll_interval_ms must be greater than zero".into(),
            ));
        }

        if self.wait.keep_alive_seconds == 0 {
            return Err(AppError::Config(
                "wait.keep_alive_seconds must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    match env::var(env_key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
        _ => Err(AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))),
    }
}
