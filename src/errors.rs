//! Error types shared across the crate.

use std::fmt::{Display, Formatter};

/// Shared crate result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Failure reported by the transport collaborator.
///
/// Carries the HTTP status when the remote answered, and `None` when the
/// request never produced a response (connect failure, timeout) or the
/// response body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// HTTP status code of a non-success response.
    pub status: Option<u16>,
    /// Remote error body or local failure description.
    pub message: String,
}

impl TransportError {
    /// Failure without a response status.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Non-success response with the given status.
    #[must_use]
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Whether the remote reported the resource as missing or expired.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(code) => write!(f, "status {code}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for TransportError {}

/// Crate error enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Remote call failed: network, non-success status, or malformed response.
    Transport(TransportError),
    /// The caller's cancellation token fired before the operation finished.
    Cancelled(String),
    /// The server reported a session state this client does not recognize.
    UnknownState(String),
    /// Configuration parsing, validation, or credential failure.
    Config(String),
}

impl AppError {
    /// Whether this error came from the caller giving up rather than the remote.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "transport: {err}"),
            Self::Cancelled(msg) => write!(f, "cancelled: {msg}"),
            Self::UnknownState(state) => write!(f, "unknown session state: {state}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        Self::Transport(TransportError {
            status,
            message: err.to_string(),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transport(TransportError::new(format!("malformed response: {err}")))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}
