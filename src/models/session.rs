//! Update session model and state helpers.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-reported state of an update session.
///
/// Decoded from the wire string. Values this client does not know are kept
/// verbatim in [`SessionState::Unknown`] instead of being folded into one of
/// the known states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionState {
    /// Session accepts content; the upload is still in flight.
    Active,
    /// Server finished processing the staged content.
    Done,
    /// Server or caller failed the session.
    Error,
    /// Server or caller cancelled the session.
    Canceled,
    /// Unrecognized wire value.
    Unknown(String),
}

impl SessionState {
    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Done => "DONE",
            Self::Error => "ERROR",
            Self::Canceled => "CANCELED",
            Self::Unknown(raw) => raw,
        }
    }

    /// `DONE`, `ERROR` and `CANCELED` are terminal. `Unknown` is not.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error | Self::Canceled)
    }
}

impl From<String> for SessionState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "ACTIVE" => Self::Active,
            "DONE" => Self::Done,
            "ERROR" => Self::Error,
            "CANCELED" => Self::Canceled,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<SessionState> for String {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Unknown(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settled result of an update session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Content was accepted.
    Done,
    /// Session failed.
    Error,
    /// Session was cancelled.
    Canceled,
}

/// One upload transaction against a content library item.
///
/// Every field is optional on the wire; empty values are omitted when
/// encoding and defaulted when decoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateSession {
    /// Server-assigned identifier; empty until created.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Target library item.
    #[serde(
        rename = "library_item_id",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub item_id: String,
    /// Content version the session is based on.
    #[serde(
        rename = "library_item_content_version",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub item_content_version: String,
    /// Caller-reported upload progress in percent. Advisory only.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub client_progress: i64,
    /// Server-authoritative state; absent until the server reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<SessionState>,
    /// Time after which the server treats the session as invalid.
    #[serde(
        rename = "expiration_time",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration: Option<DateTime<Utc>>,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde `skip_serializing_if` passes by reference.
fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl UpdateSession {
    /// Build a create descriptor for the given item and content version.
    #[must_use]
    pub fn create_spec(item_id: impl Into<String>, item_content_version: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            item_content_version: item_content_version.into(),
            ..Self::default()
        }
    }

    /// Whether the server still reports the session as `ACTIVE`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == Some(SessionState::Active)
    }

    /// Settled outcome, or `None` while active, unknown, or unreported.
    #[must_use]
    pub fn outcome(&self) -> Option<SessionOutcome> {
        match self.state {
            Some(SessionState::Done) => Some(SessionOutcome::Done),
            Some(SessionState::Error) => Some(SessionOutcome::Error),
            Some(SessionState::Canceled) => Some(SessionOutcome::Canceled),
            _ => None,
        }
    }
}

/// Create request body: the descriptor under the `create_spec` key.
///
/// Only the item fields are forwarded; anything else set on the input
/// descriptor is dropped.
#[derive(Debug, Serialize)]
pub(crate) struct CreateRequest<'a> {
    create_spec: CreateSpec<'a>,
}

#[derive(Debug, Serialize)]
struct CreateSpec<'a> {
    library_item_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    library_item_content_version: &'a str,
}

impl<'a> CreateRequest<'a> {
    pub(crate) fn new(spec: &'a UpdateSession) -> Self {
        Self {
            create_spec: CreateSpec {
                library_item_id: &spec.item_id,
                library_item_content_version: &spec.item_content_version,
            },
        }
    }
}
