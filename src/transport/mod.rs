//! Request/response seam between session operations and the remote API.
//!
//! The [`Transport`] trait decouples the session core from how requests
//! are built, authenticated and sent. [`http::HttpTransport`] is the
//! production implementation; tests substitute in-process fakes.

pub mod http;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::Result;

/// Base path of the update session resource.
pub const UPDATE_SESSION_PATH: &str = "/com/vmware/content/library/item/update-session";

/// Request verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read a resource or collection.
    Get,
    /// Create a resource or invoke an action on one.
    Post,
    /// Remove a resource.
    Delete,
}

impl Method {
    /// Uppercase HTTP verb.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// Named action on an existing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Request cancellation.
    Cancel,
    /// Commit the staged content.
    Complete,
    /// Mark the session failed.
    Fail,
    /// Refresh the inactivity expiration.
    KeepAlive,
}

impl SessionAction {
    /// Wire name used in the `~action` query parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cancel => "cancel",
            Self::Complete => "complete",
            Self::Fail => "fail",
            Self::KeepAlive => "keep-alive",
        }
    }
}

impl Display for SessionAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locator for the update session collection, one session, or an action on one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    /// Session identifier; `None` addresses the collection.
    pub id: Option<String>,
    /// Action suffix.
    pub action: Option<SessionAction>,
}

impl Resource {
    /// The session collection.
    #[must_use]
    pub fn collection() -> Self {
        Self::default()
    }

    /// A single session.
    #[must_use]
    pub fn session(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            action: None,
        }
    }

    /// Attach an action to this locator.
    #[must_use]
    pub fn with_action(mut self, action: SessionAction) -> Self {
        self.action = Some(action);
        self
    }
}

impl Display for Resource {
    /// Renders `/…/update-session[/id:{id}][?~action={action}]`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(UPDATE_SESSION_PATH)?;
        if let Some(id) = &self.id {
            write!(f, "/id:{id}")?;
        }
        if let Some(action) = self.action {
            write!(f, "?~action={action}")?;
        }
        Ok(())
    }
}

/// One remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Verb.
    pub method: Method,
    /// Target locator.
    pub resource: Resource,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
}

impl Request {
    /// Request without a body.
    #[must_use]
    pub fn new(method: Method, resource: Resource) -> Self {
        Self {
            method,
            resource,
            body: None,
        }
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Request-execution collaborator.
///
/// Implementations must map every non-success outcome to an error;
/// `Ok(None)` is reserved for a successful empty response.
pub trait Transport: Send + Sync {
    /// Execute `request` and return the decoded response payload.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Transport`](crate::AppError::Transport) for
    /// network failures, non-success statuses and unreadable bodies.
    fn execute(
        &self,
        request: Request,
    ) -> Pin<Box<dyn Future<Output = Result<Option<serde_json::Value>>> + Send + '_>>;
}
