//! Remote lifecycle operations on update sessions.
//!
//! Every operation is one round-trip through the injected [`Transport`],
//! raced against the caller's [`CancellationToken`]. There is no local
//! caching, no retry, and no local state check: the server decides
//! whether an action is valid for the session's current state.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

use super::waiter::Waiter;
use crate::models::session::{CreateRequest, UpdateSession};
use crate::transport::{Method, Request, Resource, SessionAction, Transport};
use crate::{AppError, Result, TransportError};

/// Issues lifecycle requests for update sessions.
///
/// Holds nothing but the shared transport handle; clones are cheap and
/// share the handle.
#[derive(Clone)]
pub struct SessionManager {
    transport: Arc<dyn Transport>,
}

impl SessionManager {
    /// Construct a manager over `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// A [`Waiter`] polling through this manager every `poll_interval`.
    #[must_use]
    pub fn waiter(&self, poll_interval: Duration) -> Waiter {
        Waiter::new(self.clone(), poll_interval)
    }

    /// Create a session for the item and content version in `spec`.
    ///
    /// Only `item_id` and `item_content_version` are sent; other fields
    /// of `spec` are ignored. Invalid specs surface as remote errors.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the remote call fails or returns
    /// an empty id, `AppError::Cancelled` if `cancel` fires first.
    pub async fn create(&self, cancel: &CancellationToken, spec: &UpdateSession) -> Result<String> {
        let span = info_span!("create_session", item_id = %spec.item_id);
        let body = serde_json::to_value(CreateRequest::new(spec))
            .map_err(|err| TransportError::new(format!("failed to encode create spec: {err}")))?;
        let request = Request::new(Method::Post, Resource::collection()).with_body(body);

        let id: String = self.fetch(cancel, request).instrument(span.clone()).await?;
        if id.is_empty() {
            return Err(TransportError::new("create returned an empty session id").into());
        }

        span.in_scope(|| info!(session_id = %id, "update session created"));
        Ok(id)
    }

    /// Fetch a fresh snapshot of session `id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the session does not exist, has
    /// expired, or the remote call fails; `AppError::Cancelled` if
    /// `cancel` fires first.
    pub async fn get(&self, cancel: &CancellationToken, id: &str) -> Result<UpdateSession> {
        let request = Request::new(Method::Get, Resource::session(id));
        let mut session: UpdateSession = self
            .fetch(cancel, request)
            .instrument(info_span!("get_session", session_id = id))
            .await?;
        if session.id.is_empty() {
            id.clone_into(&mut session.id);
        }
        Ok(session)
    }

    /// List session ids in server order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the remote call fails,
    /// `AppError::Cancelled` if `cancel` fires first.
    pub async fn list(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        let request = Request::new(Method::Get, Resource::collection());
        let payload = self
            .dispatch(cancel, request)
            .instrument(info_span!("list_sessions"))
            .await?;
        match payload {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    /// Request cancellation of session `id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the id is unknown, the session is
    /// in an incompatible state, or the remote call fails;
    /// `AppError::Cancelled` if `cancel` fires first.
    pub async fn cancel(&self, cancel: &CancellationToken, id: &str) -> Result<()> {
        self.perform(cancel, id, SessionAction::Cancel).await
    }

    /// Commit the content staged in session `id`.
    ///
    /// # Errors
    ///
    /// Same as [`cancel`](Self::cancel).
    pub async fn complete(&self, cancel: &CancellationToken, id: &str) -> Result<()> {
        self.perform(cancel, id, SessionAction::Complete).await
    }

    /// Mark session `id` as failed.
    ///
    /// # Errors
    ///
    /// Same as [`cancel`](Self::cancel).
    pub async fn fail(&self, cancel: &CancellationToken, id: &str) -> Result<()> {
        self.perform(cancel, id, SessionAction::Fail).await
    }

    /// Refresh the inactivity expiration of session `id` without changing its state.
    ///
    /// # Errors
    ///
    /// Same as [`cancel`](Self::cancel).
    pub async fn keep_alive(&self, cancel: &CancellationToken, id: &str) -> Result<()> {
        self.perform(cancel, id, SessionAction::KeepAlive).await
    }

    /// Remove session `id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the id is unknown or the remote
    /// call fails, `AppError::Cancelled` if `cancel` fires first.
    pub async fn delete(&self, cancel: &CancellationToken, id: &str) -> Result<()> {
        let request = Request::new(Method::Delete, Resource::session(id));
        self.dispatch(cancel, request)
            .instrument(info_span!("delete_session", session_id = id))
            .await?;
        info!(session_id = id, "update session deleted");
        Ok(())
    }

    /// Shared primitive behind the named action entry points.
    async fn perform(
        &self,
        cancel: &CancellationToken,
        id: &str,
        action: SessionAction,
    ) -> Result<()> {
        let request = Request::new(Method::Post, Resource::session(id).with_action(action));
        self.dispatch(cancel, request)
            .instrument(info_span!(
                "session_action",
                session_id = id,
                action = action.as_str()
            ))
            .await?;
        info!(session_id = id, %action, "update session action accepted");
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        request: Request,
    ) -> Result<T> {
        let payload = self
            .dispatch(cancel, request)
            .await?
            .ok_or_else(|| TransportError::new("malformed response: empty body"))?;
        Ok(serde_json::from_value(payload)?)
    }

    async fn dispatch(
        &self,
        cancel: &CancellationToken,
        request: Request,
    ) -> Result<Option<Value>> {
        let method = request.method;
        let resource = request.resource.to_string();
        debug!(method = method.as_str(), %resource, "dispatching request");

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(AppError::Cancelled(format!(
                "{} {resource} aborted",
                method.as_str()
            ))),
            result = self.transport.execute(request) => result,
        }
    }
}
