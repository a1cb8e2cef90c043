//! Blocking wait until an update session leaves `ACTIVE`.
//!
//! Fixed-interval poller with no backoff, jitter, or iteration cap. Any
//! fetch failure ends the wait. Callers that need a deadline cancel the
//! token from a timer.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::manager::SessionManager;
use crate::models::session::{SessionState, UpdateSession};
use crate::{AppError, Result};

/// Per-iteration progress hook, called with the latest `ACTIVE` snapshot.
pub type PollCallback<'a> = dyn FnMut(&UpdateSession) + Send + 'a;

/// Polls one manager at a fixed interval.
#[derive(Clone)]
pub struct Waiter {
    manager: SessionManager,
    poll_interval: Duration,
}

impl Waiter {
    /// Waiter polling through `manager` every `poll_interval`.
    #[must_use]
    pub fn new(manager: SessionManager, poll_interval: Duration) -> Self {
        Self {
            manager,
            poll_interval,
        }
    }

    /// Configured delay between polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// [`wait_until_settled`] with this waiter's interval.
    ///
    /// # Errors
    ///
    /// See [`wait_until_settled`].
    pub async fn wait(
        &self,
        cancel: &CancellationToken,
        id: &str,
        on_each_poll: Option<&mut PollCallback<'_>>,
    ) -> Result<UpdateSession> {
        wait_until_settled(&self.manager, cancel, id, self.poll_interval, on_each_poll).await
    }
}

/// Poll session `id` until its state is no longer `ACTIVE`.
///
/// Each iteration checks `cancel`, fetches a fresh snapshot, and returns
/// it if the session has settled. Otherwise it sleeps `poll_interval`,
/// invokes `on_each_poll` (if any) with the snapshot, and polls again.
/// After `k` active polls the session has been fetched `k + 1` times and
/// the callback invoked `k` times.
///
/// The returned snapshot is the first non-`ACTIVE` one; callers inspect
/// [`UpdateSession::outcome`] to tell `DONE` from `ERROR` or `CANCELED`.
///
/// # Errors
///
/// Returns the fetch error unchanged if any poll fails,
/// `AppError::UnknownState` if the server reports a state this client
/// does not recognize (or none at all), and `AppError::Cancelled` if
/// `cancel` fires before a poll or during the pause between polls.
pub async fn wait_until_settled(
    manager: &SessionManager,
    cancel: &CancellationToken,
    id: &str,
    poll_interval: Duration,
    mut on_each_poll: Option<&mut PollCallback<'_>>,
) -> Result<UpdateSession> {
    let mut polls: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(cancelled(id, polls));
        }

        let session = manager.get(cancel, id).await?;
        polls += 1;

        match &session.state {
            Some(SessionState::Active) => {}
            Some(SessionState::Unknown(raw)) => {
                return Err(AppError::UnknownState(raw.clone()));
            }
            None => return Err(AppError::UnknownState("absent".into())),
            Some(state) => {
                info!(session_id = id, %state, polls, "update session settled");
                return Ok(session);
            }
        }

        debug!(
            session_id = id,
            polls,
            client_progress = session.client_progress,
            "update session still active"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(cancelled(id, polls)),
            () = tokio::time::sleep(poll_interval) => {}
        }

        if let Some(callback) = on_each_poll.as_deref_mut() {
            callback(&session);
        }
    }
}

fn cancelled(id: &str, polls: u64) -> AppError {
    AppError::Cancelled(format!("wait on session {id} aborted after {polls} polls"))
}
