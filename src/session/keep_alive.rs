//! Background keep-alive for long-running uploads.
//!
//! Refreshes a session's inactivity expiration on a fixed interval while
//! content is transferred out-of-band. Stops on cancellation or on the
//! first failed request.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use super::manager::SessionManager;

/// Spawn the keep-alive task for `session_id`.
///
/// The first keep-alive is sent one full `interval` after spawning. The
/// task exits on cancellation or on the first failed keep-alive.
#[must_use]
pub fn spawn_keep_alive(
    manager: SessionManager,
    session_id: String,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let span = info_span!("keep_alive", session_id = %session_id);
    tokio::spawn(
        async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        info!("keep-alive task shutting down");
                        break;
                    }
                    () = tokio::time::sleep(interval) => {}
                }

                match manager.keep_alive(&cancel, &session_id).await {
                    Ok(()) => debug!("session kept alive"),
                    Err(err) if err.is_cancelled() => {
                        info!("keep-alive task shutting down");
                        break;
                    }
                    Err(err) => {
                        warn!(%err, "keep-alive rejected, stopping");
                        break;
                    }
                }
            }
        }
        .instrument(span),
    )
}
