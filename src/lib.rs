#![forbid(unsafe_code)]

//! Lifecycle client for content library update sessions.
//!
//! [`SessionManager`] issues create/get/list/cancel/complete/fail/
//! keep-alive/delete requests through a pluggable [`Transport`];
//! [`Waiter`] blocks until a session leaves `ACTIVE`.

pub mod config;
pub mod errors;
pub mod models;
pub mod session;
pub mod transport;

pub use config::ClientConfig;
pub use errors::{AppError, Result, TransportError};
pub use models::session::{SessionOutcome, SessionState, UpdateSession};
pub use session::{spawn_keep_alive, wait_until_settled, SessionManager, Waiter};
pub use transport::http::HttpTransport;
pub use transport::Transport;
