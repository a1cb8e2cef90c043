//! Update session lifecycle: remote operations and the settle wait.
//!
//! The server owns the state machine; this client only requests
//! transitions and observes the result.
//!
//! ```text
//!           create
//!   (none) -------> ACTIVE
//!   ACTIVE -------> DONE      [terminal]
//!   ACTIVE -------> CANCELED  [terminal]
//!   ACTIVE -------> ERROR     [terminal]
//!   any ---delete-> (removed)
//! ```

pub mod keep_alive;
pub mod manager;
pub mod waiter;

pub use keep_alive::spawn_keep_alive;
pub use manager::SessionManager;
pub use waiter::{wait_until_settled, PollCallback, Waiter};
