//! Event loop that keeps a multi-stop route in step with the device.
//!
//! A [`RouteSession`] owns the waypoint list on a single Tokio task. User
//! edits, live position fixes, the saved state loaded at startup and route
//! query completions are all serialised through its event queue, so no two
//! mutations interleave. The session:
//!
//! - applies the reconciliation rules of
//!   [`WaypointReconciler`](rota_core::WaypointReconciler);
//! - debounces list changes and sequences route queries with
//!   [`RouteSync`](rota_core::sync::RouteSync), driving its deadlines from
//!   `tokio::time`;
//! - saves the waypoints and search text after every change on a background
//!   worker, logging failures;
//! - publishes the list and geometry through `watch` channels and
//!   one-shot [`Notice`]s through a `broadcast` channel.

#![forbid(unsafe_code)]

mod actor;
mod config;
mod error;
mod persist;
mod session;

pub use actor::Collaborators;
pub use config::{DEFAULT_NOTICE_CAPACITY, SessionConfig};
pub use error::{Notice, SessionError};
pub use session::RouteSession;
