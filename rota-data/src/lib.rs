//! Adapters connecting the Rota core to the outside world.
//!
//! Responsibilities:
//! - Query a remote routing provider ([`routing::HttpRouteQueryClient`]).
//! - Fetch typeahead address suggestions ([`geocoding::HttpGeocoder`]).
//! - Persist key/value entries to disk ([`store::FileKeyValueStore`]).
//! - Feed position fixes from a platform bridge or a recorded track
//!   ([`geolocation`]).
//!
//! Boundaries:
//! - Do not encode domain rules (live in `rota-core`).
//! - Keep blocking I/O off async executors; prefer async-capable clients.
//!
//! Invariants:
//! - Thread-safe by default where feasible.
//! - No global mutable state.
//! - Credentials never appear in error messages or logs.

#![forbid(unsafe_code)]

mod http;

pub mod geocoding;
pub mod geolocation;
pub mod routing;
pub mod store;

pub use http::{ClientBuildError, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
