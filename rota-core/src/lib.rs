//! Core domain types for the Rota route planner.
//!
//! The crate owns the rules that keep a multi-stop route in step with the
//! device position and the user's edits:
//!
//! - [`WaypointReconciler`] owns the ordered waypoint list and arbitrates
//!   between hydration, live fixes and edits.
//! - [`sync::RouteSync`] debounces list changes and sequences route queries.
//! - [`RouteQueryClient`], [`geolocation::GeolocationStream`] and
//!   [`PersistedStateStore`] describe the external collaborators.
//!
//! Nothing here touches the network, the filesystem or an async runtime.
//! Adapters live in `rota-data` and the event loop in `rota-session`.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod geolocation;
mod reconciler;
pub mod route;
pub mod store;
pub mod sync;
mod waypoint;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use reconciler::{InitialClaim, Mutation, ReconcileError, WaypointReconciler};
pub use route::{RouteError, RouteQueryClient, TravelMode, VehicleProfile, ensure_routable};
pub use store::{
    KeyValueStateStore, KeyValueStore, PersistedStateStore, SEARCH_TEXT_KEY, StorageError,
    WAYPOINTS_KEY,
};
pub use waypoint::{LIVE_ORIGIN_ADDRESS, PersistedState, RouteGeometry, Waypoint, WaypointList};
