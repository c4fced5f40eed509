//! Facade crate for the Rota route planner.
//!
//! This crate re-exports the core domain types and exposes the adapters and
//! the session event loop behind feature flags.

#![forbid(unsafe_code)]

pub use rota_core::{
    InitialClaim, KeyValueStateStore, KeyValueStore, LIVE_ORIGIN_ADDRESS, Mutation,
    PersistedState, PersistedStateStore, ReconcileError, RouteError, RouteGeometry,
    RouteQueryClient, StorageError, TravelMode, VehicleProfile, Waypoint, WaypointList,
    WaypointReconciler, geolocation, sync,
};

#[cfg(feature = "data")]
pub use rota_data::{geocoding, routing, store};

#[cfg(feature = "session")]
pub use rota_session::{
    Collaborators, Notice, RouteSession, SessionConfig, SessionError,
};
