//! Session errors and user-facing notices.

use rota_core::RouteError;
use rota_core::geolocation::GeolocationError;
use thiserror::Error;

/// Errors returned by [`RouteSession`](crate::RouteSession) handles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session has shut down and no longer accepts events.
    #[error("route session has stopped")]
    Stopped,
    /// The session task ended abnormally.
    #[error("route session task failed: {message}")]
    Crashed {
        /// Join error detail.
        message: String,
    },
    /// The device position could not be obtained.
    #[error(transparent)]
    Location(#[from] GeolocationError),
}

/// One-shot message the presentation layer should show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The user declined location access.
    LocationPermissionDenied,
    /// The route could not be computed; the geometry has been cleared.
    RouteFailed(RouteError),
}
