//! Live device position.
//!
//! A [`GeolocationStream`] produces position fixes once location permission
//! has been granted. Consumers subscribe with a callback and receive a
//! [`Subscription`]; dropping or cancelling it must stop the underlying
//! location updates. A stream is not restartable: after cancellation the
//! consumer subscribes again.

mod filter;

use async_trait::async_trait;
use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use filter::MinDistanceFilter;

/// Default minimum distance between delivered fixes, in metres.
pub const DEFAULT_MIN_DISTANCE_M: f64 = 10.0;

/// Errors raised by a [`GeolocationStream`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    /// The user declined location access.
    #[error("location permission denied")]
    PermissionDenied,
    /// No position could be obtained.
    #[error("location unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

/// A single position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionFix {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Horizontal accuracy in metres, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
}

impl PositionFix {
    /// Build a fix without accuracy information.
    #[must_use]
    pub const fn at(location: Coord) -> Self {
        Self {
            latitude: location.y,
            longitude: location.x,
            accuracy_m: None,
        }
    }

    /// Position as a `geo` coordinate (`x = longitude`, `y = latitude`).
    #[must_use]
    pub const fn location(&self) -> Coord {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}

/// Requested accuracy of position fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    /// Coarse, battery-friendly fixes.
    Balanced,
    /// Best available fixes.
    #[default]
    High,
}

/// Options for a position watch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    /// Requested accuracy.
    pub accuracy: Accuracy,
    /// Minimum distance between delivered fixes, in metres.
    pub min_distance_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::High,
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
        }
    }
}

impl WatchOptions {
    /// Set the minimum distance between delivered fixes.
    #[must_use]
    pub const fn with_min_distance_m(mut self, min_distance_m: f64) -> Self {
        self.min_distance_m = min_distance_m;
        self
    }
}

/// Callback receiving each delivered fix.
pub type FixCallback = Box<dyn FnMut(PositionFix) + Send>;

/// Handle that keeps a watch alive.
///
/// Cancellation runs exactly once, either through [`Subscription::cancel`]
/// or on drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap the function that stops the underlying updates.
    #[must_use]
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop the underlying location updates.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Source of live position fixes.
#[async_trait]
pub trait GeolocationStream: Send + Sync {
    /// Start watching the device position.
    ///
    /// Awaiting this call may prompt the user for permission.
    ///
    /// # Errors
    ///
    /// Returns [`GeolocationError::PermissionDenied`] when access is declined.
    async fn subscribe(
        &self,
        options: WatchOptions,
        on_fix: FixCallback,
    ) -> Result<Subscription, GeolocationError>;

    /// Request a single fix.
    ///
    /// # Errors
    ///
    /// Returns [`GeolocationError::PermissionDenied`] when access is declined
    /// and [`GeolocationError::Unavailable`] when no fix can be obtained.
    async fn current_position(&self) -> Result<PositionFix, GeolocationError>;
}
