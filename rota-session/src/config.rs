//! Session configuration.

use rota_core::VehicleProfile;
use rota_core::geolocation::WatchOptions;
use rota_core::sync::RouteSyncConfig;

/// Default capacity of the notice channel.
pub const DEFAULT_NOTICE_CAPACITY: usize = 16;

/// Configuration for [`RouteSession`](crate::RouteSession).
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Debounce window and query deadline.
    pub sync: RouteSyncConfig,
    /// Options for the position watch.
    pub watch: WatchOptions,
    /// Vehicle sent with every route query.
    pub vehicle: VehicleProfile,
    /// Number of notices buffered for slow listeners.
    pub notice_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sync: RouteSyncConfig::default(),
            watch: WatchOptions::default(),
            vehicle: VehicleProfile::default(),
            notice_capacity: DEFAULT_NOTICE_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Set the debounce and query deadline configuration.
    #[must_use]
    pub const fn with_sync(mut self, sync: RouteSyncConfig) -> Self {
        self.sync = sync;
        self
    }

    /// Set the position watch options.
    #[must_use]
    pub const fn with_watch(mut self, watch: WatchOptions) -> Self {
        self.watch = watch;
        self
    }

    /// Set the vehicle profile.
    #[must_use]
    pub fn with_vehicle(mut self, vehicle: VehicleProfile) -> Self {
        self.vehicle = vehicle;
        self
    }
}
