//! Position sources implementing [`rota_core::geolocation::GeolocationStream`].
//!
//! - [`ChannelGeolocation`] relays fixes pushed by a platform bridge through
//!   a [`FixFeeder`].
//! - [`ReplayGeolocation`] plays back a recorded track at a fixed interval.
//!
//! Both apply the watch's minimum distance with
//! [`MinDistanceFilter`](rota_core::geolocation::MinDistanceFilter) and
//! deliver fixes from a Tokio task that is aborted when the subscription is
//! cancelled.

mod channel;
mod replay;

use rota_core::geolocation::{FixCallback, MinDistanceFilter, PositionFix, Subscription};
use tokio::task::JoinHandle;

pub use channel::{ChannelGeolocation, FixFeeder};
pub use replay::{DEFAULT_REPLAY_INTERVAL, ReplayGeolocation};

/// Whether the user granted location access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    /// Fixes may be delivered.
    #[default]
    Granted,
    /// Every request fails with `PermissionDenied`.
    Denied,
}

/// Callback wrapper applying the minimum-distance filter.
struct FilteredSink {
    filter: MinDistanceFilter,
    on_fix: FixCallback,
}

impl FilteredSink {
    fn new(min_distance_m: f64, on_fix: FixCallback) -> Self {
        Self {
            filter: MinDistanceFilter::new(min_distance_m),
            on_fix,
        }
    }

    fn deliver(&mut self, fix: PositionFix) {
        if self.filter.admit(&fix) {
            (self.on_fix)(fix);
        } else {
            log::trace!("dropping fix within minimum distance: {fix:?}");
        }
    }
}

/// Subscription that aborts the delivery task.
fn abort_on_cancel(task: JoinHandle<()>) -> Subscription {
    Subscription::new(move || task.abort())
}
