//! Fixes relayed from a platform location bridge.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rota_core::geolocation::{
    FixCallback, GeolocationError, GeolocationStream, PositionFix, Subscription, WatchOptions,
};
use tokio::sync::watch;

use super::{FilteredSink, Permission};

/// How long `current_position` waits for the bridge's first fix.
const DEFAULT_FIRST_FIX_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
struct Shared {
    permission: Mutex<Permission>,
    subscriptions: AtomicUsize,
}

impl Shared {
    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_granted(&self) -> Result<(), GeolocationError> {
        match self.permission() {
            Permission::Granted => Ok(()),
            Permission::Denied => Err(GeolocationError::PermissionDenied),
        }
    }
}

/// Producer half held by the platform bridge.
#[derive(Debug, Clone)]
pub struct FixFeeder {
    sender: watch::Sender<Option<PositionFix>>,
    shared: Arc<Shared>,
}

impl FixFeeder {
    /// Publish a new fix. Subscribers only ever see the most recent one.
    pub fn push(&self, fix: PositionFix) {
        self.sender.send_replace(Some(fix));
    }

    /// Record the outcome of the platform permission prompt.
    pub fn set_permission(&self, permission: Permission) {
        *self
            .shared
            .permission
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = permission;
    }

    /// Number of subscriptions not yet cancelled, across every clone of
    /// the source.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscriptions.load(Ordering::Acquire)
    }
}

/// `GeolocationStream` fed by a [`FixFeeder`].
///
/// # Example
///
/// ```
/// use geo::Coord;
/// use rota_core::geolocation::{GeolocationStream, PositionFix};
/// use rota_data::geolocation::ChannelGeolocation;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (source, feeder) = ChannelGeolocation::new();
/// feeder.push(PositionFix::at(Coord { x: -46.63, y: -23.55 }));
/// let fix = source.current_position().await.expect("fix available");
/// assert_eq!(fix.latitude, -23.55);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ChannelGeolocation {
    receiver: watch::Receiver<Option<PositionFix>>,
    shared: Arc<Shared>,
    first_fix_timeout: Duration,
}

impl ChannelGeolocation {
    /// Create a source and the feeder that drives it.
    #[must_use]
    pub fn new() -> (Self, FixFeeder) {
        let (sender, receiver) = watch::channel(None);
        let shared = Arc::new(Shared {
            permission: Mutex::new(Permission::Granted),
            subscriptions: AtomicUsize::new(0),
        });
        let source = Self {
            receiver,
            shared: Arc::clone(&shared),
            first_fix_timeout: DEFAULT_FIRST_FIX_TIMEOUT,
        };
        (source, FixFeeder { sender, shared })
    }

    /// Set how long `current_position` waits for a first fix.
    #[must_use]
    pub const fn with_first_fix_timeout(mut self, timeout: Duration) -> Self {
        self.first_fix_timeout = timeout;
        self
    }
}

#[async_trait]
impl GeolocationStream for ChannelGeolocation {
    async fn subscribe(
        &self,
        options: WatchOptions,
        on_fix: FixCallback,
    ) -> Result<Subscription, GeolocationError> {
        self.shared.ensure_granted()?;
        let mut receiver = self.receiver.clone();
        // Only fixes pushed after subscribing are delivered.
        receiver.mark_unchanged();
        let mut sink = FilteredSink::new(options.min_distance_m, on_fix);
        let task = tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                let latest = *receiver.borrow_and_update();
                if let Some(fix) = latest {
                    sink.deliver(fix);
                }
            }
            log::debug!("fix feeder dropped; ending position watch");
        });
        self.shared.subscriptions.fetch_add(1, Ordering::AcqRel);
        let shared = Arc::clone(&self.shared);
        Ok(Subscription::new(move || {
            task.abort();
            shared.subscriptions.fetch_sub(1, Ordering::AcqRel);
        }))
    }

    async fn current_position(&self) -> Result<PositionFix, GeolocationError> {
        self.shared.ensure_granted()?;
        let mut receiver = self.receiver.clone();
        let waited = tokio::time::timeout(
            self.first_fix_timeout,
            receiver.wait_for(Option::is_some),
        )
        .await;
        match waited {
            Ok(Ok(fix)) => (*fix).ok_or_else(|| GeolocationError::Unavailable {
                message: "feeder published an empty fix".to_owned(),
            }),
            Ok(Err(_)) => Err(GeolocationError::Unavailable {
                message: "fix feeder closed".to_owned(),
            }),
            Err(_) => Err(GeolocationError::Unavailable {
                message: format!(
                    "no fix within {}s",
                    self.first_fix_timeout.as_secs()
                ),
            }),
        }
    }
}
