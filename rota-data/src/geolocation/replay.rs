//! Recorded track played back as live fixes.

use std::io::BufReader;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use camino::Utf8Path;
use rota_core::geolocation::{
    FixCallback, GeolocationError, GeolocationStream, PositionFix, Subscription, WatchOptions,
};

use super::{FilteredSink, Permission, abort_on_cancel};

/// Default delay between replayed fixes.
pub const DEFAULT_REPLAY_INTERVAL: Duration = Duration::from_secs(1);

/// `GeolocationStream` replaying a fixed list of fixes.
///
/// Each subscription replays the track from the start, one fix per
/// interval, and then stays silent. `current_position` answers with the most
/// recently replayed fix, or the first fix of the track before playback.
#[derive(Debug, Clone)]
pub struct ReplayGeolocation {
    track: Arc<[PositionFix]>,
    interval: Duration,
    permission: Permission,
    last: Arc<Mutex<Option<PositionFix>>>,
}

impl ReplayGeolocation {
    /// Replay `track` at `interval`.
    #[must_use]
    pub fn new(track: Vec<PositionFix>, interval: Duration) -> Self {
        Self {
            track: track.into(),
            interval,
            permission: Permission::Granted,
            last: Arc::new(Mutex::new(None)),
        }
    }

    /// Load a JSON track: an array of `{"latitude": .., "longitude": ..}`.
    ///
    /// # Errors
    ///
    /// Returns [`GeolocationError::Unavailable`] when the file cannot be read
    /// or decoded.
    pub fn load(path: &Utf8Path, interval: Duration) -> Result<Self, GeolocationError> {
        let unavailable = |message: String| GeolocationError::Unavailable {
            message: format!("track {path}: {message}"),
        };
        let file = rota_fs::open_utf8_file(path).map_err(|err| unavailable(err.to_string()))?;
        let track: Vec<PositionFix> = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| unavailable(err.to_string()))?;
        log::info!("loaded {} fixes from {path}", track.len());
        Ok(Self::new(track, interval))
    }

    /// Simulate the user's answer to the permission prompt.
    #[must_use]
    pub const fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    /// Number of fixes in the track.
    #[must_use]
    pub fn len(&self) -> usize {
        self.track.len()
    }

    /// Whether the track holds no fixes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.track.is_empty()
    }

    /// Time needed to replay the whole track.
    #[must_use]
    pub fn playback_duration(&self) -> Duration {
        let steps = u32::try_from(self.track.len()).unwrap_or(u32::MAX);
        self.interval.saturating_mul(steps)
    }

    fn ensure_granted(&self) -> Result<(), GeolocationError> {
        match self.permission {
            Permission::Granted => Ok(()),
            Permission::Denied => Err(GeolocationError::PermissionDenied),
        }
    }
}

#[async_trait]
impl GeolocationStream for ReplayGeolocation {
    async fn subscribe(
        &self,
        options: WatchOptions,
        on_fix: FixCallback,
    ) -> Result<Subscription, GeolocationError> {
        self.ensure_granted()?;
        let track = Arc::clone(&self.track);
        let last = Arc::clone(&self.last);
        let interval = self.interval;
        let mut sink = FilteredSink::new(options.min_distance_m, on_fix);
        let task = tokio::spawn(async move {
            for fix in track.iter().copied() {
                *last.lock().unwrap_or_else(PoisonError::into_inner) = Some(fix);
                sink.deliver(fix);
                tokio::time::sleep(interval).await;
            }
            log::debug!("track replay finished");
        });
        Ok(abort_on_cancel(task))
    }

    async fn current_position(&self) -> Result<PositionFix, GeolocationError> {
        self.ensure_granted()?;
        let last = *self.last.lock().unwrap_or_else(PoisonError::into_inner);
        last.or_else(|| self.track.first().copied())
            .ok_or_else(|| GeolocationError::Unavailable {
                message: "track is empty".to_owned(),
            })
    }
}
