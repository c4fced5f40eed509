//! Handle to a running route session.

use geo::Coord;
use rota_core::{RouteGeometry, Waypoint, WaypointList};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::actor::{Actor, Collaborators, Event, Outputs};
use crate::config::SessionConfig;
use crate::error::{Notice, SessionError};

/// A running session: one event loop owning the waypoint list.
///
/// Mutating calls enqueue an event and return immediately; the loop applies
/// them in call order. Observe results through the `watch_*` receivers or
/// the snapshot accessors.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use geo::Coord;
/// use rota_core::Waypoint;
/// use rota_core::test_support::{ManualGeolocation, MemoryStateStore, StraightLineRouteClient};
/// use rota_session::{Collaborators, RouteSession, SessionConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), rota_session::SessionError> {
/// let session = RouteSession::start(
///     SessionConfig::default(),
///     Collaborators {
///         router: Arc::new(StraightLineRouteClient),
///         geolocation: Arc::new(ManualGeolocation::default()),
///         store: Arc::new(MemoryStateStore::default()),
///     },
/// );
/// session.started().await?;
/// session.append(Waypoint::user(Coord { x: -46.63, y: -23.55 }, "Depot"))?;
/// session.append(Waypoint::user(Coord { x: -46.64, y: -23.56 }, "Client"))?;
/// session.idle().await?;
/// assert_eq!(session.geometry().len(), 2);
/// session.shutdown().await
/// # }
/// ```
#[derive(Debug)]
pub struct RouteSession {
    events: mpsc::UnboundedSender<Event>,
    waypoints: watch::Receiver<WaypointList>,
    geometry: watch::Receiver<RouteGeometry>,
    search_text: watch::Receiver<String>,
    notices: broadcast::Sender<Notice>,
    task: JoinHandle<()>,
}

impl RouteSession {
    /// Spawn the event loop on the current Tokio runtime.
    ///
    /// Loading the saved state and subscribing to position fixes start
    /// immediately and race; whichever lands first claims the waypoint list.
    /// Listeners registered through [`RouteSession::notices`] before the
    /// caller first yields see every notice.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    #[must_use]
    pub fn start(config: SessionConfig, collaborators: Collaborators) -> Self {
        let (events, queue) = mpsc::unbounded_channel();
        let (waypoints_tx, waypoints) = watch::channel(WaypointList::default());
        let (geometry_tx, geometry) = watch::channel(RouteGeometry::empty());
        let (search_tx, search_text) = watch::channel(String::new());
        let (notices, _) = broadcast::channel(config.notice_capacity.max(1));
        let outputs = Outputs {
            waypoints: waypoints_tx,
            geometry: geometry_tx,
            search_text: search_tx,
            notices: notices.clone(),
        };
        let actor = Actor::new(config, collaborators, queue, events.downgrade(), outputs);
        let task = tokio::spawn(actor.run());
        Self {
            events,
            waypoints,
            geometry,
            search_text,
            notices,
            task,
        }
    }

    fn post(&self, event: Event) -> Result<(), SessionError> {
        self.events.send(event).map_err(|_| SessionError::Stopped)
    }

    async fn request(
        &self,
        event: impl FnOnce(oneshot::Sender<()>) -> Event,
    ) -> Result<(), SessionError> {
        let (reply, done) = oneshot::channel();
        self.post(event(reply))?;
        done.await.map_err(|_| SessionError::Stopped)
    }

    /// Append a user-selected waypoint.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stopped`] after shutdown.
    pub fn append(&self, waypoint: Waypoint) -> Result<(), SessionError> {
        self.post(Event::Append(waypoint))
    }

    /// Remove the waypoint at `index`.
    ///
    /// An out-of-range index is a caller bug: it is logged and ignored in
    /// release builds and aborts the session in debug builds.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stopped`] after shutdown.
    pub fn remove(&self, index: usize) -> Result<(), SessionError> {
        self.post(Event::Remove(index))
    }

    /// Make index 0 a live origin at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stopped`] after shutdown.
    pub fn recenter_on_user(&self, location: Coord) -> Result<(), SessionError> {
        self.post(Event::Recenter(location))
    }

    /// Request the device position and recenter the origin on it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Location`] when no position is available; a
    /// permission denial is also published as a notice. The waypoint list is
    /// untouched on failure.
    pub async fn recenter_on_current_position(&self) -> Result<(), SessionError> {
        let (reply, done) = oneshot::channel();
        self.post(Event::RecenterFromDevice(reply))?;
        done.await.map_err(|_| SessionError::Stopped)?
    }

    /// Replace the search text.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stopped`] after shutdown.
    pub fn set_search_text(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.post(Event::SetSearchText(text.into()))
    }

    /// Wait until the saved state has been applied (or skipped) and the
    /// position watch has been set up (or refused).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stopped`] after shutdown.
    pub async fn started(&self) -> Result<(), SessionError> {
        self.request(Event::WhenStarted).await
    }

    /// Wait until no debounce window or route query is pending.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stopped`] after shutdown.
    pub async fn idle(&self) -> Result<(), SessionError> {
        self.request(Event::WhenIdle).await
    }

    /// Current waypoint list.
    #[must_use]
    pub fn waypoints(&self) -> WaypointList {
        self.waypoints.borrow().clone()
    }

    /// Current route geometry; empty when no route is valid.
    #[must_use]
    pub fn geometry(&self) -> RouteGeometry {
        self.geometry.borrow().clone()
    }

    /// Current search text.
    #[must_use]
    pub fn search_text(&self) -> String {
        self.search_text.borrow().clone()
    }

    /// Receiver notified on every waypoint list change.
    #[must_use]
    pub fn watch_waypoints(&self) -> watch::Receiver<WaypointList> {
        self.waypoints.clone()
    }

    /// Receiver notified on every published geometry.
    #[must_use]
    pub fn watch_geometry(&self) -> watch::Receiver<RouteGeometry> {
        self.geometry.clone()
    }

    /// Subscribe to user-facing notices.
    #[must_use]
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Stop the session.
    ///
    /// Cancels the position watch, waits for pending saves to finish and
    /// ends the event loop. In-flight route queries are left to finish on
    /// their own; their results are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Crashed`] when the event loop panicked.
    pub async fn shutdown(self) -> Result<(), SessionError> {
        // A send error means the loop already ended; joining reports how.
        drop(self.events.send(Event::Shutdown));
        self.task.await.map_err(|err| SessionError::Crashed {
            message: err.to_string(),
        })
    }
}
