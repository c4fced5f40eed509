//! Debounced route recomputation.
//!
//! [`RouteSync`] is a sans-IO state machine with three states:
//!
//! - `Idle`: nothing pending.
//! - `Debouncing`: a change arrived; a query is due at the deadline unless
//!   another change pushes the deadline back.
//! - `Querying`: one query is in flight under a sequence number.
//!
//! The machine never reads a clock. Callers pass `now` into every call and
//! ask [`RouteSync::next_deadline`] when to call [`RouteSync::on_deadline`],
//! which keeps debounce and query deadlines testable without wall-clock time.
//! The machine returns [`SyncCommand`]s for the caller to carry out.
//!
//! Only the most recently started query may publish. A result carrying any
//! other sequence number is discarded.

use std::time::{Duration, Instant};

use geo::Coord;

use crate::{RouteError, RouteGeometry, WaypointList};

/// Default quiet period before a query is issued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default time an in-flight query may take before it is abandoned.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Timing configuration for [`RouteSync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSyncConfig {
    /// Quiet period after the last change before querying.
    pub debounce: Duration,
    /// Deadline for an in-flight query.
    pub query_timeout: Duration,
}

impl Default for RouteSyncConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

impl RouteSyncConfig {
    /// Set the debounce window.
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the query deadline.
    #[must_use]
    pub const fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }
}

/// Current state of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing pending.
    Idle,
    /// Waiting for the quiet period to end.
    Debouncing {
        /// When the pending query fires.
        deadline: Instant,
    },
    /// A query is in flight.
    Querying {
        /// Sequence number of the in-flight query.
        seq: u64,
        /// When the query is abandoned.
        deadline: Instant,
    },
}

/// A query the caller must issue.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTicket {
    /// Sequence number to hand back with the result.
    pub seq: u64,
    /// Ordered coordinates: origin, stops, destination.
    pub coordinates: Vec<Coord>,
}

/// Work requested by the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncCommand {
    /// Issue a route query and report back through
    /// [`RouteSync::on_query_result`].
    Query(RouteTicket),
    /// Publish `geometry`, surfacing `error` to the user when present.
    Publish {
        /// Geometry to show; empty clears the route.
        geometry: RouteGeometry,
        /// Failure that caused an empty geometry.
        error: Option<RouteError>,
    },
}

impl SyncCommand {
    const fn clear() -> Self {
        Self::Publish {
            geometry: RouteGeometry::empty(),
            error: None,
        }
    }
}

/// Debounce and sequencing state machine for route queries.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
/// use geo::Coord;
/// use rota_core::{RouteGeometry, Waypoint, WaypointList};
/// use rota_core::sync::{RouteSync, RouteSyncConfig, SyncCommand};
///
/// let mut sync = RouteSync::new(RouteSyncConfig::default());
/// let start = Instant::now();
/// let list = WaypointList::from_waypoints(vec![
///     Waypoint::user(Coord { x: 0.0, y: 0.0 }, "A"),
///     Waypoint::user(Coord { x: 1.0, y: 1.0 }, "B"),
/// ]);
/// assert!(sync.notify_change(&list, start).is_none());
///
/// let fire_at = start + Duration::from_millis(500);
/// let Some(SyncCommand::Query(ticket)) = sync.on_deadline(fire_at) else {
///     panic!("expected a query");
/// };
/// let geometry = RouteGeometry::new(ticket.coordinates.clone());
/// let published = sync.on_query_result(ticket.seq, Ok(geometry.clone()), fire_at);
/// assert!(matches!(published, Some(SyncCommand::Publish { .. })));
/// assert_eq!(sync.geometry(), &geometry);
/// ```
#[derive(Debug, Clone)]
pub struct RouteSync {
    config: RouteSyncConfig,
    state: SyncState,
    latest: Vec<Coord>,
    changed_during_query: bool,
    last_seq: u64,
    geometry: RouteGeometry,
}

impl RouteSync {
    /// Create an idle machine.
    #[must_use]
    pub const fn new(config: RouteSyncConfig) -> Self {
        Self {
            config,
            state: SyncState::Idle,
            latest: Vec::new(),
            changed_during_query: false,
            last_seq: 0,
            geometry: RouteGeometry::empty(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SyncState {
        self.state
    }

    /// Last published geometry.
    #[must_use]
    pub const fn geometry(&self) -> &RouteGeometry {
        &self.geometry
    }

    /// Sequence number of the most recently started query, zero if none.
    #[must_use]
    pub const fn last_seq(&self) -> u64 {
        self.last_seq
    }

    /// When [`RouteSync::on_deadline`] is next due.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            SyncState::Idle => None,
            SyncState::Debouncing { deadline } | SyncState::Querying { deadline, .. } => {
                Some(deadline)
            }
        }
    }

    /// Record a change to the waypoint list.
    ///
    /// Restarts the debounce window, or, while a query is in flight, marks a
    /// fresh debounce cycle to start once it resolves. A list that can no
    /// longer be routed clears the published geometry straight away.
    pub fn notify_change(&mut self, waypoints: &WaypointList, now: Instant) -> Option<SyncCommand> {
        self.latest = waypoints.coordinates();
        match self.state {
            SyncState::Querying { .. } => self.changed_during_query = true,
            SyncState::Idle | SyncState::Debouncing { .. } => {
                self.state = SyncState::Debouncing {
                    deadline: now + self.config.debounce,
                };
            }
        }
        if self.is_routable() {
            None
        } else {
            self.clear_geometry()
        }
    }

    /// Advance past an elapsed deadline.
    ///
    /// Returns `None` when no deadline has elapsed at `now`.
    pub fn on_deadline(&mut self, now: Instant) -> Option<SyncCommand> {
        match self.state {
            SyncState::Debouncing { deadline } if now >= deadline => Some(self.fire(now)),
            SyncState::Querying { seq, deadline } if now >= deadline => {
                let timeout_secs = self.config.query_timeout.as_secs();
                log::warn!("route query {seq} exceeded {timeout_secs}s; abandoning it");
                self.finish_query(now);
                self.geometry = RouteGeometry::empty();
                Some(SyncCommand::Publish {
                    geometry: RouteGeometry::empty(),
                    error: Some(RouteError::Timeout { timeout_secs }),
                })
            }
            SyncState::Idle | SyncState::Debouncing { .. } | SyncState::Querying { .. } => None,
        }
    }

    /// Apply the result of query `seq`.
    ///
    /// Results from anything but the in-flight query are discarded.
    pub fn on_query_result(
        &mut self,
        seq: u64,
        result: Result<RouteGeometry, RouteError>,
        now: Instant,
    ) -> Option<SyncCommand> {
        match self.state {
            SyncState::Querying { seq: current, .. } if current == seq => {}
            SyncState::Idle | SyncState::Debouncing { .. } | SyncState::Querying { .. } => {
                log::debug!(
                    "discarding stale route result {seq}; latest query is {}",
                    self.last_seq
                );
                return None;
            }
        }
        self.finish_query(now);
        match result {
            Ok(geometry) if self.is_routable() => {
                self.geometry = geometry.clone();
                Some(SyncCommand::Publish {
                    geometry,
                    error: None,
                })
            }
            // The list shrank below two while the query ran and was cleared then.
            Ok(_) => None,
            Err(error) => {
                log::warn!("route query {seq} failed: {error}");
                self.geometry = RouteGeometry::empty();
                Some(SyncCommand::Publish {
                    geometry: RouteGeometry::empty(),
                    error: Some(error),
                })
            }
        }
    }

    const fn is_routable(&self) -> bool {
        self.latest.len() >= 2
    }

    fn fire(&mut self, now: Instant) -> SyncCommand {
        if !self.is_routable() {
            self.state = SyncState::Idle;
            self.geometry = RouteGeometry::empty();
            return SyncCommand::clear();
        }
        self.last_seq += 1;
        self.changed_during_query = false;
        self.state = SyncState::Querying {
            seq: self.last_seq,
            deadline: now + self.config.query_timeout,
        };
        SyncCommand::Query(RouteTicket {
            seq: self.last_seq,
            coordinates: self.latest.clone(),
        })
    }

    fn finish_query(&mut self, now: Instant) {
        self.state = if self.changed_during_query {
            SyncState::Debouncing {
                deadline: now + self.config.debounce,
            }
        } else {
            SyncState::Idle
        };
        self.changed_during_query = false;
    }

    fn clear_geometry(&mut self) -> Option<SyncCommand> {
        if self.geometry.is_empty() {
            return None;
        }
        self.geometry = RouteGeometry::empty();
        Some(SyncCommand::clear())
    }
}
