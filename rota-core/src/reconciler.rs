//! Owner of the authoritative waypoint list.
//!
//! [`WaypointReconciler`] applies user edits, live-position updates and the
//! one-shot startup hydration under a single precedence policy:
//!
//! - Hydration and live-fix seeding compete for the empty list at startup.
//!   Whichever runs first takes the initial claim and the other becomes a
//!   no-op. Any edit or live fix also takes the claim, so a late storage read
//!   never clobbers state the user or the tracker has already produced.
//! - Background tracking only ever moves a waypoint flagged as live origin.
//!   A manually chosen origin is left alone until the user recentres.
//!
//! Every mutator reports whether the list actually changed so callers can
//! emit change notifications only for real changes.

use geo::Coord;
use thiserror::Error;

use crate::{PersistedState, Waypoint, WaypointList};

/// Errors returned by [`WaypointReconciler`] mutators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The requested index does not address a waypoint.
    #[error("waypoint index {index} is out of range for a list of {len}")]
    IndexOutOfRange {
        /// Index supplied by the caller.
        index: usize,
        /// Length of the list at the time of the call.
        len: usize,
    },
}

/// Outcome of a mutator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Mutation {
    /// The list was modified; a change notification is due.
    Changed,
    /// The call was a no-op.
    Unchanged,
}

impl Mutation {
    /// Whether the list was modified.
    #[must_use]
    pub const fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }

    const fn from_bool(changed: bool) -> Self {
        if changed {
            Self::Changed
        } else {
            Self::Unchanged
        }
    }
}

/// Which initialiser (or edit) first claimed the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialClaim {
    /// Startup hydration from persisted state.
    Hydrated,
    /// The first live fix seeded the origin.
    LiveFix,
    /// A user edit or tracker update ran before any initialiser.
    Edited,
}

/// Single owner of the waypoint list.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use rota_core::{Waypoint, WaypointReconciler};
///
/// let mut reconciler = WaypointReconciler::new();
/// let _ = reconciler.seed_from_live_fix(Coord { x: -46.63, y: -23.55 });
/// let _ = reconciler.append(Waypoint::user(Coord { x: -46.64, y: -23.56 }, "Stop"));
/// assert_eq!(reconciler.waypoints().len(), 2);
/// assert!(reconciler.waypoints().live_origin().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct WaypointReconciler {
    waypoints: WaypointList,
    claim: Option<InitialClaim>,
}

impl WaypointReconciler {
    /// Create a reconciler holding an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the current list.
    #[must_use]
    pub const fn waypoints(&self) -> &WaypointList {
        &self.waypoints
    }

    /// The initial claim, if any initialiser or edit has run.
    #[must_use]
    pub const fn claim(&self) -> Option<InitialClaim> {
        self.claim
    }

    const fn take_claim(&mut self, claim: InitialClaim) {
        if self.claim.is_none() {
            self.claim = Some(claim);
        }
    }

    /// Replace the list with persisted state when nothing has claimed it yet.
    ///
    /// Returns [`Mutation::Unchanged`] when a live fix or an edit got there
    /// first; in that case the persisted state is dropped in full.
    pub fn hydrate(&mut self, persisted: PersistedState) -> Mutation {
        if let Some(claim) = self.claim {
            log::debug!("ignoring persisted state; list already claimed by {claim:?}");
            return Mutation::Unchanged;
        }
        self.claim = Some(InitialClaim::Hydrated);
        let changed = self.waypoints != persisted.waypoints;
        self.waypoints = persisted.waypoints;
        Mutation::from_bool(changed)
    }

    /// Seed an empty list with a live-origin waypoint at `location`.
    ///
    /// A hydrated list is never seeded, even when the restored list is empty.
    pub fn seed_from_live_fix(&mut self, location: Coord) -> Mutation {
        if self.claim == Some(InitialClaim::Hydrated) {
            log::debug!("not seeding; list was restored from persisted state");
            return Mutation::Unchanged;
        }
        self.take_claim(InitialClaim::LiveFix);
        if !self.waypoints.is_empty() {
            return Mutation::Unchanged;
        }
        self.waypoints.push(Waypoint::live_origin(location));
        Mutation::Changed
    }

    /// Append a user-selected waypoint to the end of the list.
    ///
    /// The appended waypoint never carries the live-origin flag.
    pub fn append(&mut self, mut waypoint: Waypoint) -> Mutation {
        self.take_claim(InitialClaim::Edited);
        waypoint.is_live_origin = false;
        self.waypoints.push(waypoint);
        Mutation::Changed
    }

    /// Remove the waypoint at `index`.
    ///
    /// Removing the live origin drops the flag with it; no other waypoint
    /// inherits it.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::IndexOutOfRange`] when `index` does not
    /// address a waypoint.
    pub fn remove(&mut self, index: usize) -> Result<Mutation, ReconcileError> {
        let len = self.waypoints.len();
        self.waypoints
            .remove(index)
            .ok_or(ReconcileError::IndexOutOfRange { index, len })?;
        // Only index 0 can hold the flag, so a promoted stop is never live.
        self.take_claim(InitialClaim::Edited);
        Ok(Mutation::Changed)
    }

    /// Move the live origin to `location`.
    ///
    /// No-op unless index 0 is flagged as live origin.
    pub fn apply_live_fix(&mut self, location: Coord) -> Mutation {
        self.take_claim(InitialClaim::Edited);
        match self.waypoints.first_mut() {
            Some(origin) if origin.is_live_origin => {
                if origin.location() == location {
                    return Mutation::Unchanged;
                }
                origin.move_to(location);
                Mutation::Changed
            }
            _ => Mutation::Unchanged,
        }
    }

    /// Make index 0 a live origin at `location`.
    ///
    /// Creates the origin on an empty list and overwrites a manual origin.
    pub fn recenter_on_user(&mut self, location: Coord) -> Mutation {
        self.take_claim(InitialClaim::Edited);
        let replacement = Waypoint::live_origin(location);
        if self.waypoints.origin() == Some(&replacement) {
            return Mutation::Unchanged;
        }
        self.waypoints.set_origin(replacement);
        Mutation::Changed
    }
}
