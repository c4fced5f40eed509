//! In-memory collaborators used by unit and behaviour tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use geo::Coord;

use crate::geolocation::{
    FixCallback, GeolocationError, GeolocationStream, PositionFix, Subscription, WatchOptions,
};
use crate::{
    KeyValueStore, PersistedState, PersistedStateStore, RouteError, RouteGeometry,
    RouteQueryClient, StorageError, VehicleProfile, ensure_routable,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `KeyValueStore` backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_owned(), value.to_vec());
        Ok(())
    }
}

/// `PersistedStateStore` holding one state in memory.
///
/// Loads and saves can be made to fail to exercise the swallow-and-log path.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<Option<PersistedState>>,
    saves: Mutex<Vec<PersistedState>>,
    fail_load: bool,
    fail_save: bool,
}

impl MemoryStateStore {
    /// Create a store that already holds `state`.
    #[must_use]
    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            ..Self::default()
        }
    }

    /// Make every load fail.
    #[must_use]
    pub const fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// Make every save fail.
    #[must_use]
    pub const fn failing_save(mut self) -> Self {
        self.fail_save = true;
        self
    }

    /// The most recently saved state.
    #[must_use]
    pub fn saved(&self) -> Option<PersistedState> {
        lock(&self.saves).last().cloned()
    }

    /// Number of save calls, including failed ones.
    #[must_use]
    pub fn save_count(&self) -> usize {
        lock(&self.saves).len()
    }
}

impl PersistedStateStore for MemoryStateStore {
    fn load(&self) -> Result<Option<PersistedState>, StorageError> {
        if self.fail_load {
            return Err(StorageError::Read {
                key: "memory".to_owned(),
                message: "load disabled".to_owned(),
            });
        }
        Ok(lock(&self.state).clone())
    }

    fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        lock(&self.saves).push(state.clone());
        if self.fail_save {
            return Err(StorageError::Write {
                key: "memory".to_owned(),
                message: "save disabled".to_owned(),
            });
        }
        *lock(&self.state) = Some(state.clone());
        Ok(())
    }
}

/// Route client returning the input coordinates as the geometry.
#[derive(Debug, Default, Clone, Copy)]
pub struct StraightLineRouteClient;

#[async_trait]
impl RouteQueryClient for StraightLineRouteClient {
    async fn compute_route(
        &self,
        coordinates: &[Coord],
        _profile: &VehicleProfile,
    ) -> Result<RouteGeometry, RouteError> {
        ensure_routable(coordinates)?;
        Ok(RouteGeometry::new(coordinates.to_vec()))
    }
}

#[derive(Default)]
struct ManualState {
    denied: bool,
    callback: Option<FixCallback>,
    current: Option<PositionFix>,
    subscriptions: usize,
    cancellations: usize,
}

/// Geolocation source driven by the test through [`ManualGeolocation::push`].
///
/// Fixes are delivered unfiltered and synchronously to the active callback.
#[derive(Clone, Default)]
pub struct ManualGeolocation {
    state: Arc<Mutex<ManualState>>,
}

impl std::fmt::Debug for ManualGeolocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("ManualGeolocation")
            .field("denied", &state.denied)
            .field("subscribed", &state.callback.is_some())
            .finish_non_exhaustive()
    }
}

impl ManualGeolocation {
    /// A source whose permission prompt is always declined.
    #[must_use]
    pub fn denied() -> Self {
        let source = Self::default();
        lock(&source.state).denied = true;
        source
    }

    /// Set the fix returned by `current_position`.
    pub fn set_current(&self, fix: PositionFix) {
        lock(&self.state).current = Some(fix);
    }

    /// Deliver `fix` to the subscriber. Returns `false` when nobody listens.
    pub fn push(&self, fix: PositionFix) -> bool {
        let mut state = lock(&self.state);
        state.current = Some(fix);
        match state.callback.as_mut() {
            Some(callback) => {
                callback(fix);
                true
            }
            None => false,
        }
    }

    /// Whether a subscription is active.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        lock(&self.state).callback.is_some()
    }

    /// Number of successful subscriptions.
    #[must_use]
    pub fn subscriptions(&self) -> usize {
        lock(&self.state).subscriptions
    }

    /// Number of cancellations observed.
    #[must_use]
    pub fn cancellations(&self) -> usize {
        lock(&self.state).cancellations
    }
}

#[async_trait]
impl GeolocationStream for ManualGeolocation {
    async fn subscribe(
        &self,
        _options: WatchOptions,
        on_fix: FixCallback,
    ) -> Result<Subscription, GeolocationError> {
        {
            let mut state = lock(&self.state);
            if state.denied {
                return Err(GeolocationError::PermissionDenied);
            }
            state.callback = Some(on_fix);
            state.subscriptions += 1;
        }
        let shared = Arc::clone(&self.state);
        Ok(Subscription::new(move || {
            let mut state = lock(&shared);
            state.callback = None;
            state.cancellations += 1;
        }))
    }

    async fn current_position(&self) -> Result<PositionFix, GeolocationError> {
        let state = lock(&self.state);
        if state.denied {
            return Err(GeolocationError::PermissionDenied);
        }
        state.current.ok_or_else(|| GeolocationError::Unavailable {
            message: "no fix has been pushed yet".to_owned(),
        })
    }
}
