//! `PersistedStateStore` spread over two keys of a key/value backend.

use crate::{PersistedState, WaypointList};

use super::{KeyValueStore, PersistedStateStore, StorageError};

/// Key holding the JSON-encoded waypoint list.
pub const WAYPOINTS_KEY: &str = "savedWaypoints";

/// Key holding the raw search text.
pub const SEARCH_TEXT_KEY: &str = "savedSearchQuery";

/// Stores the waypoint list as JSON and the search text as plain UTF-8.
///
/// A load where neither key is present yields `None`. A load where only one
/// key is present fills the other half with its default.
#[derive(Debug, Clone, Default)]
pub struct KeyValueStateStore<S> {
    inner: S,
}

impl<S: KeyValueStore> KeyValueStateStore<S> {
    /// Wrap a key/value backend.
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Borrow the backend.
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    fn load_waypoints(&self) -> Result<Option<WaypointList>, StorageError> {
        let Some(bytes) = self.inner.get(WAYPOINTS_KEY)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                key: WAYPOINTS_KEY.to_owned(),
                source,
            })
    }

    fn load_search_text(&self) -> Result<Option<String>, StorageError> {
        let Some(bytes) = self.inner.get(SEARCH_TEXT_KEY)? else {
            return Ok(None);
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| StorageError::InvalidText {
                key: SEARCH_TEXT_KEY.to_owned(),
            })
    }
}

impl<S: KeyValueStore> PersistedStateStore for KeyValueStateStore<S> {
    fn load(&self) -> Result<Option<PersistedState>, StorageError> {
        let waypoints = self.load_waypoints()?;
        let search_text = self.load_search_text()?;
        if waypoints.is_none() && search_text.is_none() {
            return Ok(None);
        }
        Ok(Some(PersistedState {
            waypoints: waypoints.unwrap_or_default(),
            last_search_text: search_text.unwrap_or_default(),
        }))
    }

    fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        let encoded = serde_json::to_vec(&state.waypoints).map_err(StorageError::Encode)?;
        self.inner.set(WAYPOINTS_KEY, &encoded)?;
        self.inner
            .set(SEARCH_TEXT_KEY, state.last_search_text.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Waypoint;
    use crate::test_support::MemoryKeyValueStore;
    use geo::Coord;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> KeyValueStateStore<MemoryKeyValueStore> {
        KeyValueStateStore::new(MemoryKeyValueStore::default())
    }

    #[rstest]
    fn empty_backend_loads_nothing(store: KeyValueStateStore<MemoryKeyValueStore>) {
        assert!(store.load().expect("load").is_none());
    }

    #[rstest]
    fn save_then_load_restores_state(store: KeyValueStateStore<MemoryKeyValueStore>) {
        let state = PersistedState {
            waypoints: WaypointList::from_waypoints(vec![
                Waypoint::live_origin(Coord { x: -46.63, y: -23.55 }),
                Waypoint::user(Coord { x: -46.64, y: -23.56 }, "Stop"),
            ]),
            last_search_text: "av. paulista".to_owned(),
        };
        store.save(&state).expect("save");
        assert_eq!(store.load().expect("load"), Some(state));
    }

    #[rstest]
    fn search_text_alone_yields_empty_list(store: KeyValueStateStore<MemoryKeyValueStore>) {
        store
            .inner()
            .set(SEARCH_TEXT_KEY, b"depot")
            .expect("seed backend");
        let state = store.load().expect("load").expect("some state");
        assert!(state.waypoints.is_empty());
        assert_eq!(state.last_search_text, "depot");
    }

    #[rstest]
    fn malformed_waypoints_surface_decode_error(store: KeyValueStateStore<MemoryKeyValueStore>) {
        store
            .inner()
            .set(WAYPOINTS_KEY, b"{not json")
            .expect("seed backend");
        let err = store.load().expect_err("malformed payload");
        assert!(matches!(err, StorageError::Decode { ref key, .. } if key == WAYPOINTS_KEY));
    }

    #[rstest]
    fn non_utf8_search_text_is_rejected(store: KeyValueStateStore<MemoryKeyValueStore>) {
        store
            .inner()
            .set(SEARCH_TEXT_KEY, &[0xff, 0xfe])
            .expect("seed backend");
        assert!(matches!(
            store.load(),
            Err(StorageError::InvalidText { .. })
        ));
    }
}
