//! Behavioural tests for persisting session state through
//! [`FileKeyValueStore`].

use camino::Utf8PathBuf;
use geo::Coord;
use rota_core::{
    KeyValueStateStore, KeyValueStore, PersistedState, PersistedStateStore, StorageError,
    WAYPOINTS_KEY, Waypoint, WaypointList,
};
use rota_data::store::FileKeyValueStore;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;

type LoadCell = RefCell<Option<Result<Option<PersistedState>, StorageError>>>;

struct StateDir {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl StateDir {
    fn store(&self) -> KeyValueStateStore<FileKeyValueStore> {
        KeyValueStateStore::new(FileKeyValueStore::open(&self.root).expect("open store"))
    }
}

#[fixture]
fn state_dir() -> StateDir {
    let temp = TempDir::new().expect("create temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().join("rota")).expect("utf-8 path");
    StateDir { _temp: temp, root }
}

#[fixture]
fn loaded() -> LoadCell {
    RefCell::new(None)
}

fn route(count: usize) -> WaypointList {
    let mut waypoints = vec![Waypoint::live_origin(Coord { x: -46.63, y: -23.55 })];
    waypoints.extend((1..count).map(|i| {
        let offset = i as f64 * 0.01;
        Waypoint::user(
            Coord {
                x: -46.63 - offset,
                y: -23.55 - offset,
            },
            format!("Stop {i}"),
        )
    }));
    WaypointList::from_waypoints(waypoints)
}

// --- Given steps ---

#[given("an empty state directory")]
fn empty_dir(#[from(state_dir)] state_dir: &StateDir) {
    let _ = state_dir.store();
}

#[given("a state directory whose waypoint file is corrupted")]
fn corrupted_dir(#[from(state_dir)] state_dir: &StateDir) {
    let files = FileKeyValueStore::open(&state_dir.root).expect("open store");
    files
        .set(WAYPOINTS_KEY, b"[{\"latitude\":")
        .expect("seed corrupt file");
}

// --- When steps ---

#[when("a route with {count} waypoints and search text {text} is saved")]
fn save_route(#[from(state_dir)] state_dir: &StateDir, count: usize, text: String) {
    let state = PersistedState {
        waypoints: route(count),
        last_search_text: text.trim_matches('"').to_owned(),
    };
    state_dir.store().save(&state).expect("save state");
}

#[when("the state is loaded")]
fn load_state(#[from(state_dir)] state_dir: &StateDir, #[from(loaded)] loaded: &LoadCell) {
    *loaded.borrow_mut() = Some(state_dir.store().load());
}

#[when("the state is loaded from a reopened directory")]
fn load_reopened(#[from(state_dir)] state_dir: &StateDir, #[from(loaded)] loaded: &LoadCell) {
    let reopened = KeyValueStateStore::new(
        FileKeyValueStore::open(&state_dir.root).expect("reopen store"),
    );
    *loaded.borrow_mut() = Some(reopened.load());
}

// --- Then steps ---

fn restored(loaded: &LoadCell) -> PersistedState {
    let borrowed = loaded.borrow();
    let result = borrowed.as_ref().expect("state must be loaded first");
    result
        .as_ref()
        .expect("load should succeed")
        .clone()
        .expect("state should be present")
}

#[then("nothing is restored")]
fn nothing_restored(#[from(loaded)] loaded: &LoadCell) {
    let borrowed = loaded.borrow();
    assert!(
        matches!(&*borrowed, Some(Ok(None))),
        "expected an empty load, got {borrowed:?}"
    );
}

#[then("{count} waypoints are restored")]
fn waypoints_restored(#[from(loaded)] loaded: &LoadCell, count: usize) {
    assert_eq!(restored(loaded).waypoints.len(), count);
}

#[then("the search text {text} is restored")]
fn text_restored(#[from(loaded)] loaded: &LoadCell, text: String) {
    assert_eq!(restored(loaded).last_search_text, text.trim_matches('"'));
}

#[then("the first restored waypoint is the live origin")]
fn first_is_live(#[from(loaded)] loaded: &LoadCell) {
    let state = restored(loaded);
    assert!(state.waypoints.live_origin().is_some());
}

#[then("a decode error is reported")]
fn decode_error(#[from(loaded)] loaded: &LoadCell) {
    let borrowed = loaded.borrow();
    assert!(
        matches!(&*borrowed, Some(Err(StorageError::Decode { .. }))),
        "expected a decode error, got {borrowed:?}"
    );
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/file_state_store.feature", name = $title)]
        fn $fn_name(state_dir: StateDir, loaded: LoadCell) {
            let _ = (state_dir, loaded);
        }
    };
}

register_scenario!(fresh_directory, "a fresh state directory restores nothing");
register_scenario!(
    survives_restart,
    "saved waypoints and search text survive a restart"
);
register_scenario!(corrupted_file, "a corrupted waypoint file is reported");
