//! Behavioural tests for the route session.
//!
//! Each scenario drives a session on a current-thread runtime with a paused
//! clock, so debounce windows elapse as soon as the runtime is idle.

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use geo::Coord;
use rota_core::geolocation::PositionFix;
use rota_core::test_support::{ManualGeolocation, MemoryStateStore};
use rota_core::{PersistedState, Waypoint, WaypointList};
use rota_data::routing::test_support::StubRouteQueryClient;
use rota_session::{Collaborators, RouteSession, SessionConfig};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;

struct Harness {
    runtime: Runtime,
    router: Arc<StubRouteQueryClient>,
    geolocation: ManualGeolocation,
    session: RouteSession,
}

impl Harness {
    fn start(store: MemoryStateStore) -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .start_paused(true)
            .build()
            .expect("runtime should build");
        let router = Arc::new(StubRouteQueryClient::echo());
        let geolocation = ManualGeolocation::default();
        let collaborators = Collaborators {
            router: router.clone(),
            geolocation: Arc::new(geolocation.clone()),
            store: Arc::new(store),
        };
        let session = runtime.block_on(async {
            let session = RouteSession::start(SessionConfig::default(), collaborators);
            session.started().await.expect("session starts");
            session
        });
        Self {
            runtime,
            router,
            geolocation,
            session,
        }
    }
}

type HarnessCell = RefCell<Option<Harness>>;

#[fixture]
fn harness() -> HarnessCell {
    RefCell::new(None)
}

fn parse_lat_lon(text: &str) -> Coord {
    let (lat, lon) = text.split_once(',').expect("lat,lon pair");
    Coord {
        x: lon.trim().parse().expect("longitude"),
        y: lat.trim().parse().expect("latitude"),
    }
}

fn stop(i: usize) -> Waypoint {
    let offset = i as f64 * 0.01;
    Waypoint::user(
        Coord {
            x: -46.64 - offset,
            y: -23.56 - offset,
        },
        format!("Stop {i}"),
    )
}

fn with_harness<T>(cell: &HarnessCell, f: impl FnOnce(&Harness) -> T) -> T {
    let guard = cell.borrow();
    f(guard.as_ref().expect("session must be started"))
}

// --- Given steps ---

#[given("a session with no saved state")]
fn fresh_session(#[from(harness)] harness: &HarnessCell) {
    *harness.borrow_mut() = Some(Harness::start(MemoryStateStore::default()));
}

#[given("a session restored with {count} saved stops")]
fn restored_session(#[from(harness)] harness: &HarnessCell, count: usize) {
    let store = MemoryStateStore::with_state(PersistedState {
        waypoints: WaypointList::from_waypoints((0..count).map(stop).collect()),
        last_search_text: String::new(),
    });
    *harness.borrow_mut() = Some(Harness::start(store));
}

// --- When steps ---

#[when("the device reports a fix at {position}")]
fn device_fix(#[from(harness)] harness: &HarnessCell, position: String) {
    with_harness(harness, |h| {
        assert!(h.geolocation.push(PositionFix::at(parse_lat_lon(&position))));
    });
}

#[when("the user adds a stop at {position}")]
fn add_stop(#[from(harness)] harness: &HarnessCell, position: String) {
    with_harness(harness, |h| {
        let waypoint = Waypoint::user(parse_lat_lon(&position), position.clone());
        h.session.append(waypoint).expect("append");
    });
}

#[when("the user adds {count} stops in quick succession")]
fn add_many(#[from(harness)] harness: &HarnessCell, count: usize) {
    with_harness(harness, |h| {
        h.runtime.block_on(async {
            for i in 0..count {
                h.session.append(stop(i)).expect("append");
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        });
    });
}

#[when("the user removes waypoint {index}")]
fn remove_waypoint(#[from(harness)] harness: &HarnessCell, index: usize) {
    with_harness(harness, |h| {
        h.runtime.block_on(async {
            let mut geometry = h.session.watch_geometry();
            geometry.mark_unchanged();
            h.session.remove(index).expect("remove");
            geometry.changed().await.expect("geometry published");
        });
    });
}

#[when("the route settles")]
fn route_settles(#[from(harness)] harness: &HarnessCell) {
    with_harness(harness, |h| {
        h.runtime
            .block_on(h.session.idle())
            .expect("session settles");
    });
}

// --- Then steps ---

#[then("the origin is live at {position}")]
fn origin_live_at(#[from(harness)] harness: &HarnessCell, position: String) {
    with_harness(harness, |h| {
        let origin = h.session.waypoints().origin().cloned().expect("origin");
        assert!(origin.is_live_origin, "origin should be live: {origin:?}");
        assert_eq!(origin.location(), parse_lat_lon(&position));
    });
}

#[then("the origin is not live")]
fn origin_not_live(#[from(harness)] harness: &HarnessCell) {
    with_harness(harness, |h| {
        assert!(h.session.waypoints().live_origin().is_none());
    });
}

#[then("the session holds {count} waypoints")]
fn holds(#[from(harness)] harness: &HarnessCell, count: usize) {
    with_harness(harness, |h| assert_eq!(h.session.waypoints().len(), count));
}

#[then("the route passes through {count} points")]
fn route_points(#[from(harness)] harness: &HarnessCell, count: usize) {
    with_harness(harness, |h| assert_eq!(h.session.geometry().len(), count));
}

#[then("the routing service received {count} queries")]
fn query_count(#[from(harness)] harness: &HarnessCell, count: usize) {
    with_harness(harness, |h| assert_eq!(h.router.call_count(), count));
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/route_session.feature", name = $title)]
        fn $fn_name(harness: HarnessCell) {
            let _ = harness;
        }
    };
}

register_scenario!(fix_and_stop, "the first fix and a stop produce a route");
register_scenario!(saved_stops_win, "saved stops win over the first fix");
register_scenario!(rapid_additions, "rapid additions are routed once");
register_scenario!(removal_clears, "removing a stop below two clears the route");
