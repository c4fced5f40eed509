//! Behavioural tests for `WaypointReconciler`.

use geo::Coord;
use rota_core::{
    PersistedState, ReconcileError, Waypoint, WaypointList, WaypointReconciler,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

type ReconcilerCell = RefCell<WaypointReconciler>;
type OutcomeCell = RefCell<Option<ReconcileError>>;

#[fixture]
fn reconciler() -> ReconcilerCell {
    RefCell::new(WaypointReconciler::new())
}

#[fixture]
fn outcome() -> OutcomeCell {
    RefCell::new(None)
}

fn parse_lat_lon(text: &str) -> Coord {
    let (lat, lon) = text.split_once(',').expect("lat,lon pair");
    Coord {
        x: lon.trim().parse().expect("longitude"),
        y: lat.trim().parse().expect("latitude"),
    }
}

fn persisted(count: usize) -> PersistedState {
    let waypoints = (0..count)
        .map(|i| {
            let offset = i as f64;
            Waypoint::user(Coord { x: 10.0 + offset, y: 20.0 + offset }, format!("Saved {i}"))
        })
        .collect();
    PersistedState {
        waypoints: WaypointList::from_waypoints(waypoints),
        last_search_text: String::new(),
    }
}

// --- Given steps ---

#[given("an empty reconciler")]
fn empty_reconciler(#[from(reconciler)] reconciler: &ReconcilerCell) {
    *reconciler.borrow_mut() = WaypointReconciler::new();
}

// --- When steps ---

#[when("a live fix arrives at {position}")]
fn live_fix(#[from(reconciler)] reconciler: &ReconcilerCell, position: String) {
    let location = parse_lat_lon(&position);
    let mut guard = reconciler.borrow_mut();
    if guard.waypoints().is_empty() && guard.claim().is_none() {
        let _ = guard.seed_from_live_fix(location);
    } else {
        let _ = guard.apply_live_fix(location);
    }
}

#[when("the user appends a stop at {position}")]
fn append_stop(#[from(reconciler)] reconciler: &ReconcilerCell, position: String) {
    let location = parse_lat_lon(&position);
    let _ = reconciler
        .borrow_mut()
        .append(Waypoint::user(location, position));
}

#[when("the user removes waypoint {index}")]
fn remove_waypoint(
    #[from(reconciler)] reconciler: &ReconcilerCell,
    #[from(outcome)] outcome: &OutcomeCell,
    index: usize,
) {
    if let Err(err) = reconciler.borrow_mut().remove(index) {
        *outcome.borrow_mut() = Some(err);
    }
}

#[when("persisted state with {count} waypoints arrives")]
fn hydrate(#[from(reconciler)] reconciler: &ReconcilerCell, count: usize) {
    let _ = reconciler.borrow_mut().hydrate(persisted(count));
}

#[when("the user recenters at {position}")]
fn recenter(#[from(reconciler)] reconciler: &ReconcilerCell, position: String) {
    let _ = reconciler
        .borrow_mut()
        .recenter_on_user(parse_lat_lon(&position));
}

// --- Then steps ---

#[then("the list holds {count} waypoint")]
fn holds_one(#[from(reconciler)] reconciler: &ReconcilerCell, count: usize) {
    assert_eq!(reconciler.borrow().waypoints().len(), count);
}

#[then("the list holds {count} waypoints")]
fn holds_many(#[from(reconciler)] reconciler: &ReconcilerCell, count: usize) {
    assert_eq!(reconciler.borrow().waypoints().len(), count);
}

#[then("the origin is live at {position}")]
fn origin_live_at(#[from(reconciler)] reconciler: &ReconcilerCell, position: String) {
    let guard = reconciler.borrow();
    let origin = guard.waypoints().origin().expect("origin present");
    assert!(origin.is_live_origin, "origin should be live: {origin:?}");
    assert_eq!(origin.location(), parse_lat_lon(&position));
}

#[then("no waypoint is live")]
fn none_live(#[from(reconciler)] reconciler: &ReconcilerCell) {
    let guard = reconciler.borrow();
    assert!(
        guard.waypoints().iter().all(|w| !w.is_live_origin),
        "unexpected live origin in {:?}",
        guard.waypoints()
    );
}

#[then("the removal is rejected")]
fn removal_rejected(#[from(outcome)] outcome: &OutcomeCell) {
    assert!(
        matches!(
            *outcome.borrow(),
            Some(ReconcileError::IndexOutOfRange { index: 4, len: 1 })
        ),
        "expected IndexOutOfRange, got {:?}",
        outcome.borrow()
    );
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/waypoint_reconciler.feature", name = $title)]
        fn $fn_name(reconciler: ReconcilerCell, outcome: OutcomeCell) {
            let _ = (reconciler, outcome);
        }
    };
}

register_scenario!(first_fix_seeds, "first fix seeds a live origin");
register_scenario!(later_fixes_move, "later fixes move the live origin");
register_scenario!(manual_origin_ignores, "manual origin ignores live fixes");
register_scenario!(
    removal_never_promotes,
    "removing the live origin never promotes a stop"
);
register_scenario!(
    late_hydration_dropped,
    "persisted state arriving after an edit is dropped"
);
register_scenario!(
    early_hydration_wins,
    "persisted state arriving first wins over the first fix"
);
register_scenario!(recenter_replaces, "recentering replaces a manual origin");
register_scenario!(remove_past_end, "removing past the end is rejected");
