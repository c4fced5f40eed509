//! Property-based tests for waypoint reconciliation and route sync.
//!
//! # Invariants tested
//!
//! - **Single live origin:** at most one waypoint is flagged, and only at
//!   index 0.
//! - **Stable manual origin:** once index 0 is a manual waypoint, live fixes
//!   never change the list.
//! - **Append inverse:** appending a waypoint and then removing the last
//!   index restores the previous list.
//! - **Routable geometry:** a published non-empty geometry always follows a
//!   list of two or more waypoints.

use std::time::{Duration, Instant};

use geo::Coord;
use proptest::prelude::*;
use rota_core::sync::{RouteSync, RouteSyncConfig, SyncCommand};
use rota_core::{PersistedState, RouteGeometry, Waypoint, WaypointList, WaypointReconciler};

#[derive(Debug, Clone)]
enum Op {
    Fix(f64, f64),
    Append(f64, f64),
    Remove(usize),
    Hydrate(usize),
    Recenter(f64, f64),
}

fn coord_strategy() -> impl Strategy<Value = (f64, f64)> {
    (-60.0_f64..60.0, -170.0_f64..170.0)
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => coord_strategy().prop_map(|(lat, lon)| Op::Fix(lat, lon)),
        3 => coord_strategy().prop_map(|(lat, lon)| Op::Append(lat, lon)),
        2 => (0_usize..6).prop_map(Op::Remove),
        1 => (0_usize..4).prop_map(Op::Hydrate),
        1 => coord_strategy().prop_map(|(lat, lon)| Op::Recenter(lat, lon)),
    ]
}

fn saved(count: usize) -> PersistedState {
    PersistedState {
        waypoints: WaypointList::from_waypoints(
            (0..count)
                .map(|i| Waypoint::user(Coord { x: i as f64, y: i as f64 }, format!("S{i}")))
                .collect(),
        ),
        last_search_text: String::new(),
    }
}

/// Apply `op` the way a session does: the first fix seeds, later ones move.
fn apply(reconciler: &mut WaypointReconciler, op: &Op, seen_fix: &mut bool) {
    match *op {
        Op::Fix(lat, lon) => {
            let location = Coord { x: lon, y: lat };
            if *seen_fix {
                let _ = reconciler.apply_live_fix(location);
            } else {
                *seen_fix = true;
                let _ = reconciler.seed_from_live_fix(location);
            }
        }
        Op::Append(lat, lon) => {
            let _ = reconciler.append(Waypoint::user(Coord { x: lon, y: lat }, "stop"));
        }
        Op::Remove(index) => {
            let _ = reconciler.remove(index);
        }
        Op::Hydrate(count) => {
            let _ = reconciler.hydrate(saved(count));
        }
        Op::Recenter(lat, lon) => {
            let _ = reconciler.recenter_on_user(Coord { x: lon, y: lat });
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: at most one live origin, and only at index 0.
    #[test]
    fn live_origin_only_at_index_zero(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut reconciler = WaypointReconciler::new();
        let mut seen_fix = false;
        for op in &ops {
            apply(&mut reconciler, op, &mut seen_fix);
            let flagged: Vec<usize> = reconciler
                .waypoints()
                .iter()
                .enumerate()
                .filter(|(_, w)| w.is_live_origin)
                .map(|(i, _)| i)
                .collect();
            prop_assert!(
                flagged.is_empty() || flagged == vec![0],
                "live flags at {flagged:?} after {op:?}"
            );
        }
    }

    /// Property: live fixes leave a list with a manual origin untouched.
    #[test]
    fn manual_origin_ignores_fixes(
        fixes in prop::collection::vec(coord_strategy(), 1..20),
        stops in 1_usize..5,
    ) {
        let mut reconciler = WaypointReconciler::new();
        for i in 0..stops {
            let _ = reconciler.append(Waypoint::user(Coord { x: i as f64, y: 0.0 }, "manual"));
        }
        let before = reconciler.waypoints().clone();
        for (lat, lon) in fixes {
            let location = Coord { x: lon, y: lat };
            let mutation = reconciler.apply_live_fix(location);
            prop_assert!(!mutation.is_changed(), "fix at {location:?} moved a manual origin");
        }
        prop_assert_eq!(reconciler.waypoints(), &before);
    }

    /// Property: non-empty geometry is only published for routable lists.
    #[test]
    fn geometry_only_for_routable_lists(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let debounce = Duration::from_millis(500);
        let mut sync = RouteSync::new(RouteSyncConfig::default().with_debounce(debounce));
        let mut reconciler = WaypointReconciler::new();
        let mut seen_fix = false;
        let mut now = Instant::now();

        for op in &ops {
            apply(&mut reconciler, op, &mut seen_fix);
            let _ = sync.notify_change(reconciler.waypoints(), now);
            now += Duration::from_millis(300);

            let command = sync.on_deadline(now);
            if let Some(SyncCommand::Query(ticket)) = command {
                let geometry = RouteGeometry::new(ticket.coordinates.clone());
                if let Some(SyncCommand::Publish { geometry, .. }) =
                    sync.on_query_result(ticket.seq, Ok(geometry), now)
                {
                    prop_assert!(
                        geometry.is_empty() || reconciler.waypoints().len() >= 2,
                        "published a route for {} waypoints",
                        reconciler.waypoints().len()
                    );
                }
            }
            prop_assert!(sync.geometry().is_empty() || reconciler.waypoints().is_routable());
        }
    }

    /// Property: append followed by remove(last) is the identity.
    #[test]
    fn append_then_remove_last_restores_list(
        ops in prop::collection::vec(op_strategy(), 0..30),
        (lat, lon) in coord_strategy(),
    ) {
        let mut reconciler = WaypointReconciler::new();
        let mut seen_fix = false;
        for op in &ops {
            apply(&mut reconciler, op, &mut seen_fix);
        }
        let before = reconciler.waypoints().clone();
        let _ = reconciler.append(Waypoint::user(Coord { x: lon, y: lat }, "extra"));
        let last = reconciler.waypoints().len() - 1;
        prop_assert!(reconciler.remove(last).is_ok());
        prop_assert_eq!(reconciler.waypoints(), &before);
    }
}
