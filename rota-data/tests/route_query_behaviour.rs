//! Behavioural tests for route queries.
//!
//! These tests use [`StubRouteQueryClient`] to verify behaviour without
//! requiring a running routing service.

use geo::Coord;
use rota_core::{RouteError, RouteGeometry, RouteQueryClient, VehicleProfile};
use rota_data::routing::test_support::StubRouteQueryClient;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

/// Result cell holding the outcome of a route request.
type ResultCell = RefCell<Option<Result<RouteGeometry, RouteError>>>;
type ClientCell = RefCell<Option<StubRouteQueryClient>>;
type PointsCell = RefCell<Vec<Coord>>;

#[fixture]
fn client() -> ClientCell {
    RefCell::new(None)
}

#[fixture]
fn result() -> ResultCell {
    RefCell::new(None)
}

#[fixture]
fn points() -> PointsCell {
    RefCell::new(Vec::new())
}

fn sample_points(count: usize) -> Vec<Coord> {
    (0..count)
        .map(|i| Coord {
            x: -46.63 - i as f64 * 0.01,
            y: -23.55 - i as f64 * 0.01,
        })
        .collect()
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build")
        .block_on(future)
}

// --- Given steps ---

#[given("a routing service returning straight lines")]
fn service_ok(#[from(client)] client: &ClientCell) {
    *client.borrow_mut() = Some(StubRouteQueryClient::echo());
}

#[given("a routing service that finds no route")]
fn service_no_route(#[from(client)] client: &ClientCell) {
    *client.borrow_mut() = Some(StubRouteQueryClient::with_error(RouteError::NoRouteFound));
}

#[given("a routing service that times out")]
fn service_timeout(#[from(client)] client: &ClientCell) {
    *client.borrow_mut() = Some(StubRouteQueryClient::with_error(RouteError::Timeout {
        timeout_secs: 30,
    }));
}

// --- When steps ---

#[when("I request a route through {count} points")]
fn request_route(
    #[from(client)] client: &ClientCell,
    #[from(points)] points: &PointsCell,
    #[from(result)] result: &ResultCell,
    count: usize,
) {
    let guard = client.borrow();
    let stub = guard.as_ref().expect("client must be initialised");
    let coordinates = sample_points(count);
    let outcome = block_on(stub.compute_route(&coordinates, &VehicleProfile::default()));
    *points.borrow_mut() = coordinates;
    *result.borrow_mut() = Some(outcome);
}

// --- Then steps ---

#[then("a geometry with {count} points is returned")]
fn geometry_returned(#[from(result)] result: &ResultCell, count: usize) {
    let borrowed = result.borrow();
    let geometry = borrowed
        .as_ref()
        .expect("request must run first")
        .as_ref()
        .expect("expected Ok result");
    assert_eq!(geometry.len(), count);
}

#[then("the service saw the points in order")]
fn saw_points_in_order(#[from(client)] client: &ClientCell, #[from(points)] points: &PointsCell) {
    let guard = client.borrow();
    let stub = guard.as_ref().expect("client must be initialised");
    assert_eq!(stub.calls(), vec![points.borrow().clone()]);
}

#[then("the service was called {count} time")]
fn called_once(#[from(client)] client: &ClientCell, count: usize) {
    let guard = client.borrow();
    assert_eq!(guard.as_ref().map(StubRouteQueryClient::call_count), Some(count));
}

#[then("the service was called {count} times")]
fn called_many(#[from(client)] client: &ClientCell, count: usize) {
    let guard = client.borrow();
    assert_eq!(guard.as_ref().map(StubRouteQueryClient::call_count), Some(count));
}

#[then("an insufficient points error is returned")]
fn insufficient(#[from(result)] result: &ResultCell) {
    let borrowed = result.borrow();
    assert!(
        matches!(&*borrowed, Some(Err(RouteError::InsufficientPoints { count: 1 }))),
        "expected InsufficientPoints, got {borrowed:?}"
    );
}

#[then("a no route error is returned")]
fn no_route(#[from(result)] result: &ResultCell) {
    let borrowed = result.borrow();
    assert!(
        matches!(&*borrowed, Some(Err(RouteError::NoRouteFound))),
        "expected NoRouteFound, got {borrowed:?}"
    );
}

#[then("a timeout error is returned")]
fn timed_out(#[from(result)] result: &ResultCell) {
    let borrowed = result.borrow();
    assert!(
        matches!(&*borrowed, Some(Err(RouteError::Timeout { .. }))),
        "expected Timeout, got {borrowed:?}"
    );
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/route_query.feature", name = $title)]
        fn $fn_name(client: ClientCell, points: PointsCell, result: ResultCell) {
            let _ = (client, points, result);
        }
    };
}

register_scenario!(
    origin_and_destination,
    "returning geometry for an origin and destination"
);
register_scenario!(
    intermediate_stops,
    "routing through intermediate stops keeps their order"
);
register_scenario!(single_point, "refusing to route a single point");
register_scenario!(no_route_exists, "reporting that no route exists");
register_scenario!(provider_timeout, "reporting a provider timeout");
