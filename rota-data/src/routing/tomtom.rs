//! Response types for the TomTom-style `calculateRoute` service.
//!
//! A successful reply carries `routes[*].legs[*].points`, each point a
//! `{latitude, longitude}` object. Failures carry either a `detailedError`
//! object with a machine-readable `code` or a legacy `error.description`.

use geo::Coord;
use serde::Deserialize;

/// Provider code reported when no route connects the points.
pub const NO_ROUTE_FOUND: &str = "NO_ROUTE_FOUND";

/// Body of a `calculateRoute` reply.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRouteResponse {
    /// Candidate routes; the first is the one shown.
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Structured error, present on failures.
    pub detailed_error: Option<DetailedError>,
    /// Legacy error object.
    pub error: Option<LegacyError>,
}

/// One route made of consecutive legs.
#[derive(Debug, Deserialize)]
pub struct Route {
    /// Legs between consecutive waypoints.
    #[serde(default)]
    pub legs: Vec<Leg>,
}

/// Polyline between two consecutive waypoints.
#[derive(Debug, Deserialize)]
pub struct Leg {
    /// Points along the leg.
    #[serde(default)]
    pub points: Vec<LatLon>,
}

/// Coordinate in provider order.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl From<LatLon> for Coord {
    fn from(value: LatLon) -> Self {
        Self {
            x: value.longitude,
            y: value.latitude,
        }
    }
}

/// Structured provider error.
#[derive(Debug, Deserialize)]
pub struct DetailedError {
    /// Machine-readable code such as `NO_ROUTE_FOUND`.
    pub code: String,
    /// Human-readable detail.
    #[serde(default)]
    pub message: String,
}

/// Legacy provider error.
#[derive(Debug, Deserialize)]
pub struct LegacyError {
    /// Human-readable detail.
    #[serde(default)]
    pub description: String,
}

impl CalculateRouteResponse {
    /// Whether the provider reported that no route exists.
    #[must_use]
    pub fn reports_no_route(&self) -> bool {
        self.detailed_error
            .as_ref()
            .is_some_and(|err| err.code == NO_ROUTE_FOUND)
    }

    /// Best available error detail.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.detailed_error
            .as_ref()
            .map(|err| {
                if err.message.is_empty() {
                    err.code.clone()
                } else {
                    format!("{}: {}", err.code, err.message)
                }
            })
            .or_else(|| self.error.as_ref().map(|err| err.description.clone()))
    }

    /// Points of the first route with every leg concatenated, or `None` when
    /// the reply holds no route.
    #[must_use]
    pub fn into_first_route_points(self) -> Option<Vec<Coord>> {
        let route = self.routes.into_iter().next()?;
        Some(
            route
                .legs
                .into_iter()
                .flat_map(|leg| leg.points)
                .map(Coord::from)
                .collect(),
        )
    }
}
