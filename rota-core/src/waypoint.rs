//! Waypoints, the ordered waypoint list, and route geometry.
//!
//! Coordinates follow the `geo` convention used throughout the workspace:
//! `x` is longitude and `y` is latitude, both in WGS84 degrees.

use geo::{BoundingRect, Coord, LineString, Rect};
use serde::{Deserialize, Serialize};

/// Address given to a waypoint that tracks the device position.
pub const LIVE_ORIGIN_ADDRESS: &str = "current location";

/// A geographic point participating in a route.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use rota_core::Waypoint;
///
/// let stop = Waypoint::user(Coord { x: -46.64, y: -23.56 }, "Stop");
/// assert_eq!(stop.latitude, -23.56);
/// assert!(!stop.is_live_origin);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Human-readable address, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Whether the position is continuously overwritten by live tracking.
    #[serde(default)]
    pub is_live_origin: bool,
}

impl Waypoint {
    /// Construct a user-selected waypoint with an address.
    #[must_use]
    pub fn user(location: Coord, address: impl Into<String>) -> Self {
        Self {
            latitude: location.y,
            longitude: location.x,
            address: Some(address.into()),
            is_live_origin: false,
        }
    }

    /// Construct a live-origin waypoint at `location`.
    #[must_use]
    pub fn live_origin(location: Coord) -> Self {
        Self {
            latitude: location.y,
            longitude: location.x,
            address: Some(LIVE_ORIGIN_ADDRESS.to_owned()),
            is_live_origin: true,
        }
    }

    /// Position as a `geo` coordinate (`x = longitude`, `y = latitude`).
    #[must_use]
    pub const fn location(&self) -> Coord {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }

    pub(crate) const fn move_to(&mut self, location: Coord) {
        self.latitude = location.y;
        self.longitude = location.x;
    }
}

/// Ordered sequence of waypoints: origin, stops, destination.
///
/// The list is unique by position, not by coordinate. At most one element
/// carries the live-origin flag and, if present, it sits at index 0. The
/// constructor and deserialisation both enforce this by clearing stray flags.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use rota_core::{Waypoint, WaypointList};
///
/// let list = WaypointList::from_waypoints(vec![
///     Waypoint::user(Coord { x: 0.0, y: 0.0 }, "A"),
///     Waypoint::live_origin(Coord { x: 1.0, y: 1.0 }),
/// ]);
/// assert!(list.live_origin().is_none());
/// assert!(list.is_routable());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Waypoint>", into = "Vec<Waypoint>")]
pub struct WaypointList {
    waypoints: Vec<Waypoint>,
}

impl WaypointList {
    /// Build a list, clearing live-origin flags anywhere but index 0.
    #[must_use]
    pub fn from_waypoints(mut waypoints: Vec<Waypoint>) -> Self {
        let mut stray = 0_usize;
        for waypoint in waypoints.iter_mut().skip(1) {
            if waypoint.is_live_origin {
                waypoint.is_live_origin = false;
                stray += 1;
            }
        }
        if stray > 0 {
            log::warn!("cleared {stray} live-origin flag(s) outside the origin slot");
        }
        Self { waypoints }
    }

    /// Number of waypoints.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Whether the list holds no waypoints.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// A route can only be computed for two or more waypoints.
    #[must_use]
    pub const fn is_routable(&self) -> bool {
        self.waypoints.len() >= 2
    }

    /// Waypoint at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    /// First waypoint.
    #[must_use]
    pub fn origin(&self) -> Option<&Waypoint> {
        self.waypoints.first()
    }

    /// Last waypoint, when the list holds at least two.
    #[must_use]
    pub fn destination(&self) -> Option<&Waypoint> {
        if self.is_routable() {
            self.waypoints.last()
        } else {
            None
        }
    }

    /// Interior waypoints in document order.
    #[must_use]
    pub fn stops(&self) -> &[Waypoint] {
        match self.waypoints.as_slice() {
            [_, interior @ .., _] => interior,
            _ => &[],
        }
    }

    /// The live-origin waypoint, if index 0 carries the flag.
    #[must_use]
    pub fn live_origin(&self) -> Option<&Waypoint> {
        self.waypoints.first().filter(|wp| wp.is_live_origin)
    }

    /// Borrow the waypoints as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Iterate over the waypoints in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Waypoint> {
        self.waypoints.iter()
    }

    /// Ordered coordinates: origin, stops, destination.
    #[must_use]
    pub fn coordinates(&self) -> Vec<Coord> {
        self.waypoints.iter().map(Waypoint::location).collect()
    }

    pub(crate) fn push(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<Waypoint> {
        (index < self.waypoints.len()).then(|| self.waypoints.remove(index))
    }

    pub(crate) fn first_mut(&mut self) -> Option<&mut Waypoint> {
        self.waypoints.first_mut()
    }

    /// Replace index 0, or insert it when the list is empty.
    pub(crate) fn set_origin(&mut self, waypoint: Waypoint) {
        match self.waypoints.first_mut() {
            Some(slot) => *slot = waypoint,
            None => self.waypoints.push(waypoint),
        }
    }
}

impl From<Vec<Waypoint>> for WaypointList {
    fn from(waypoints: Vec<Waypoint>) -> Self {
        Self::from_waypoints(waypoints)
    }
}

impl From<WaypointList> for Vec<Waypoint> {
    fn from(list: WaypointList) -> Self {
        list.waypoints
    }
}

impl<'a> IntoIterator for &'a WaypointList {
    type Item = &'a Waypoint;
    type IntoIter = std::slice::Iter<'a, Waypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Polyline returned by a routing provider, as (longitude, latitude) pairs.
///
/// An empty geometry means no route is valid for the current waypoint list.
/// Serialises as a GeoJSON-style array of `[longitude, latitude]` pairs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct RouteGeometry {
    points: Vec<Coord>,
}

impl RouteGeometry {
    /// Geometry representing "no route".
    #[must_use]
    pub const fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Wrap an ordered list of points.
    #[must_use]
    pub const fn new(points: Vec<Coord>) -> Self {
        Self { points }
    }

    /// Whether the geometry holds no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Borrow the points.
    #[must_use]
    pub fn points(&self) -> &[Coord] {
        &self.points
    }

    /// Copy the points into a `geo` line string.
    #[must_use]
    pub fn to_line_string(&self) -> LineString {
        LineString::new(self.points.clone())
    }

    /// Bounding rectangle of the polyline, `None` when empty.
    ///
    /// ```
    /// use geo::Coord;
    /// use rota_core::RouteGeometry;
    ///
    /// let geometry = RouteGeometry::new(vec![
    ///     Coord { x: -46.63, y: -23.55 },
    ///     Coord { x: -46.64, y: -23.56 },
    /// ]);
    /// let bounds = geometry.bounds().expect("non-empty geometry");
    /// assert_eq!(bounds.min(), Coord { x: -46.64, y: -23.56 });
    /// ```
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.to_line_string().bounding_rect()
    }
}

impl From<Vec<[f64; 2]>> for RouteGeometry {
    fn from(pairs: Vec<[f64; 2]>) -> Self {
        Self::new(pairs.into_iter().map(|[x, y]| Coord { x, y }).collect())
    }
}

impl From<RouteGeometry> for Vec<[f64; 2]> {
    fn from(geometry: RouteGeometry) -> Self {
        geometry.points.into_iter().map(|c| [c.x, c.y]).collect()
    }
}

/// Durable snapshot of the session: waypoints plus the last search text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// The waypoint list at the time of saving.
    pub waypoints: WaypointList,
    /// Text last typed into the search box.
    pub last_search_text: String,
}
