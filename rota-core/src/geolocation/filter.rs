//! Spatial throttling of position fixes.

use geo::{Haversine, Point, algorithm::Distance};

use super::PositionFix;

/// Drops fixes closer than a minimum distance to the last admitted fix.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use rota_core::geolocation::{MinDistanceFilter, PositionFix};
///
/// let mut filter = MinDistanceFilter::new(10.0);
/// assert!(filter.admit(&PositionFix::at(Coord { x: 0.0, y: 0.0 })));
/// // Roughly 1 m east of the previous fix.
/// assert!(!filter.admit(&PositionFix::at(Coord { x: 0.000_01, y: 0.0 })));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MinDistanceFilter {
    min_distance_m: f64,
    last: Option<Point>,
}

impl MinDistanceFilter {
    /// Create a filter with the given threshold in metres.
    #[must_use]
    pub const fn new(min_distance_m: f64) -> Self {
        Self {
            min_distance_m,
            last: None,
        }
    }

    /// Whether `fix` should be delivered. Admitted fixes become the new
    /// reference point.
    pub fn admit(&mut self, fix: &PositionFix) -> bool {
        let point = Point::from(fix.location());
        let admitted = self
            .last
            .is_none_or(|last| Haversine.distance(last, point) >= self.min_distance_m);
        if admitted {
            self.last = Some(point);
        }
        admitted
    }
}
