//! Route query trait and input validation.

use async_trait::async_trait;
use geo::Coord;

use crate::RouteGeometry;

use super::{error::RouteError, vehicle::VehicleProfile};

/// Reject coordinate lists that cannot form a route.
///
/// # Errors
///
/// Returns [`RouteError::InsufficientPoints`] for fewer than two coordinates.
pub fn ensure_routable(coordinates: &[Coord]) -> Result<(), RouteError> {
    if coordinates.len() < 2 {
        return Err(RouteError::InsufficientPoints {
            count: coordinates.len(),
        });
    }
    Ok(())
}

/// Fetch route geometry from a routing provider.
///
/// Implementers receive the ordered coordinates (origin, stops, destination)
/// and must not assume the provider answers deterministically across calls.
/// The input slice is borrowed and never mutated.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use geo::Coord;
/// use rota_core::{RouteGeometry, RouteError, RouteQueryClient, VehicleProfile, ensure_routable};
///
/// struct Straight;
///
/// #[async_trait]
/// impl RouteQueryClient for Straight {
///     async fn compute_route(
///         &self,
///         coordinates: &[Coord],
///         _profile: &VehicleProfile,
///     ) -> Result<RouteGeometry, RouteError> {
///         ensure_routable(coordinates)?;
///         Ok(RouteGeometry::new(coordinates.to_vec()))
///     }
/// }
/// ```
#[async_trait]
pub trait RouteQueryClient: Send + Sync {
    /// Return the route through `coordinates` for `profile`.
    ///
    /// Implementations must return `Err(RouteError::InsufficientPoints)`
    /// when fewer than two coordinates are supplied.
    async fn compute_route(
        &self,
        coordinates: &[Coord],
        profile: &VehicleProfile,
    ) -> Result<RouteGeometry, RouteError>;
}
