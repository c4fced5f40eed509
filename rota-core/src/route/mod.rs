//! Compute route geometry for an ordered list of coordinates.
//!
//! The [`RouteQueryClient`] trait abstracts the remote routing provider.
//! Callers supply the ordered coordinates (origin, stops, destination) and a
//! [`VehicleProfile`] and receive a [`RouteGeometry`](crate::RouteGeometry)
//! polyline.
//!
//! Errors are returned when fewer than two coordinates are supplied, when the
//! provider rejects the request, or when the transport fails.

mod client;
mod error;
mod vehicle;

pub use client::{RouteQueryClient, ensure_routable};
pub use error::RouteError;
pub use vehicle::{TravelMode, VehicleProfile};
