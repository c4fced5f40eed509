//! HTTP-based route query client for routing services.
//!
//! This module provides [`HttpRouteQueryClient`], an implementation of
//! [`rota_core::RouteQueryClient`] that fetches route geometry from a
//! TomTom-style `calculateRoute` service.
//!
//! # Error mapping
//!
//! | Provider outcome                         | `RouteError`        |
//! |------------------------------------------|---------------------|
//! | Non-success status with `NO_ROUTE_FOUND` | `NoRouteFound`      |
//! | Other non-success status                 | `ProviderRejected`  |
//! | Success without routes                   | `NoRouteFound`      |
//! | Undecodable success body                 | `InvalidResponse`   |
//! | Request timeout                          | `Timeout`           |
//! | Any other transport failure              | `Network`           |

mod provider;
mod tomtom;

#[doc(hidden)]
pub mod test_support;

pub use provider::{DEFAULT_ROUTING_BASE_URL, HttpRouteQueryClient, HttpRouteQueryClientConfig};
