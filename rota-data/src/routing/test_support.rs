//! Test utilities for routing clients.
//!
//! This module provides [`StubRouteQueryClient`], a deterministic test double
//! for [`RouteQueryClient`] that returns scripted replies without making
//! HTTP requests. Replies may be delayed with `tokio::time`, so tests running
//! on a paused clock can hold a query in flight while the waypoint list
//! changes underneath it.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use rota_core::{RouteError, RouteGeometry, RouteQueryClient, VehicleProfile, ensure_routable};

/// What a scripted call returns.
#[derive(Debug, Clone, PartialEq)]
enum StubOutcome {
    Echo,
    Geometry(RouteGeometry),
    Error(RouteError),
}

/// One scripted reply.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use rota_core::RouteError;
/// use rota_data::routing::test_support::StubReply;
///
/// let slow_failure = StubReply::error(RouteError::NoRouteFound).after(Duration::from_secs(2));
/// # let _ = slow_failure;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StubReply {
    outcome: StubOutcome,
    delay: Duration,
}

impl StubReply {
    /// Reply with a straight line through the requested coordinates.
    #[must_use]
    pub const fn echo() -> Self {
        Self {
            outcome: StubOutcome::Echo,
            delay: Duration::ZERO,
        }
    }

    /// Reply with a fixed geometry.
    #[must_use]
    pub const fn geometry(geometry: RouteGeometry) -> Self {
        Self {
            outcome: StubOutcome::Geometry(geometry),
            delay: Duration::ZERO,
        }
    }

    /// Reply with an error.
    #[must_use]
    pub const fn error(error: RouteError) -> Self {
        Self {
            outcome: StubOutcome::Error(error),
            delay: Duration::ZERO,
        }
    }

    /// Delay the reply by `delay`.
    #[must_use]
    pub const fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn resolve(self, coordinates: &[Coord]) -> Result<RouteGeometry, RouteError> {
        match self.outcome {
            StubOutcome::Echo => Ok(RouteGeometry::new(coordinates.to_vec())),
            StubOutcome::Geometry(geometry) => Ok(geometry),
            StubOutcome::Error(error) => Err(error),
        }
    }
}

/// Stub `RouteQueryClient` for testing.
///
/// Scripted replies are consumed in call order; once the script runs out the
/// fallback reply answers every call. Every call's coordinates are recorded.
#[derive(Debug)]
pub struct StubRouteQueryClient {
    script: Mutex<VecDeque<StubReply>>,
    fallback: StubReply,
    calls: Mutex<Vec<Vec<Coord>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for StubRouteQueryClient {
    fn default() -> Self {
        Self::with_fallback(StubReply::echo())
    }
}

impl StubRouteQueryClient {
    /// Create a client answering every call with `reply`.
    #[must_use]
    pub fn with_fallback(reply: StubReply) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a client returning a straight line through the input.
    #[must_use]
    pub fn echo() -> Self {
        Self::default()
    }

    /// Create a client returning `error` for every call.
    #[must_use]
    pub fn with_error(error: RouteError) -> Self {
        Self::with_fallback(StubReply::error(error))
    }

    /// Create a client answering the first calls from `replies`, then echoing.
    #[must_use]
    pub fn scripted(replies: impl IntoIterator<Item = StubReply>) -> Self {
        let client = Self::default();
        lock(&client.script).extend(replies);
        client
    }

    /// Coordinates of every call so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<Coord>> {
        lock(&self.calls).clone()
    }

    /// Number of calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn next_reply(&self) -> StubReply {
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl RouteQueryClient for StubRouteQueryClient {
    async fn compute_route(
        &self,
        coordinates: &[Coord],
        _profile: &VehicleProfile,
    ) -> Result<RouteGeometry, RouteError> {
        ensure_routable(coordinates)?;
        lock(&self.calls).push(coordinates.to_vec());
        let reply = self.next_reply();
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.resolve(coordinates)
    }
}
