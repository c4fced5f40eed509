use thiserror::Error;

/// Errors from [`crate::route::RouteQueryClient::compute_route`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Fewer than two coordinates were supplied.
    ///
    /// Callers should only query once the waypoint list is routable.
    #[error("at least two coordinates are required, got {count}")]
    InsufficientPoints {
        /// Number of coordinates supplied.
        count: usize,
    },

    /// The provider refused the request (bad request or parameters).
    #[error("routing provider rejected the request: {message}")]
    ProviderRejected {
        /// HTTP status code, when the rejection came over HTTP.
        status: Option<u16>,
        /// Error detail reported by the provider.
        message: String,
    },

    /// The request failed in transport.
    #[error("network error requesting {url}: {message}")]
    Network {
        /// Request URL with credentials removed.
        url: String,
        /// Description of the transport failure.
        message: String,
    },

    /// The request or the query as a whole exceeded its deadline.
    #[error("route request timed out after {timeout_secs}s")]
    Timeout {
        /// Deadline that elapsed, in seconds.
        timeout_secs: u64,
    },

    /// The provider answered but found no route connecting the points.
    #[error("no route connects the requested points")]
    NoRouteFound,

    /// The provider reply could not be decoded.
    #[error("failed to decode routing response: {message}")]
    InvalidResponse {
        /// Decoder error detail.
        message: String,
    },
}
