//! HTTP-based `RouteQueryClient` for a TomTom-style routing service.
//!
//! The client builds a `calculateRoute` request whose path lists every
//! coordinate as `lat,lon` joined by `:`, appends the vehicle constraints as
//! query parameters and flattens the legs of the first returned route into a
//! [`RouteGeometry`].
//!
//! # Example
//!
//! ```no_run
//! use geo::Coord;
//! use rota_core::{RouteQueryClient, VehicleProfile};
//! use rota_data::routing::{HttpRouteQueryClient, HttpRouteQueryClientConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpRouteQueryClientConfig::new("https://api.tomtom.com", "my-key");
//! let client = HttpRouteQueryClient::with_config(config)?;
//! let geometry = client
//!     .compute_route(
//!         &[Coord { x: -46.63, y: -23.55 }, Coord { x: -46.64, y: -23.56 }],
//!         &VehicleProfile::default(),
//!     )
//!     .await?;
//! println!("{} points", geometry.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use reqwest::{Client, StatusCode};
use rota_core::{RouteError, RouteGeometry, RouteQueryClient, VehicleProfile, ensure_routable};
use url::Url;

use super::tomtom::CalculateRouteResponse;
use crate::http::{
    ClientBuildError, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, build_client, join_segments,
    parse_base_url, redact,
};

/// Default routing service base URL.
pub const DEFAULT_ROUTING_BASE_URL: &str = "https://api.tomtom.com";

/// Configuration for [`HttpRouteQueryClient`].
#[derive(Clone)]
pub struct HttpRouteQueryClientConfig {
    /// Base URL of the routing service (e.g., `"https://api.tomtom.com"`).
    pub base_url: String,
    /// API key sent as the `key` query parameter.
    pub api_key: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl std::fmt::Debug for HttpRouteQueryClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRouteQueryClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for HttpRouteQueryClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ROUTING_BASE_URL.to_owned(),
            api_key: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpRouteQueryClientConfig {
    /// Create a configuration for `base_url` authenticated with `api_key`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Routing client speaking the `calculateRoute` JSON API.
#[derive(Debug, Clone)]
pub struct HttpRouteQueryClient {
    client: Client,
    base_url: Url,
    config: HttpRouteQueryClientConfig,
}

impl HttpRouteQueryClient {
    /// Create a client for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ClientBuildError> {
        Self::with_config(HttpRouteQueryClientConfig::new(base_url, api_key))
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn with_config(config: HttpRouteQueryClientConfig) -> Result<Self, ClientBuildError> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Build the request URL for `coordinates` and `profile`.
    ///
    /// The path is `{base}/routing/1/calculateRoute/{lat,lon:...}/json`.
    fn build_route_url(&self, coordinates: &[Coord], profile: &VehicleProfile) -> Url {
        let locations = coordinates
            .iter()
            .map(|coord| format!("{},{}", coord.y, coord.x))
            .collect::<Vec<_>>()
            .join(":");
        let mut url = join_segments(
            &self.base_url,
            ["routing", "1", "calculateRoute", locations.as_str(), "json"],
        );
        url.query_pairs_mut()
            .append_pair("key", &self.config.api_key)
            .append_pair("vehicleHeight", &profile.height_m.to_string())
            .append_pair("vehicleWidth", &profile.width_m.to_string())
            .append_pair("vehicleLength", &profile.length_m.to_string())
            .append_pair("vehicleWeight", &profile.weight_kg.to_string())
            .append_pair("travelMode", profile.travel_mode.as_str());
        url
    }

    /// Convert a reqwest error to a `RouteError`.
    fn convert_reqwest_error(&self, error: reqwest::Error, url: &Url) -> RouteError {
        if error.is_timeout() {
            return RouteError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        RouteError::Network {
            url: redact(url),
            // The error's own rendering embeds the URL, key included.
            message: error.without_url().to_string(),
        }
    }

    async fn fetch(&self, url: &Url) -> Result<(StatusCode, Vec<u8>), RouteError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, url))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(err, url))?;
        Ok((status, body.to_vec()))
    }
}

/// Map a provider reply to geometry or an error.
pub(crate) fn interpret_reply(status: StatusCode, body: &[u8]) -> Result<RouteGeometry, RouteError> {
    let decoded = serde_json::from_slice::<CalculateRouteResponse>(body);
    if !status.is_success() {
        let parsed = decoded.unwrap_or_default();
        if parsed.reports_no_route() {
            return Err(RouteError::NoRouteFound);
        }
        return Err(RouteError::ProviderRejected {
            status: Some(status.as_u16()),
            message: parsed
                .error_message()
                .unwrap_or_else(|| status.to_string()),
        });
    }
    let parsed = decoded.map_err(|err| RouteError::InvalidResponse {
        message: err.to_string(),
    })?;
    if parsed.reports_no_route() {
        return Err(RouteError::NoRouteFound);
    }
    parsed
        .into_first_route_points()
        .map(RouteGeometry::new)
        .ok_or(RouteError::NoRouteFound)
}

#[async_trait]
impl RouteQueryClient for HttpRouteQueryClient {
    async fn compute_route(
        &self,
        coordinates: &[Coord],
        profile: &VehicleProfile,
    ) -> Result<RouteGeometry, RouteError> {
        ensure_routable(coordinates)?;
        let url = self.build_route_url(coordinates, profile);
        log::debug!(
            "requesting route through {} points from {}",
            coordinates.len(),
            redact(&url)
        );
        let (status, body) = self.fetch(&url).await?;
        interpret_reply(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::TravelMode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn client() -> HttpRouteQueryClient {
        HttpRouteQueryClient::new("https://api.example.com", "secret").expect("client should build")
    }

    const STOPS: [Coord; 3] = [
        Coord { x: -46.63, y: -23.55 },
        Coord { x: -46.64, y: -23.56 },
        Coord { x: -46.65, y: -23.57 },
    ];

    fn coords(count: usize) -> Vec<Coord> {
        STOPS.iter().copied().take(count).collect()
    }

    #[rstest]
    fn url_lists_coordinates_as_lat_lon(client: HttpRouteQueryClient) {
        let url = client.build_route_url(&coords(3), &VehicleProfile::default());
        assert_eq!(
            url.path(),
            "/routing/1/calculateRoute/-23.55,-46.63:-23.56,-46.64:-23.57,-46.65/json"
        );
    }

    #[rstest]
    fn url_carries_vehicle_constraints(client: HttpRouteQueryClient) {
        let profile = VehicleProfile::default().with_travel_mode(TravelMode::Van);
        let url = client.build_route_url(&coords(2), &profile);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let expected = [
            ("key", "secret"),
            ("vehicleHeight", "7"),
            ("vehicleWidth", "2.5"),
            ("vehicleLength", "12"),
            ("vehicleWeight", "20000"),
            ("travelMode", "van"),
        ];
        for (name, value) in expected {
            assert!(
                pairs.iter().any(|(k, v)| k == name && v == value),
                "missing {name}={value} in {pairs:?}"
            );
        }
    }

    #[rstest]
    fn trailing_slash_in_base_is_ignored() {
        let client =
            HttpRouteQueryClient::new("https://api.example.com/", "k").expect("client should build");
        let url = client.build_route_url(&coords(2), &VehicleProfile::default());
        assert!(url.as_str().starts_with("https://api.example.com/routing/"));
    }

    #[rstest]
    #[tokio::test]
    async fn single_coordinate_fails_without_request(client: HttpRouteQueryClient) {
        let err = client
            .compute_route(&coords(1), &VehicleProfile::default())
            .await
            .expect_err("should fail");
        assert_eq!(err, RouteError::InsufficientPoints { count: 1 });
    }

    #[rstest]
    fn success_flattens_first_route() {
        let body = br#"{"routes":[{"legs":[{"points":[{"latitude":1.0,"longitude":2.0}]},
            {"points":[{"latitude":3.0,"longitude":4.0}]}]}]}"#;
        let geometry = interpret_reply(StatusCode::OK, body).expect("should parse");
        assert_eq!(
            geometry.points(),
            &[Coord { x: 2.0, y: 1.0 }, Coord { x: 4.0, y: 3.0 }]
        );
    }

    #[rstest]
    #[case(StatusCode::OK, br#"{"routes":[]}"#.as_slice())]
    #[case(
        StatusCode::BAD_REQUEST,
        br#"{"detailedError":{"code":"NO_ROUTE_FOUND","message":"none"}}"#.as_slice()
    )]
    fn missing_route_maps_to_no_route_found(#[case] status: StatusCode, #[case] body: &[u8]) {
        assert_eq!(interpret_reply(status, body), Err(RouteError::NoRouteFound));
    }

    #[rstest]
    fn client_error_maps_to_rejection() {
        let body = br#"{"detailedError":{"code":"BAD_INPUT","message":"vehicleWeight out of range"}}"#;
        let err = interpret_reply(StatusCode::BAD_REQUEST, body).expect_err("should fail");
        assert_eq!(
            err,
            RouteError::ProviderRejected {
                status: Some(400),
                message: "BAD_INPUT: vehicleWeight out of range".to_owned(),
            }
        );
    }

    #[rstest]
    fn undecodable_error_body_still_rejects() {
        let err = interpret_reply(StatusCode::FORBIDDEN, b"<html>").expect_err("should fail");
        assert!(matches!(
            err,
            RouteError::ProviderRejected {
                status: Some(403),
                ..
            }
        ));
    }

    #[rstest]
    fn undecodable_success_body_is_invalid_response() {
        let err = interpret_reply(StatusCode::OK, b"not json").expect_err("should fail");
        assert!(matches!(err, RouteError::InvalidResponse { .. }));
    }

    #[rstest]
    fn config_debug_hides_api_key() {
        let config = HttpRouteQueryClientConfig::new("https://api.example.com", "secret");
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = HttpRouteQueryClientConfig::new("http://example.com", "k")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("test-agent/1.0");

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "test-agent/1.0");
    }
}
