//! HTTP typeahead geocoder.

use std::time::Duration;

use geo::Coord;
use reqwest::Client;
use rota_core::Waypoint;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use super::tomtom::{SearchResponse, SearchResult};
use crate::http::{
    ClientBuildError, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, build_client, join_segments,
    parse_base_url, redact,
};

/// Default geocoding service base URL.
pub const DEFAULT_GEOCODING_BASE_URL: &str = "https://api.tomtom.com";

/// Default maximum number of suggestions.
pub const DEFAULT_SUGGESTION_LIMIT: u8 = 5;

/// Default ISO country filter.
pub const DEFAULT_COUNTRY_SET: &str = "BR";

/// Errors raised by [`HttpGeocoder::suggest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The request failed in transport.
    #[error("network error requesting {url}: {message}")]
    Network {
        /// Request URL with credentials removed.
        url: String,
        /// Description of the transport failure.
        message: String,
    },
    /// The request exceeded its deadline.
    #[error("search request timed out after {timeout_secs}s")]
    Timeout {
        /// Deadline that elapsed, in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success status.
    #[error("search service returned status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },
    /// The reply could not be decoded.
    #[error("failed to decode search response: {message}")]
    InvalidResponse {
        /// Decoder error detail.
        message: String,
    },
}

/// An address suggestion the user may pick as the next waypoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// Provider identifier.
    pub id: String,
    /// Suggested position (`x = longitude`, `y = latitude`).
    #[serde(serialize_with = "serialize_lat_lon")]
    pub location: Coord,
    /// Single-line formatted address.
    pub address: String,
}

fn serialize_lat_lon<S: serde::Serializer>(coord: &Coord, serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeStruct;
    let mut state = serializer.serialize_struct("LatLon", 2)?;
    state.serialize_field("latitude", &coord.y)?;
    state.serialize_field("longitude", &coord.x)?;
    state.end()
}

impl From<SearchResult> for Suggestion {
    fn from(result: SearchResult) -> Self {
        Self {
            id: result.id,
            location: Coord {
                x: result.position.lon,
                y: result.position.lat,
            },
            address: result.address.freeform_address,
        }
    }
}

impl From<Suggestion> for Waypoint {
    fn from(suggestion: Suggestion) -> Self {
        Self::user(suggestion.location, suggestion.address)
    }
}

/// Configuration for [`HttpGeocoder`].
#[derive(Clone)]
pub struct HttpGeocoderConfig {
    /// Base URL of the search service.
    pub base_url: String,
    /// API key sent as the `key` query parameter.
    pub api_key: String,
    /// Maximum number of suggestions.
    pub limit: u8,
    /// Comma-separated ISO country codes restricting matches.
    pub country_set: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl std::fmt::Debug for HttpGeocoderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGeocoderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("limit", &self.limit)
            .field("country_set", &self.country_set)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for HttpGeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODING_BASE_URL.to_owned(),
            api_key: String::new(),
            limit: DEFAULT_SUGGESTION_LIMIT,
            country_set: DEFAULT_COUNTRY_SET.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpGeocoderConfig {
    /// Create a configuration for `base_url` authenticated with `api_key`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the maximum number of suggestions.
    #[must_use]
    pub const fn with_limit(mut self, limit: u8) -> Self {
        self.limit = limit;
        self
    }

    /// Restrict matches to the given ISO country codes.
    #[must_use]
    pub fn with_country_set(mut self, country_set: impl Into<String>) -> Self {
        self.country_set = country_set.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Typeahead address search over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    client: Client,
    base_url: Url,
    config: HttpGeocoderConfig,
}

impl HttpGeocoder {
    /// Create a geocoder with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn with_config(config: HttpGeocoderConfig) -> Result<Self, ClientBuildError> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    fn build_search_url(&self, text: &str) -> Url {
        let query = format!("{text}.json");
        let mut url = join_segments(&self.base_url, ["search", "2", "search", query.as_str()]);
        url.query_pairs_mut()
            .append_pair("key", &self.config.api_key)
            .append_pair("typeahead", "true")
            .append_pair("limit", &self.config.limit.to_string())
            .append_pair("countrySet", &self.config.country_set);
        url
    }

    fn convert_reqwest_error(&self, error: reqwest::Error, url: &Url) -> GeocodeError {
        if error.is_timeout() {
            return GeocodeError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        GeocodeError::Network {
            url: redact(url),
            message: error.without_url().to_string(),
        }
    }

    /// Suggest addresses matching `text`, best match first.
    ///
    /// Blank text yields no suggestions without contacting the service.
    ///
    /// # Errors
    ///
    /// Returns a [`GeocodeError`] when the request fails or the reply cannot
    /// be decoded.
    pub async fn suggest(&self, text: &str) -> Result<Vec<Suggestion>, GeocodeError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.build_search_url(text);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &url))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Rejected {
                status: status.as_u16(),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &url))?;
        decode_suggestions(&body, usize::from(self.config.limit))
    }
}

fn decode_suggestions(body: &[u8], limit: usize) -> Result<Vec<Suggestion>, GeocodeError> {
    let response: SearchResponse =
        serde_json::from_slice(body).map_err(|err| GeocodeError::InvalidResponse {
            message: err.to_string(),
        })?;
    Ok(response
        .results
        .into_iter()
        .take(limit)
        .map(Suggestion::from)
        .collect())
}
