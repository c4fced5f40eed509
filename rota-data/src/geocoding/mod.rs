//! Address suggestions for the waypoint search box.
//!
//! [`HttpGeocoder::suggest`] returns ranked [`Suggestion`]s for partially
//! typed text, capped in count and restricted to a country set. A chosen
//! suggestion converts into a user waypoint ready for appending.

mod provider;
mod tomtom;

pub use provider::{
    DEFAULT_COUNTRY_SET, DEFAULT_GEOCODING_BASE_URL, DEFAULT_SUGGESTION_LIMIT, GeocodeError,
    HttpGeocoder, HttpGeocoderConfig, Suggestion,
};
