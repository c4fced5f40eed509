//! Response types for the TomTom-style fuzzy search service.

use serde::Deserialize;

/// Body of a search reply.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    /// Ranked matches.
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// One ranked match.
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    /// Provider identifier.
    #[serde(default)]
    pub id: String,
    /// Match position.
    pub position: Position,
    /// Match address.
    #[serde(default)]
    pub address: Address,
}

/// Coordinate in provider order.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Position {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// Address block of a match.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Single-line formatted address.
    #[serde(default)]
    pub freeform_address: String,
}
