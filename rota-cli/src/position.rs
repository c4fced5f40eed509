//! Parsing of `lat,lon` and `lat,lon,address` arguments.

use geo::Coord;
use rota_core::Waypoint;

use crate::CliError;

fn parse_degrees(text: &str, limit: f64) -> Option<f64> {
    let value: f64 = text.trim().parse().ok()?;
    (value.is_finite() && value.abs() <= limit).then_some(value)
}

fn parse_pair(lat: &str, lon: &str) -> Option<Coord> {
    Some(Coord {
        x: parse_degrees(lon, 180.0)?,
        y: parse_degrees(lat, 90.0)?,
    })
}

/// Parse `lat,lon` into a coordinate.
pub(crate) fn parse_position(value: &str) -> Result<Coord, CliError> {
    value
        .split_once(',')
        .and_then(|(lat, lon)| parse_pair(lat, lon))
        .ok_or_else(|| CliError::InvalidPosition {
            value: value.to_owned(),
        })
}

/// Parse `lat,lon,address` into a user waypoint.
///
/// The address may itself contain commas.
pub(crate) fn parse_stop(value: &str) -> Result<Waypoint, CliError> {
    let invalid = || CliError::InvalidStop {
        value: value.to_owned(),
    };
    let mut parts = value.splitn(3, ',');
    let (Some(lat), Some(lon), Some(address)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let address = address.trim();
    if address.is_empty() {
        return Err(invalid());
    }
    let location = parse_pair(lat, lon).ok_or_else(invalid)?;
    Ok(Waypoint::user(location, address))
}
