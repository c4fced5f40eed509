//! Vehicle constraints forwarded to the routing provider.

use serde::{Deserialize, Serialize};

/// Travel mode understood by the routing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    /// Private car.
    Car,
    /// Heavy goods vehicle.
    #[default]
    Truck,
    /// Light commercial van.
    Van,
    /// Bus.
    Bus,
    /// Bicycle.
    Bicycle,
    /// Walking.
    Pedestrian,
}

impl TravelMode {
    /// Provider query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Truck => "truck",
            Self::Van => "van",
            Self::Bus => "bus",
            Self::Bicycle => "bicycle",
            Self::Pedestrian => "pedestrian",
        }
    }
}

impl std::str::FromStr for TravelMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "car" => Ok(Self::Car),
            "truck" => Ok(Self::Truck),
            "van" => Ok(Self::Van),
            "bus" => Ok(Self::Bus),
            "bicycle" => Ok(Self::Bicycle),
            "pedestrian" => Ok(Self::Pedestrian),
            other => Err(format!("unknown travel mode {other:?}")),
        }
    }
}

/// Physical constraints of the vehicle being routed.
///
/// The default describes a 20 t rigid truck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleProfile {
    /// Height in metres.
    pub height_m: f64,
    /// Width in metres.
    pub width_m: f64,
    /// Length in metres.
    pub length_m: f64,
    /// Gross weight in kilograms.
    pub weight_kg: u32,
    /// Travel mode.
    pub travel_mode: TravelMode,
}

impl Default for VehicleProfile {
    fn default() -> Self {
        Self {
            height_m: 7.0,
            width_m: 2.5,
            length_m: 12.0,
            weight_kg: 20_000,
            travel_mode: TravelMode::Truck,
        }
    }
}

impl VehicleProfile {
    /// Set the travel mode.
    #[must_use]
    pub const fn with_travel_mode(mut self, travel_mode: TravelMode) -> Self {
        self.travel_mode = travel_mode;
        self
    }

    /// Set the gross weight.
    #[must_use]
    pub const fn with_weight_kg(mut self, weight_kg: u32) -> Self {
        self.weight_kg = weight_kg;
        self
    }

    /// Set height, width and length in metres.
    #[must_use]
    pub const fn with_dimensions(mut self, height_m: f64, width_m: f64, length_m: f64) -> Self {
        self.height_m = height_m;
        self.width_m = width_m;
        self.length_m = length_m;
        self
    }
}
