//! Query points, distance units, and great-circle distance.
//!
//! Distances use the spherical law of cosines, converted from degrees of arc
//! to statute miles through the nautical-mile-per-arc-minute approximation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RankError;

/// Statute miles per arc minute (one nautical mile, in miles).
const MILES_PER_ARC_MINUTE: f64 = 1.1515;
const KILOMETERS_PER_MILE: f64 = 1.609344;
const NAUTICAL_MILES_PER_MILE: f64 = 0.8684;

/// A point on the globe in signed decimal degrees.
///
/// Only finiteness is enforced; out-of-range latitudes are accepted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Parse a `"<lon>|<lat>"` string as typed by a user.
    pub fn parse(input: &str) -> Result<Self, RankError> {
        let parts: Vec<&str> = input.split('|').map(str::trim).collect();
        let [lon, lat] = parts.as_slice() else {
            return Err(RankError::InvalidInput(format!(
                "expected \"<lon>|<lat>\", got {input:?}"
            )));
        };

        let parse_coord = |name: &str, raw: &str| -> Result<f64, RankError> {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| RankError::InvalidInput(format!("{name} {raw:?} is not a finite number")))
        };

        Ok(Self::new(parse_coord("longitude", lon)?, parse_coord("latitude", lat)?))
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.lon, self.lat)
    }
}

/// Unit a distance is reported in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
    NauticalMiles,
}

impl DistanceUnit {
    /// Convert a distance in statute miles to this unit.
    pub fn from_miles(self, miles: f64) -> f64 {
        match self {
            Self::Miles => miles,
            Self::Kilometers => miles * KILOMETERS_PER_MILE,
            Self::NauticalMiles => miles * NAUTICAL_MILES_PER_MILE,
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Miles => "mi",
            Self::Kilometers => "km",
            Self::NauticalMiles => "nm",
        };
        write!(f, "{s}")
    }
}

impl FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "mi" | "mile" | "miles" => Ok(Self::Miles),
            "k" | "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => {
                Ok(Self::Kilometers)
            }
            "n" | "nm" | "nautical" | "nautical_miles" | "nautical-miles" => {
                Ok(Self::NauticalMiles)
            }
            other => Err(format!("unknown distance unit: {other}")),
        }
    }
}

/// A distance tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit)
    }
}

/// Great-circle distance between two points in the requested unit.
pub fn distance(a: GeoPoint, b: GeoPoint, unit: DistanceUnit) -> f64 {
    unit.from_miles(distance_miles(a, b))
}

fn distance_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    if a.lat == b.lat && a.lon == b.lon {
        return 0.0;
    }

    let rlat1 = a.lat.to_radians();
    let rlat2 = b.lat.to_radians();
    let rtheta = (a.lon - b.lon).to_radians();

    let cos_arg = rlat1.sin() * rlat2.sin() + rlat1.cos() * rlat2.cos() * rtheta.cos();
    let clamped = cos_arg.clamp(-1.0, 1.0);
    if clamped != cos_arg {
        tracing::trace!(cos_arg, "Clamped arc-cosine argument");
    }

    clamped.acos().to_degrees() * 60.0 * MILES_PER_ARC_MINUTE
}
