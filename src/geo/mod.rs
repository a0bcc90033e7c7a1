//! Great-circle distance and unit formatting.
//!
//! Pure geometry helpers shared by the catalog, evaluator, and UI-facing
//! formatting. No state, no side effects.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per foot.
const METERS_PER_FOOT: f64 = 0.3048;

/// Meters per statute mile.
const METERS_PER_MILE: f64 = 1_609.344;

/// A longitude/latitude pair in degrees.
///
/// Field order matches the `(lng, lat)` convention used by landmark
/// sources; constructors take latitude first to match GPS fixes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Longitude in degrees, [-180, 180]
    pub longitude: f64,
    /// Latitude in degrees, [-90, 90]
    pub latitude: f64,
}

impl Coordinates {
    /// Create coordinates from latitude and longitude in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Whether both components are finite and inside valid ranges.
    ///
    /// NaN and infinite values fail this check; so do latitudes beyond the
    /// poles and longitudes beyond the antimeridian.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Unit system preference for formatted distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Metric units (m, km)
    #[default]
    Metric,
    /// Imperial units (ft, mi)
    Imperial,
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitSystem::Metric => write!(f, "Metric"),
            UnitSystem::Imperial => write!(f, "Imperial"),
        }
    }
}

/// Haversine great-circle distance between two points, in meters.
///
/// Accurate to within normal GPS error over city-scale distances; no
/// ellipsoid correction.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Distance between two coordinate pairs, in meters.
pub fn distance_between(a: &Coordinates, b: &Coordinates) -> f64 {
    distance_meters(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Format a distance for display in the given unit system.
///
/// Metric: whole meters below 1 km, kilometers with one decimal above.
/// Imperial: whole feet below 1000 ft, miles with one decimal above.
pub fn format_distance(meters: f64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Metric => {
            if meters < 1000.0 {
                format!("{} m", meters.round() as i64)
            } else {
                format!("{:.1} km", meters / 1000.0)
            }
        }
        UnitSystem::Imperial => {
            let feet = meters / METERS_PER_FOOT;
            if feet < 1000.0 {
                format!("{} ft", feet.round() as i64)
            } else {
                format!("{:.1} mi", meters / METERS_PER_MILE)
            }
        }
    }
}
