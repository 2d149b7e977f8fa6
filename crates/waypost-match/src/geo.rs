//! # Geographic Compatibility
//!
//! Two addresses are compatible when they name the same locality
//! (city, state and country compared case-insensitively after trimming)
//! AND, if both carry coordinates, lie within the threshold distance.
//!
//! When either side lacks coordinates the distance check passes
//! vacuously. This keeps legacy addresses matchable by name alone.

use serde::{Deserialize, Serialize};

use waypost_core::{Address, Coordinates};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default maximum distance for a compatible pair.
pub const DEFAULT_THRESHOLD_KM: f64 = 500.0;

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// The verdict for one address pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Compatibility {
    /// Administrative match AND distance within threshold.
    pub compatible: bool,
    /// Distance, when both sides have coordinates.
    pub distance_km: Option<f64>,
}

/// Address compatibility with a configurable radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoMatcher {
    threshold_km: f64,
}

impl Default for GeoMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_KM)
    }
}

impl GeoMatcher {
    /// A matcher accepting pairs up to `threshold_km` apart.
    pub fn new(threshold_km: f64) -> Self {
        Self { threshold_km }
    }

    /// The configured radius.
    pub fn threshold_km(&self) -> f64 {
        self.threshold_km
    }

    /// Judge whether `a` and `b` are compatible.
    pub fn compatible(&self, a: &Address, b: &Address) -> Compatibility {
        let same_locality = a.same_locality(b);
        let (within_radius, distance_km) = match (a.coordinates(), b.coordinates()) {
            (Some(ca), Some(cb)) => {
                let distance = haversine_km(ca, cb);
                (distance <= self.threshold_km, Some(distance))
            }
            // Missing coordinates: fall back to the administrative match.
            _ => (true, None),
        };
        Compatibility {
            compatible: same_locality && within_radius,
            distance_km,
        }
    }
}
