//! Great-circle distance and nearest-capital refinement.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capitals::{CAPITALS, Capital};

/// Capitals farther than this from the query point are not offered as a refinement.
pub const MAX_MATCH_DISTANCE_KM: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl From<GeoPoint> for haversine::Location {
    fn from(point: GeoPoint) -> Self {
        haversine::Location {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

/// Haversine distance in kilometres, on a 6371 km sphere.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    haversine::distance(a.into(), b.into(), haversine::Units::Kilometers)
}

/// A capital together with its distance from the point that selected it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinedLocation {
    pub capital: Capital,
    pub distance_km: f64,
}

impl RefinedLocation {
    pub fn rounded_km(&self) -> i64 {
        self.distance_km.round() as i64
    }
}

/// Closest entry of `capitals` to `point`, if it lies within [`MAX_MATCH_DISTANCE_KM`].
///
/// Ties go to the earlier entry in the list.
pub fn nearest_capital(point: GeoPoint, capitals: &[Capital]) -> Option<RefinedLocation> {
    let mut best: Option<RefinedLocation> = None;

    for capital in capitals {
        let distance_km = haversine_km(point, capital.point());
        if best.is_none_or(|b| distance_km < b.distance_km) {
            best = Some(RefinedLocation {
                capital: *capital,
                distance_km,
            });
        }
    }

    let best = best?;
    if best.distance_km <= MAX_MATCH_DISTANCE_KM {
        debug!(
            "Closest capital: {} ({} km away)",
            best.capital.name,
            best.rounded_km()
        );
        Some(best)
    } else {
        debug!(
            "No capital within {MAX_MATCH_DISTANCE_KM} km; closest would be {} at {} km",
            best.capital.name,
            best.rounded_km()
        );
        None
    }
}

/// [`nearest_capital`] over the built-in capital table.
pub fn refine(point: GeoPoint) -> Option<RefinedLocation> {
    nearest_capital(point, &CAPITALS)
}
