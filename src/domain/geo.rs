use serde::{Deserialize, Serialize};
use std::fmt;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Which resolution strategy produced a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeoSource {
    CsvLatLng,
    PlusCode,
    MapsUrl,
}

impl fmt::Display for GeoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoSource::CsvLatLng => write!(f, "CSV_LAT_LNG"),
            GeoSource::PlusCode => write!(f, "PLUS_CODE"),
            GeoSource::MapsUrl => write!(f, "MAPS_URL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedGeo {
    pub lat: f64,
    pub lng: f64,
    pub source: GeoSource,
}

/// Inclusive rectangular lat/lng filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Generous box around Germany.
    pub fn germany() -> Self {
        Self {
            min_lat: 47.0,
            max_lat: 55.2,
            min_lng: 5.5,
            max_lng: 15.7,
        }
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }

    pub fn is_valid(&self) -> bool {
        self.min_lat <= self.max_lat && self.min_lng <= self.max_lng
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::germany()
    }
}

/// Parses a coordinate cell. Accepts `,` as decimal separator (first occurrence only).
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    let v = raw.trim();
    if v.is_empty() {
        return None;
    }
    v.replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Great-circle distance in kilometres (haversine).
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

pub fn format_distance_km(km: f64) -> Option<String> {
    if !km.is_finite() {
        return None;
    }
    if km < 10.0 {
        Some(format!("{:.1} km", km))
    } else {
        Some(format!("{:.0} km", km))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate_accepts_comma() {
        assert_eq!(parse_coordinate("50,25"), Some(50.25));
        assert_eq!(parse_coordinate(" 8.5 "), Some(8.5));
        assert_eq!(parse_coordinate(""), None);
        assert_eq!(parse_coordinate("abc"), None);
        assert_eq!(parse_coordinate("inf"), None);
        assert_eq!(parse_coordinate("NaN"), None);
    }

    #[test]
    fn test_distance_same_point_is_zero() {
        assert_eq!(distance_km(50.0, 8.0, 50.0, 8.0), 0.0);
    }

    #[test]
    fn test_distance_berlin_munich() {
        let km = distance_km(52.5200, 13.4050, 48.1351, 11.5820);
        assert!((km - 504.0).abs() < 5.0, "got {km}");
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance_km(3.44).as_deref(), Some("3.4 km"));
        assert_eq!(format_distance_km(42.4).as_deref(), Some("42 km"));
        assert_eq!(format_distance_km(f64::NAN), None);
    }

    #[test]
    fn test_bounding_box_is_inclusive() {
        let bbox = BoundingBox::germany();
        assert!(bbox.contains(47.0, 5.5));
        assert!(bbox.contains(55.2, 15.7));
        assert!(!bbox.contains(46.99, 8.0));
        assert!(!bbox.contains(50.0, 2.35));
    }
}
