use serde::{Deserialize, Serialize};

use super::place::PlaceType;

/// Header of the import-compatible CSV the station export writes.
pub const IMPORT_CSV_HEADER: [&str; 6] = [
    "placeName",
    "placeTypeHint",
    "lat",
    "lng",
    "plusCode",
    "googleMapsUrl",
];

/// Which fuel offers the station export accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FuelFilterMode {
    /// Only HVO100 / XTL (DIN EN 15940); explicit blends are rejected.
    #[default]
    SureOnly,
    /// Anything mentioning HVO.
    IncludeBlends,
}

impl FuelFilterMode {
    pub fn from_flag(include_blends: bool) -> Self {
        if include_blends {
            FuelFilterMode::IncludeBlends
        } else {
            FuelFilterMode::SureOnly
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            FuelFilterMode::SureOnly => "HVO100/XTL only (default)",
            FuelFilterMode::IncludeBlends => "include blends",
        }
    }
}

/// Six decimals with exact ties rounded away from zero; `{:.6}` alone rounds them to even.
pub fn fixed6(value: f64) -> String {
    // -0.0 prints without a sign
    let value = if value == 0.0 { 0.0 } else { value };

    let exact = format!("{:.60}", value);
    let is_tie = exact
        .find('.')
        .and_then(|dot| exact.get(dot + 7..))
        .map(|rest| rest.starts_with('5') && rest[1..].bytes().all(|b| b == b'0'))
        .unwrap_or(false);

    if is_tie {
        format!("{:.6}", value + value.signum() * 5e-7)
    } else {
        format!("{:.6}", value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelStationCandidate {
    pub place_name: String,
    pub place_type_hint: PlaceType,
    pub lat: f64,
    pub lng: f64,
    pub plus_code: String,
    pub google_maps_url: String,
}

impl FuelStationCandidate {
    /// Dedup key: name plus coordinates rounded to six decimals.
    pub fn dedup_key(&self) -> (String, String, String) {
        (
            self.place_name.clone(),
            fixed6(self.lat),
            fixed6(self.lng),
        )
    }

    /// Cells in [`IMPORT_CSV_HEADER`] order.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.place_name.clone(),
            self.place_type_hint.to_string(),
            fixed6(self.lat),
            fixed6(self.lng),
            self.plus_code.clone(),
            self.google_maps_url.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed6_rounds_exact_ties_away_from_zero() {
        assert_eq!(fixed6(0.0078125), "0.007813");
        assert_eq!(fixed6(-0.0078125), "-0.007813");
        assert_eq!(fixed6(50.1), "50.100000");
        assert_eq!(fixed6(8.0000001), "8.000000");
        assert_eq!(fixed6(-0.0), "0.000000");
    }

    fn station(name: &str, lat: f64, lng: f64) -> FuelStationCandidate {
        FuelStationCandidate {
            place_name: name.to_string(),
            place_type_hint: PlaceType::HvoTankstelle,
            lat,
            lng,
            plus_code: String::new(),
            google_maps_url: String::new(),
        }
    }

    #[test]
    fn test_dedup_key_rounds_to_six_decimals() {
        assert_eq!(
            station("A", 50.12345649, 8.0).dedup_key(),
            station("A", 50.1234561, 8.0000001).dedup_key()
        );
        assert_ne!(station("A", 50.0, 8.0).dedup_key(), station("B", 50.0, 8.0).dedup_key());
    }

    #[test]
    fn test_record_matches_header() {
        let record = station("Tankhof", 48.1, 11.5).to_record();
        assert_eq!(record.len(), IMPORT_CSV_HEADER.len());
        assert_eq!(record[1], "HVO_TANKSTELLE");
        assert_eq!(record[2], "48.100000");
        assert_eq!(record[3], "11.500000");
    }

    #[test]
    fn test_filter_mode_from_flag() {
        assert_eq!(FuelFilterMode::from_flag(false), FuelFilterMode::SureOnly);
        assert_eq!(FuelFilterMode::from_flag(true).describe(), "include blends");
    }
}
