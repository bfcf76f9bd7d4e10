use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::rating::RatingDetail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaceType {
    Campingplatz,
    Stellplatz,
    Sehenswuerdigkeit,
    HvoTankstelle,
}

impl PlaceType {
    pub const ALL: [PlaceType; 4] = [
        PlaceType::Campingplatz,
        PlaceType::Stellplatz,
        PlaceType::Sehenswuerdigkeit,
        PlaceType::HvoTankstelle,
    ];

    /// Fallback used by the CSV import when neither hint nor name heuristics match.
    pub const IMPORT_DEFAULT: PlaceType = PlaceType::Sehenswuerdigkeit;

    /// Fallback used by the place create/update payloads.
    pub const WRITE_DEFAULT: PlaceType = PlaceType::Campingplatz;

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceType::Campingplatz => "CAMPINGPLATZ",
            PlaceType::Stellplatz => "STELLPLATZ",
            PlaceType::Sehenswuerdigkeit => "SEHENSWUERDIGKEIT",
            PlaceType::HvoTankstelle => "HVO_TANKSTELLE",
        }
    }

    /// Lenient hint parsing: trimmed, case-insensitive, exact tag.
    pub fn from_hint(hint: &str) -> Option<PlaceType> {
        hint.trim().to_uppercase().parse().ok()
    }

    /// Write-path normalization: exact tag or [`PlaceType::WRITE_DEFAULT`].
    pub fn from_payload(value: Option<&str>) -> PlaceType {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or(PlaceType::WRITE_DEFAULT)
    }
}

impl FromStr for PlaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlaceType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown place type: {}", s))
    }
}

impl fmt::Display for PlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored place as owned by the place store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub place_type: PlaceType,
    pub lat: f64,
    pub lng: f64,
    pub dog_allowed: bool,
    pub sanitary: bool,
    pub year_round: bool,
    pub online_booking: bool,
    pub gastronomy: bool,
    pub thumbnail_image_id: Option<i64>,
    pub rating_detail: Option<RatingDetail>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Filled in by listings that know the caller's position.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distance_km: Option<f64>,
}

/// Fields the importer writes when creating a place.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewPlace {
    #[validate(length(min = 1))]
    pub name: String,
    pub place_type: PlaceType,
    pub lat: f64,
    pub lng: f64,
}

/// Fields the importer overwrites on an existing place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceUpdate {
    pub place_type: PlaceType,
    pub lat: f64,
    pub lng: f64,
}

/// Normalized create payload of the place editor.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDraft {
    pub name: String,
    pub place_type: PlaceType,
    pub lat: f64,
    pub lng: f64,
    pub dog_allowed: bool,
    pub sanitary: bool,
    pub year_round: bool,
    pub online_booking: bool,
    pub gastronomy: bool,
    pub thumbnail_image_id: Option<i64>,
    pub rating_detail: RatingDetail,
}

/// Normalized partial update of the place editor. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacePatch {
    pub name: Option<String>,
    pub place_type: Option<PlaceType>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub dog_allowed: Option<bool>,
    pub sanitary: Option<bool>,
    pub year_round: Option<bool>,
    pub online_booking: Option<bool>,
    pub gastronomy: Option<bool>,
    /// `Some(None)` clears the thumbnail.
    pub thumbnail_image_id: Option<Option<i64>>,
    pub rating_detail: Option<RatingDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_parsing_is_case_insensitive() {
        assert_eq!(PlaceType::from_hint(" hvo_tankstelle "), Some(PlaceType::HvoTankstelle));
        assert_eq!(PlaceType::from_hint("Stellplatz"), Some(PlaceType::Stellplatz));
        assert_eq!(PlaceType::from_hint("CAMPING"), None);
        assert_eq!(PlaceType::from_hint(""), None);
    }

    #[test]
    fn test_payload_defaults_differ_from_import() {
        assert_eq!(PlaceType::from_payload(None), PlaceType::Campingplatz);
        assert_eq!(PlaceType::from_payload(Some("stellplatz")), PlaceType::Campingplatz);
        assert_eq!(PlaceType::from_payload(Some("STELLPLATZ")), PlaceType::Stellplatz);
        assert_ne!(PlaceType::IMPORT_DEFAULT, PlaceType::WRITE_DEFAULT);
    }

    #[test]
    fn test_serde_uses_upper_tags() {
        let json = serde_json::to_string(&PlaceType::HvoTankstelle).unwrap();
        assert_eq!(json, "\"HVO_TANKSTELLE\"");
        let parsed: PlaceType = serde_json::from_str("\"SEHENSWUERDIGKEIT\"").unwrap();
        assert_eq!(parsed, PlaceType::Sehenswuerdigkeit);
    }
}
