use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::domain::error::{AppError, Result};
use crate::domain::geo::{distance_km, LatLng};
use crate::domain::place::{Place, PlaceDraft, PlacePatch, PlaceType};
use crate::domain::rating::normalize_rating_detail;
use crate::infrastructure::db::SqlitePlaceRepository;

pub const NAME_MISSING: &str = "Name fehlt";
pub const INVALID_COORDINATES: &str = "Koordinaten ungültig";
pub const INVALID_THUMBNAIL: &str = "thumbnailImageId ungültig";

/// Number or numeric string. Blank strings and non-finite values are rejected.
fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) if !s.trim().is_empty() => {
            s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0 && !n.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Present and not null.
fn field<'a>(payload: &'a Value, key: &str) -> Option<&'a Value> {
    payload.get(key).filter(|v| !v.is_null())
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn place_type_of(value: Option<&Value>) -> PlaceType {
    PlaceType::from_payload(value.and_then(Value::as_str))
}

fn thumbnail_of(value: &Value) -> Result<Option<i64>> {
    if value.is_null() {
        return Ok(None);
    }
    json_number(value)
        .map(|n| Some(n as i64))
        .ok_or_else(|| AppError::ValidationError(INVALID_THUMBNAIL.to_string()))
}

/// Create payload of the place editor: name and coordinates required, everything else coerced.
pub fn normalize_create(payload: &Value) -> Result<PlaceDraft> {
    let name = field(payload, "name").map(as_text).unwrap_or_default();
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::ValidationError(NAME_MISSING.to_string()));
    }

    let lat = field(payload, "lat").and_then(json_number);
    let lng = field(payload, "lng").and_then(json_number);
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(AppError::ValidationError(INVALID_COORDINATES.to_string()));
    };

    let flag = |key: &str| field(payload, key).map(truthy).unwrap_or(false);

    Ok(PlaceDraft {
        name: name.to_string(),
        place_type: place_type_of(field(payload, "type")),
        lat,
        lng,
        dog_allowed: flag("dogAllowed"),
        sanitary: flag("sanitary"),
        year_round: flag("yearRound"),
        online_booking: flag("onlineBooking"),
        gastronomy: flag("gastronomy"),
        thumbnail_image_id: field(payload, "thumbnailImageId")
            .map(thumbnail_of)
            .transpose()?
            .flatten(),
        rating_detail: normalize_rating_detail(payload.get("ratingDetail").unwrap_or(&Value::Null)),
    })
}

/// Partial update payload. Absent or null fields are left alone; `thumbnailImageId: null` clears.
pub fn normalize_update(payload: &Value) -> Result<PlacePatch> {
    let mut patch = PlacePatch::default();

    if let Some(name) = field(payload, "name") {
        let trimmed = as_text(name).trim().to_string();
        if trimmed.is_empty() {
            return Err(AppError::ValidationError(NAME_MISSING.to_string()));
        }
        patch.name = Some(trimmed);
    }

    if let Some(value) = field(payload, "type") {
        patch.place_type = Some(place_type_of(Some(value)));
    }

    for (key, slot) in [("lat", &mut patch.lat), ("lng", &mut patch.lng)] {
        if let Some(value) = field(payload, key) {
            let n = json_number(value)
                .ok_or_else(|| AppError::ValidationError(INVALID_COORDINATES.to_string()))?;
            *slot = Some(n);
        }
    }

    patch.dog_allowed = field(payload, "dogAllowed").map(truthy);
    patch.sanitary = field(payload, "sanitary").map(truthy);
    patch.year_round = field(payload, "yearRound").map(truthy);
    patch.online_booking = field(payload, "onlineBooking").map(truthy);
    patch.gastronomy = field(payload, "gastronomy").map(truthy);

    if let Some(value) = payload.get("thumbnailImageId") {
        patch.thumbnail_image_id = Some(thumbnail_of(value)?);
    }

    if let Some(value) = payload.get("ratingDetail") {
        patch.rating_detail = Some(normalize_rating_detail(value));
    }

    Ok(patch)
}

/// Attaches distances from `origin` and sorts nearest first. Without an origin the order is kept.
pub fn with_distances(mut places: Vec<Place>, origin: Option<LatLng>) -> Vec<Place> {
    let Some(origin) = origin else {
        return places;
    };

    for place in &mut places {
        place.distance_km = Some(distance_km(origin.lat, origin.lng, place.lat, place.lng));
    }
    places.sort_by(|a, b| {
        a.distance_km
            .unwrap_or(f64::INFINITY)
            .total_cmp(&b.distance_km.unwrap_or(f64::INFINITY))
    });
    places
}

/// Place editor operations outside the CSV import.
pub struct PlaceService {
    repository: Arc<SqlitePlaceRepository>,
}

impl PlaceService {
    pub fn new(repository: Arc<SqlitePlaceRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_places(&self, origin: Option<LatLng>) -> Result<Vec<Place>> {
        let places = self.repository.list().await?;
        Ok(with_distances(places, origin))
    }

    pub async fn create_place(&self, payload: &Value) -> Result<Place> {
        let draft = normalize_create(payload)?;
        let place = self.repository.create_full(draft).await?;
        info!(place_id = place.id, name = %place.name, "Place created");
        Ok(place)
    }

    pub async fn update_place(&self, id: i64, payload: &Value) -> Result<Place> {
        let patch = normalize_update(payload)?;
        self.repository.update_full(id, patch).await
    }

    pub async fn delete_place(&self, id: i64) -> Result<()> {
        self.repository.delete(id).await?;
        info!(place_id = id, "Place deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rating::{RatingDetail, TsValue};
    use serde_json::json;

    #[test]
    fn test_create_requires_name() {
        let err = normalize_create(&json!({ "name": "   ", "lat": 1, "lng": 2 })).unwrap_err();
        assert_eq!(err, AppError::ValidationError(NAME_MISSING.to_string()));
    }

    #[test]
    fn test_create_rejects_bad_coordinates() {
        for payload in [
            json!({ "name": "X", "lat": "abc", "lng": 2 }),
            json!({ "name": "X", "lat": 1 }),
            json!({ "name": "X", "lat": "", "lng": 2 }),
        ] {
            let err = normalize_create(&payload).unwrap_err();
            assert_eq!(err, AppError::ValidationError(INVALID_COORDINATES.to_string()));
        }
    }

    #[test]
    fn test_create_defaults_and_coercion() {
        let draft = normalize_create(&json!({
            "name": "  Am Deich ",
            "type": "stellplatz",
            "lat": "53.5",
            "lng": 8.1,
            "dogAllowed": 1,
            "sanitary": "",
            "gastronomy": true
        }))
        .unwrap();

        assert_eq!(draft.name, "Am Deich");
        assert_eq!(draft.place_type, PlaceType::Campingplatz);
        assert_eq!((draft.lat, draft.lng), (53.5, 8.1));
        assert!(draft.dog_allowed);
        assert!(!draft.sanitary);
        assert!(draft.gastronomy);
        assert_eq!(draft.thumbnail_image_id, None);
        assert_eq!(draft.rating_detail, RatingDetail::blank());
    }

    #[test]
    fn test_update_only_sets_present_fields() {
        let patch = normalize_update(&json!({
            "lat": 50.0,
            "sanitary": false,
            "thumbnailImageId": null,
            "ratingDetail": { "tsHilde": "STIMMIG" }
        }))
        .unwrap();

        assert_eq!(patch.name, None);
        assert_eq!(patch.place_type, None);
        assert_eq!(patch.lat, Some(50.0));
        assert_eq!(patch.lng, None);
        assert_eq!(patch.sanitary, Some(false));
        assert_eq!(patch.dog_allowed, None);
        assert_eq!(patch.thumbnail_image_id, Some(None));
        assert_eq!(patch.rating_detail.unwrap().ts_hilde, TsValue::Stimmig);
    }

    #[test]
    fn test_update_rejects_present_but_invalid_values() {
        assert_eq!(
            normalize_update(&json!({ "lng": "nope" })).unwrap_err(),
            AppError::ValidationError(INVALID_COORDINATES.to_string())
        );
        assert_eq!(
            normalize_update(&json!({ "name": "" })).unwrap_err(),
            AppError::ValidationError(NAME_MISSING.to_string())
        );
        assert_eq!(
            normalize_update(&json!({ "thumbnailImageId": "x" })).unwrap_err(),
            AppError::ValidationError(INVALID_THUMBNAIL.to_string())
        );
    }

    #[tokio::test]
    async fn test_list_sorted_by_distance() {
        let repo = Arc::new(SqlitePlaceRepository::connect("sqlite::memory:").await.unwrap());
        let service = PlaceService::new(repo);

        for (name, lat, lng) in [("München", 48.1351, 11.5820), ("Hamburg", 53.5511, 9.9937)] {
            service
                .create_place(&json!({ "name": name, "lat": lat, "lng": lng }))
                .await
                .unwrap();
        }

        let berlin = LatLng::new(52.52, 13.405);
        let places = service.list_places(Some(berlin)).await.unwrap();

        let names: Vec<&str> = places.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Hamburg", "München"]);
        assert!(places.iter().all(|p| p.distance_km.is_some()));

        let unsorted = service.list_places(None).await.unwrap();
        assert!(unsorted.iter().all(|p| p.distance_km.is_none()));
    }

    #[tokio::test]
    async fn test_update_and_delete_roundtrip() {
        let repo = Arc::new(SqlitePlaceRepository::connect("sqlite::memory:").await.unwrap());
        let service = PlaceService::new(repo);
        let created = service
            .create_place(&json!({ "name": "Teich", "lat": 50, "lng": 8, "type": "STELLPLATZ" }))
            .await
            .unwrap();
        assert_eq!(created.rating_detail.as_ref().map(|r| r.total_points), Some(7));

        let updated = service
            .update_place(created.id, &json!({ "name": "Großer Teich", "yearRound": true }))
            .await
            .unwrap();
        assert_eq!(updated.name, "Großer Teich");
        assert_eq!(updated.place_type, PlaceType::Stellplatz);
        assert!(updated.year_round);

        service.delete_place(created.id).await.unwrap();
        assert!(matches!(
            service.update_place(created.id, &json!({})).await,
            Err(AppError::NotFound(_))
        ));
    }
}
