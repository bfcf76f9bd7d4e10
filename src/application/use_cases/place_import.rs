use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};
use validator::Validate;

use crate::application::use_cases::geo_resolver::{GeoInput, GeoPriorityResolver};
use crate::application::use_cases::place_classifier::classify_place;
use crate::domain::csv::CsvRow;
use crate::domain::error::{AppError, Result};
use crate::domain::import::{
    ImportOutcome, ImportReport, MISSING_FIELDS_MESSAGE, MISSING_PLACE_NAME,
};
use crate::domain::place::{NewPlace, PlaceType, PlaceUpdate};
use crate::infrastructure::csv::{parse_csv, CsvParser};
use crate::infrastructure::db::PlaceStore;

pub const EMPTY_CSV_MESSAGE: &str = "CSV is empty (or only comments).";

/// Reconciles import rows against the place store, one row at a time, upserting by exact name.
pub struct PlaceImportUseCase {
    store: Arc<dyn PlaceStore>,
    geo: GeoPriorityResolver,
}

impl PlaceImportUseCase {
    pub fn new(store: Arc<dyn PlaceStore>, geo: GeoPriorityResolver) -> Self {
        Self { store, geo }
    }

    pub async fn import_csv(&self, text: &str) -> Result<ImportReport> {
        self.import_parsed(parse_csv(text)?).await
    }

    pub async fn import_file(&self, path: &Path) -> Result<ImportReport> {
        self.import_parsed(CsvParser::new().parse_file(path)?).await
    }

    async fn import_parsed(&self, rows: Vec<CsvRow>) -> Result<ImportReport> {
        if rows.is_empty() {
            return Err(AppError::ValidationError(EMPTY_CSV_MESSAGE.to_string()));
        }
        Ok(self.import_rows(&rows).await)
    }

    pub async fn import_rows(&self, rows: &[CsvRow]) -> ImportReport {
        info!(rows = rows.len(), "Starting place import");

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let outcome = self.import_row(row).await;
            match &outcome {
                ImportOutcome::Error { place_name, message } => {
                    warn!(row = row.index, place = %place_name, message = %message, "Import row failed")
                }
                other => debug!(row = row.index, outcome = ?other, "Import row done"),
            }
            results.push(outcome);
        }

        let report = ImportReport::new(results);
        info!(
            created = report.summary.created,
            updated = report.summary.updated,
            skipped = report.summary.skipped,
            error = report.summary.error,
            "Place import finished"
        );
        report
    }

    async fn import_row(&self, row: &CsvRow) -> ImportOutcome {
        let place_name = row.get_trimmed("placeName");
        let google_maps_url = row.get_trimmed("googleMapsUrl");
        let plus_code = row.get_trimmed("plusCode");
        let type_hint = row.get_trimmed("placeTypeHint");

        if place_name.is_empty() || google_maps_url.is_empty() {
            let reported = if place_name.is_empty() {
                MISSING_PLACE_NAME
            } else {
                place_name
            };
            return ImportOutcome::error(reported, MISSING_FIELDS_MESSAGE);
        }

        let place_type = classify_place(type_hint, place_name);

        let geo = match self
            .geo
            .resolve(GeoInput {
                lat: row.get("lat"),
                lng: row.get("lng"),
                plus_code,
                google_maps_url,
            })
            .await
        {
            Ok(geo) => geo,
            Err(err) => return ImportOutcome::error(place_name, err.to_string()),
        };
        debug!(place = %place_name, source = %geo.source, "Georeference resolved");

        match self.upsert(place_name, place_type, geo.lat, geo.lng).await {
            Ok(outcome) => outcome,
            Err(err) => ImportOutcome::error(place_name, err.to_string()),
        }
    }

    async fn upsert(
        &self,
        name: &str,
        place_type: PlaceType,
        lat: f64,
        lng: f64,
    ) -> Result<ImportOutcome> {
        if let Some(existing) = self.store.find_by_name(name).await? {
            self.store
                .update(existing.id, PlaceUpdate { place_type, lat, lng })
                .await?;
            return Ok(ImportOutcome::Updated {
                place_name: name.to_string(),
            });
        }

        let new_place = NewPlace {
            name: name.to_string(),
            place_type,
            lat,
            lng,
        };
        new_place
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        self.store.create(new_place).await?;
        Ok(ImportOutcome::Created {
            place_name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::geo_resolver::fakes::CountingResolver;
    use crate::domain::geo::LatLng;
    use crate::domain::import::{ImportSummary, NO_GEOREFERENCE_MESSAGE};
    use crate::domain::place::Place;
    use crate::infrastructure::db::SqlitePlaceRepository;
    use crate::infrastructure::geocoding::MapsUrlResolution;
    use async_trait::async_trait;

    const HEADER: &str = "placeName,placeTypeHint,lat,lng,plusCode,googleMapsUrl\n";

    async fn setup(
        answer: MapsUrlResolution,
    ) -> (Arc<SqlitePlaceRepository>, Arc<CountingResolver>, PlaceImportUseCase) {
        let store = Arc::new(SqlitePlaceRepository::connect("sqlite::memory:").await.unwrap());
        let fake = Arc::new(CountingResolver::new(answer));
        let use_case =
            PlaceImportUseCase::new(store.clone(), GeoPriorityResolver::new(fake.clone()));
        (store, fake, use_case)
    }

    #[tokio::test]
    async fn test_import_is_idempotent() {
        let (store, fake, use_case) = setup(MapsUrlResolution::NotFound).await;
        let csv = format!(
            "{}Camping Am See,,50.1,7.2,,https://maps.app.goo.gl/a\n",
            HEADER
        );

        let first = use_case.import_csv(&csv).await.unwrap();
        assert_eq!(first.results, vec![ImportOutcome::Created { place_name: "Camping Am See".into() }]);

        let second = use_case.import_csv(&csv).await.unwrap();
        assert_eq!(second.results, vec![ImportOutcome::Updated { place_name: "Camping Am See".into() }]);

        let places = store.list().await.unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].place_type, PlaceType::Campingplatz);
        assert_eq!((places[0].lat, places[0].lng), (50.1, 7.2));
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_rows_are_independent_and_ordered() {
        let (_store, _fake, use_case) = setup(MapsUrlResolution::NotFound).await;
        let csv = format!(
            "{}\
             # comment line\n\
             ,,1,2,,https://maps.app.goo.gl/a\n\
             Nirgendwo,,,,,https://maps.app.goo.gl/b\n\
             Burg Eltz,,50.2055,7.3366,,https://maps.app.goo.gl/c\n\
             Ohne Link,,50,7,,\n",
            HEADER
        );

        let report = use_case.import_csv(&csv).await.unwrap();

        assert_eq!(
            report.results,
            vec![
                ImportOutcome::error(MISSING_PLACE_NAME, MISSING_FIELDS_MESSAGE),
                ImportOutcome::error("Nirgendwo", NO_GEOREFERENCE_MESSAGE),
                ImportOutcome::Created { place_name: "Burg Eltz".into() },
                ImportOutcome::error("Ohne Link", MISSING_FIELDS_MESSAGE),
            ]
        );
        assert_eq!(
            report.summary,
            ImportSummary { created: 1, updated: 0, skipped: 0, error: 3 }
        );
    }

    #[tokio::test]
    async fn test_maps_url_used_only_as_last_resort() {
        let (store, fake, use_case) =
            setup(MapsUrlResolution::Found(LatLng::new(49.5, 8.5))).await;
        let csv = format!(
            "{}\
             Loreley,sehenswuerdigkeit,,,,https://maps.app.goo.gl/a\n\
             Plus,,,,9F3M8MPR+HH,https://maps.app.goo.gl/b\n",
            HEADER
        );

        let report = use_case.import_csv(&csv).await.unwrap();

        assert_eq!(report.summary.created, 2);
        assert_eq!(fake.calls(), 1);
        let loreley = store.find_by_name("Loreley").await.unwrap().unwrap();
        assert_eq!((loreley.lat, loreley.lng), (49.5, 8.5));
        assert_eq!(loreley.place_type, PlaceType::Sehenswuerdigkeit);
        let plus = store.find_by_name("Plus").await.unwrap().unwrap();
        assert!((plus.lng - 13.6914375).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_comment_after_stray_quote_is_not_imported() {
        let (_store, _fake, use_case) = setup(MapsUrlResolution::NotFound).await;
        let csv = "placeName,lat,lng,googleMapsUrl\n\
                   Camping 5\" Platz,50,8,u\n\
                   # nur ein Kommentar\n\
                   B,50,8,u\n";

        let report = use_case.import_csv(csv).await.unwrap();

        assert_eq!(
            report.results,
            vec![
                ImportOutcome::Created { place_name: "Camping 5\" Platz".into() },
                ImportOutcome::Created { place_name: "B".into() },
            ]
        );
    }

    #[tokio::test]
    async fn test_long_names_are_imported() {
        let (store, _fake, use_case) = setup(MapsUrlResolution::NotFound).await;
        let name = "Campingplatz ".repeat(50);
        let name = name.trim();
        let csv = format!("{}{},,50,8,,u\n", HEADER, name);

        let report = use_case.import_csv(&csv).await.unwrap();

        assert_eq!(report.summary, ImportSummary { created: 1, updated: 0, skipped: 0, error: 0 });
        assert!(store.find_by_name(name).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_empty_csv_is_rejected() {
        let (_store, _fake, use_case) = setup(MapsUrlResolution::NotFound).await;
        let err = use_case.import_csv("# nur Kommentar\n\n").await.unwrap_err();
        assert_eq!(err, AppError::ValidationError(EMPTY_CSV_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn test_import_file_reads_lossy_utf8() {
        let (store, _fake, use_case) = setup(MapsUrlResolution::NotFound).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orte.csv");
        let mut bytes = HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(b"Caf\xe9 am Markt,,50,8,,u\n");
        std::fs::write(&path, bytes).unwrap();

        let report = use_case.import_file(&path).await.unwrap();

        assert_eq!(report.summary.created, 1);
        assert!(store.find_by_name("Caf\u{FFFD} am Markt").await.unwrap().is_some());
    }

    struct FailingStore;

    #[async_trait]
    impl PlaceStore for FailingStore {
        async fn find_by_name(&self, name: &str) -> Result<Option<Place>> {
            if name == "Kaputt" {
                return Err(AppError::DatabaseError("disk I/O error".into()));
            }
            Ok(None)
        }

        async fn create(&self, place: NewPlace) -> Result<Place> {
            Ok(Place {
                id: 1,
                name: place.name,
                place_type: place.place_type,
                lat: place.lat,
                lng: place.lng,
                dog_allowed: false,
                sanitary: false,
                year_round: false,
                online_booking: false,
                gastronomy: false,
                thumbnail_image_id: None,
                rating_detail: None,
                created_at: None,
                updated_at: None,
                distance_km: None,
            })
        }

        async fn update(&self, id: i64, _update: PlaceUpdate) -> Result<Place> {
            Err(AppError::NotFound(format!("Place not found: {}", id)))
        }
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_row_error() {
        let fake = Arc::new(CountingResolver::new(MapsUrlResolution::NotFound));
        let use_case = PlaceImportUseCase::new(Arc::new(FailingStore), GeoPriorityResolver::new(fake));
        let csv = format!(
            "{}Kaputt,,1,2,,u\nHeil,,1,2,,u\n",
            HEADER
        );

        let report = use_case.import_csv(&csv).await.unwrap();

        assert_eq!(
            report.results,
            vec![
                ImportOutcome::error("Kaputt", "Database error: disk I/O error"),
                ImportOutcome::Created { place_name: "Heil".into() },
            ]
        );
    }
}
