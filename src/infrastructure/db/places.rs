use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::warn;

use crate::domain::error::{AppError, Result};
use crate::domain::place::{NewPlace, Place, PlaceDraft, PlacePatch, PlaceType, PlaceUpdate};
use crate::domain::rating::RatingDetail;

/// The narrow store surface the CSV import reconciles against.
#[async_trait]
pub trait PlaceStore: Send + Sync {
    /// Exact name match. With duplicates the oldest record wins.
    async fn find_by_name(&self, name: &str) -> Result<Option<Place>>;
    async fn create(&self, place: NewPlace) -> Result<Place>;
    async fn update(&self, id: i64, update: PlaceUpdate) -> Result<Place>;
}

const PLACE_COLUMNS: &str = "id, name, type, lat, lng, dog_allowed, sanitary, year_round, \
     online_booking, gastronomy, thumbnail_image_id, rating_detail, created_at, updated_at";

pub struct SqlitePlaceRepository {
    pool: SqlitePool,
}

impl SqlitePlaceRepository {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to parse connection string: {}", e))
            })?
            .create_if_missing(true);

        // An in-memory database lives only as long as its single connection.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {}", e)))?;

        let repo = Self { pool };
        repo.init_schema().await?;
        Ok(repo)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS places (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                type TEXT NOT NULL,
                lat REAL NOT NULL,
                lng REAL NOT NULL,
                dog_allowed INTEGER NOT NULL DEFAULT 0,
                sanitary INTEGER NOT NULL DEFAULT 0,
                year_round INTEGER NOT NULL DEFAULT 0,
                online_booking INTEGER NOT NULL DEFAULT 0,
                gastronomy INTEGER NOT NULL DEFAULT 0,
                thumbnail_image_id INTEGER,
                rating_detail TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create places table: {}", e)))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_places_name ON places(name)")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create name index: {}", e)))?;

        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Place>> {
        let entities = sqlx::query_as::<_, PlaceEntity>(&format!(
            "SELECT {} FROM places ORDER BY updated_at DESC, id DESC",
            PLACE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list places: {}", e)))?;

        entities.into_iter().map(Place::try_from).collect()
    }

    pub async fn get(&self, id: i64) -> Result<Place> {
        let entity = sqlx::query_as::<_, PlaceEntity>(&format!(
            "SELECT {} FROM places WHERE id = ?",
            PLACE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch place: {}", e)))?;

        match entity {
            Some(entity) => entity.try_into(),
            None => Err(AppError::NotFound(format!("Place not found: {}", id))),
        }
    }

    pub async fn create_full(&self, draft: PlaceDraft) -> Result<Place> {
        let now = Utc::now();
        let rating_json = rating_to_json(Some(&draft.rating_detail))?;

        let result = sqlx::query(
            "INSERT INTO places (name, type, lat, lng, dog_allowed, sanitary, year_round,
                online_booking, gastronomy, thumbnail_image_id, rating_detail, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&draft.name)
        .bind(draft.place_type.as_str())
        .bind(draft.lat)
        .bind(draft.lng)
        .bind(draft.dog_allowed)
        .bind(draft.sanitary)
        .bind(draft.year_round)
        .bind(draft.online_booking)
        .bind(draft.gastronomy)
        .bind(draft.thumbnail_image_id)
        .bind(rating_json)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create place: {}", e)))?;

        self.get(result.last_insert_rowid()).await
    }

    pub async fn update_full(&self, id: i64, patch: PlacePatch) -> Result<Place> {
        let rating_json = rating_to_json(patch.rating_detail.as_ref())?;
        let (set_thumbnail, thumbnail) = match patch.thumbnail_image_id {
            Some(value) => (true, value),
            None => (false, None),
        };

        let result = sqlx::query(
            "UPDATE places SET
                name = COALESCE(?, name),
                type = COALESCE(?, type),
                lat = COALESCE(?, lat),
                lng = COALESCE(?, lng),
                dog_allowed = COALESCE(?, dog_allowed),
                sanitary = COALESCE(?, sanitary),
                year_round = COALESCE(?, year_round),
                online_booking = COALESCE(?, online_booking),
                gastronomy = COALESCE(?, gastronomy),
                thumbnail_image_id = CASE WHEN ? THEN ? ELSE thumbnail_image_id END,
                rating_detail = COALESCE(?, rating_detail),
                updated_at = ?
             WHERE id = ?",
        )
        .bind(patch.name)
        .bind(patch.place_type.map(|t| t.as_str()))
        .bind(patch.lat)
        .bind(patch.lng)
        .bind(patch.dog_allowed)
        .bind(patch.sanitary)
        .bind(patch.year_round)
        .bind(patch.online_booking)
        .bind(patch.gastronomy)
        .bind(set_thumbnail)
        .bind(thumbnail)
        .bind(rating_json)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update place: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Place not found: {}", id)));
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM places WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete place: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Place not found: {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl PlaceStore for SqlitePlaceRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Place>> {
        let entity = sqlx::query_as::<_, PlaceEntity>(&format!(
            "SELECT {} FROM places WHERE name = ? ORDER BY id ASC LIMIT 1",
            PLACE_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to look up place by name: {}", e)))?;

        entity.map(Place::try_from).transpose()
    }

    async fn create(&self, place: NewPlace) -> Result<Place> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO places (name, type, lat, lng, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&place.name)
        .bind(place.place_type.as_str())
        .bind(place.lat)
        .bind(place.lng)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create place: {}", e)))?;

        self.get(result.last_insert_rowid()).await
    }

    async fn update(&self, id: i64, update: PlaceUpdate) -> Result<Place> {
        let result = sqlx::query(
            "UPDATE places SET type = ?, lat = ?, lng = ?, updated_at = ? WHERE id = ?",
        )
        .bind(update.place_type.as_str())
        .bind(update.lat)
        .bind(update.lng)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update place: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Place not found: {}", id)));
        }
        self.get(id).await
    }
}

fn rating_to_json(rating: Option<&RatingDetail>) -> Result<Option<String>> {
    rating
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| AppError::Internal(format!("Failed to serialize rating: {}", e)))
}

#[derive(sqlx::FromRow)]
struct PlaceEntity {
    id: i64,
    name: String,
    #[sqlx(rename = "type")]
    place_type: String,
    lat: f64,
    lng: f64,
    dog_allowed: bool,
    sanitary: bool,
    year_round: bool,
    online_booking: bool,
    gastronomy: bool,
    thumbnail_image_id: Option<i64>,
    rating_detail: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PlaceEntity> for Place {
    type Error = AppError;

    fn try_from(e: PlaceEntity) -> Result<Self> {
        let place_type = PlaceType::from_str(&e.place_type).map_err(AppError::DatabaseError)?;

        let rating_detail = match e.rating_detail.as_deref() {
            Some(raw) => match serde_json::from_str::<RatingDetail>(raw) {
                Ok(detail) => Some(detail),
                Err(err) => {
                    warn!(place_id = e.id, error = %err, "Ignoring unreadable rating");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            id: e.id,
            name: e.name,
            place_type,
            lat: e.lat,
            lng: e.lng,
            dog_allowed: e.dog_allowed,
            sanitary: e.sanitary,
            year_round: e.year_round,
            online_booking: e.online_booking,
            gastronomy: e.gastronomy,
            thumbnail_image_id: e.thumbnail_image_id,
            rating_detail,
            created_at: Some(e.created_at),
            updated_at: Some(e.updated_at),
            distance_km: None,
        })
    }
}
