use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::geo::BoundingBox;

pub const CONFIG_FILE: &str = "platzkarte.toml";
pub const ENV_PREFIX: &str = "PLATZKARTE_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub http: HttpConfig,
    pub geocoding: GeocodingConfig,
    pub kml: KmlConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub bind_host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KmlConfig {
    /// My Maps id of the HVO station map.
    pub map_id: String,
    pub output_dir: PathBuf,
    pub bbox: BoundingBox,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://platzkarte.db".to_string(),
            http: HttpConfig {
                bind_host: "127.0.0.1".to_string(),
                port: 3001,
            },
            geocoding: GeocodingConfig {
                timeout_secs: 15,
                user_agent: "Mozilla/5.0".to_string(),
            },
            kml: KmlConfig {
                map_id: "1sL1dIiegNJiRlVzG6_QgnWuko1A6VuU".to_string(),
                output_dir: PathBuf::from("data/import"),
                bbox: BoundingBox::germany(),
                timeout_secs: 30,
            },
        }
    }
}

impl KmlConfig {
    pub fn kml_url(&self) -> String {
        let mid: String = url::form_urlencoded::byte_serialize(self.map_id.as_bytes()).collect();
        format!("https://www.google.com/maps/d/kml?mid={}&forcekml=1", mid)
    }
}

impl AppConfig {
    /// Defaults, then `platzkarte.toml` in the working directory, then `PLATZKARTE_*` variables.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_figment(Self::figment(Path::new(CONFIG_FILE)))
    }

    pub fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(AppError::ConfigError("database_url must not be empty".to_string()));
        }
        if self.geocoding.timeout_secs == 0 {
            return Err(AppError::ConfigError(
                "geocoding.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.kml.timeout_secs == 0 {
            return Err(AppError::ConfigError(
                "kml.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.kml.map_id.trim().is_empty() {
            return Err(AppError::ConfigError("kml.map_id must not be empty".to_string()));
        }
        if !self.kml.bbox.is_valid() {
            return Err(AppError::ConfigError(format!(
                "kml.bbox is inverted: {:?}",
                self.kml.bbox
            )));
        }
        Ok(())
    }
}
