use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, warn};

use crate::domain::error::Result;
use crate::domain::geo::LatLng;
use crate::infrastructure::http_client::build_client;

// /@lat,lng,zoom
static AT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(-?\d+(?:\.\d+)?),(-?\d+(?:\.\d+)?)").unwrap());

// !3dLAT!4dLNG
static MARKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!3d(-?\d+(?:\.\d+)?)!4d(-?\d+(?:\.\d+)?)").unwrap());

// ?ll=lat,lng
static LL_PARAM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]ll=(-?\d+(?:\.\d+)?),(-?\d+(?:\.\d+)?)").unwrap());

/// Finds the first lat/lng pair embedded in a maps URL or its HTML.
pub fn extract_lat_lng(text: &str) -> Option<LatLng> {
    [&*AT_PATTERN, &*MARKER_PATTERN, &*LL_PARAM_PATTERN]
        .into_iter()
        .find_map(|pattern| {
            let caps = pattern.captures(text)?;
            let lat = caps.get(1)?.as_str().parse().ok()?;
            let lng = caps.get(2)?.as_str().parse().ok()?;
            Some(LatLng::new(lat, lng))
        })
}

/// Outcome of resolving a maps URL. Both non-`Found` variants are non-fatal for callers.
#[derive(Debug, Clone, PartialEq)]
pub enum MapsUrlResolution {
    Found(LatLng),
    NotFound,
    NetworkError(String),
}

#[async_trait]
pub trait MapsUrlResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> MapsUrlResolution;
}

/// Follows a maps share link and reads coordinates off the final URL or the page body.
pub struct HttpMapsUrlResolver {
    client: Client,
}

impl HttpMapsUrlResolver {
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
        })
    }
}

#[async_trait]
impl MapsUrlResolver for HttpMapsUrlResolver {
    async fn resolve(&self, url: &str) -> MapsUrlResolution {
        let start_url = url.trim();
        if start_url.is_empty() {
            return MapsUrlResolution::NotFound;
        }

        let response = match self
            .client
            .get(start_url)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %start_url, error = %err, "Maps URL request failed");
                return MapsUrlResolution::NetworkError(format!("Request failed: {}", err));
            }
        };

        let final_url = response.url().to_string();
        if let Some(coord) = extract_lat_lng(&final_url) {
            debug!(url = %start_url, final_url = %final_url, "Coordinates taken from final URL");
            return MapsUrlResolution::Found(coord);
        }

        let status = response.status();
        if !status.is_success() {
            warn!(url = %start_url, status = %status, "Maps URL returned non-success status");
            return MapsUrlResolution::NetworkError(format!("HTTP error {}: {}", status, final_url));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(url = %start_url, error = %err, "Failed to read maps page body");
                return MapsUrlResolution::NetworkError(format!(
                    "Failed to read response body: {}",
                    err
                ));
            }
        };

        match extract_lat_lng(&body) {
            Some(coord) => {
                debug!(url = %start_url, "Coordinates taken from page body");
                MapsUrlResolution::Found(coord)
            }
            None => {
                debug!(url = %start_url, final_url = %final_url, "No coordinates in maps page");
                MapsUrlResolution::NotFound
            }
        }
    }
}
