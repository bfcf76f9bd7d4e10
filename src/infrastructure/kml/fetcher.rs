use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{error, info};

use crate::domain::error::{AppError, Result};
use crate::infrastructure::http_client::{build_client, snippet};

const KML_ACCEPT: &str = "application/vnd.google-earth.kml+xml,application/xml,text/xml,*/*";

/// Body characters quoted in a fetch failure.
const ERROR_BODY_CHARS: usize = 300;

#[async_trait]
pub trait KmlSource: Send + Sync {
    async fn fetch_kml(&self) -> Result<String>;
}

/// Downloads a My Maps KML export. Any failure aborts the run.
pub struct HttpKmlSource {
    client: Client,
    url: String,
}

impl HttpKmlSource {
    pub fn new(url: impl Into<String>, timeout_secs: u64, user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl KmlSource for HttpKmlSource {
    async fn fetch_kml(&self) -> Result<String> {
        info!(url = %self.url, "Fetching KML");

        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, KML_ACCEPT)
            .send()
            .await
            .map_err(|e| AppError::NetworkError(format!("KML fetch failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(url = %self.url, status = %status, "KML fetch failed");
            return Err(AppError::NetworkError(format!(
                "KML fetch failed: {} - {}",
                status,
                snippet(&body, ERROR_BODY_CHARS)
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::NetworkError(format!("Failed to read KML body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::test_server::{response, serve};

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let base = serve(vec![response(
            "200 OK",
            &[("Content-Type", "application/vnd.google-earth.kml+xml")],
            "<kml></kml>",
        )])
        .await;

        let source = HttpKmlSource::new(format!("{}/kml?mid=x", base), 5, "Mozilla/5.0").unwrap();
        assert_eq!(source.fetch_kml().await.unwrap(), "<kml></kml>");
    }

    #[tokio::test]
    async fn test_non_success_is_fatal_with_status_and_snippet() {
        let body = "x".repeat(500);
        let base = serve(vec![response("403 Forbidden", &[], &body)]).await;

        let source = HttpKmlSource::new(format!("{}/kml", base), 5, "Mozilla/5.0").unwrap();
        let err = source.fetch_kml().await.unwrap_err();

        match err {
            AppError::NetworkError(msg) => {
                assert!(msg.contains("403"), "{msg}");
                assert!(msg.ends_with(&"x".repeat(300)));
                assert!(!msg.contains(&"x".repeat(301)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
