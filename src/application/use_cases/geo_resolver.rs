use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::geo::{parse_coordinate, GeoSource, ResolvedGeo};
use crate::domain::import::NO_GEOREFERENCE_MESSAGE;
use crate::infrastructure::geocoding::{decode_plus_code, MapsUrlResolution, MapsUrlResolver};

/// Every strategy came up empty.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoResolutionError {
    Exhausted { maps_url_detail: Option<String> },
}

impl fmt::Display for GeoResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoResolutionError::Exhausted { .. } => f.write_str(NO_GEOREFERENCE_MESSAGE),
        }
    }
}

impl std::error::Error for GeoResolutionError {}

/// Raw geo columns of an import row.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoInput<'a> {
    pub lat: &'a str,
    pub lng: &'a str,
    pub plus_code: &'a str,
    pub google_maps_url: &'a str,
}

/// Tries explicit coordinates, then the Plus Code, then the maps link. First hit wins.
pub struct GeoPriorityResolver {
    maps_resolver: Arc<dyn MapsUrlResolver>,
}

impl GeoPriorityResolver {
    pub fn new(maps_resolver: Arc<dyn MapsUrlResolver>) -> Self {
        Self { maps_resolver }
    }

    pub async fn resolve(
        &self,
        input: GeoInput<'_>,
    ) -> std::result::Result<ResolvedGeo, GeoResolutionError> {
        if let (Some(lat), Some(lng)) = (parse_coordinate(input.lat), parse_coordinate(input.lng)) {
            return Ok(ResolvedGeo {
                lat,
                lng,
                source: GeoSource::CsvLatLng,
            });
        }

        let plus_code = input.plus_code.trim();
        if !plus_code.is_empty() {
            if let Some(decoded) = decode_plus_code(plus_code) {
                return Ok(ResolvedGeo {
                    lat: decoded.lat,
                    lng: decoded.lon,
                    source: GeoSource::PlusCode,
                });
            }
            debug!(plus_code = %plus_code, "Plus Code not decodable, trying maps URL");
        }

        match self.maps_resolver.resolve(input.google_maps_url).await {
            MapsUrlResolution::Found(coord) => Ok(ResolvedGeo {
                lat: coord.lat,
                lng: coord.lng,
                source: GeoSource::MapsUrl,
            }),
            MapsUrlResolution::NotFound => {
                debug!(url = %input.google_maps_url, "Maps URL carried no coordinates");
                Err(GeoResolutionError::Exhausted {
                    maps_url_detail: None,
                })
            }
            MapsUrlResolution::NetworkError(detail) => {
                warn!(url = %input.google_maps_url, detail = %detail, "Maps URL resolution failed");
                Err(GeoResolutionError::Exhausted {
                    maps_url_detail: Some(detail),
                })
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::CountingResolver;
    use super::*;
    use crate::domain::geo::LatLng;

    fn resolver(answer: MapsUrlResolution) -> (Arc<CountingResolver>, GeoPriorityResolver) {
        let fake = Arc::new(CountingResolver::new(answer));
        (fake.clone(), GeoPriorityResolver::new(fake))
    }

    #[tokio::test]
    async fn test_csv_coordinates_win_without_network() {
        let (fake, geo) = resolver(MapsUrlResolution::Found(LatLng::new(1.0, 1.0)));

        let resolved = geo
            .resolve(GeoInput {
                lat: "50,5",
                lng: " 7.25 ",
                plus_code: "9F3M8MPR+HH",
                google_maps_url: "https://maps.app.goo.gl/x",
            })
            .await
            .unwrap();

        assert_eq!(resolved.source, GeoSource::CsvLatLng);
        assert_eq!((resolved.lat, resolved.lng), (50.5, 7.25));
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_plus_code_maps_lon_to_lng() {
        let (fake, geo) = resolver(MapsUrlResolution::NotFound);

        let resolved = geo
            .resolve(GeoInput {
                lat: "50.5",
                lng: "",
                plus_code: "9F3M8MPR+HH Fachbach",
                google_maps_url: "https://maps.app.goo.gl/x",
            })
            .await
            .unwrap();

        assert_eq!(resolved.source, GeoSource::PlusCode);
        assert!((resolved.lat - 51.3364375).abs() < 1e-9);
        assert!((resolved.lng - 13.6914375).abs() < 1e-9);
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_falls_through_to_maps_url() {
        let (fake, geo) = resolver(MapsUrlResolution::Found(LatLng::new(49.0, 8.0)));

        let resolved = geo
            .resolve(GeoInput {
                lat: "abc",
                lng: "8.0",
                plus_code: "8MPR+HH",
                google_maps_url: "https://maps.app.goo.gl/x",
            })
            .await
            .unwrap();

        assert_eq!(resolved.source, GeoSource::MapsUrl);
        assert_eq!((resolved.lat, resolved.lng), (49.0, 8.0));
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_keeps_network_detail() {
        let (fake, geo) = resolver(MapsUrlResolution::NetworkError("timeout".into()));

        let err = geo
            .resolve(GeoInput {
                google_maps_url: "https://maps.app.goo.gl/x",
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GeoResolutionError::Exhausted {
                maps_url_detail: Some("timeout".into())
            }
        );
        assert_eq!(err.to_string(), NO_GEOREFERENCE_MESSAGE);
        assert_eq!(fake.calls(), 1);
    }
}
