use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::geo::LatLng;

static PLACEMARK_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<Placemark\b").unwrap());

static NAME_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<name[^>]*>([\s\S]*?)</name>").unwrap());

static DESCRIPTION_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<description[^>]*>([\s\S]*?)</description>").unwrap());

static COORDINATES_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<coordinates[^>]*>([\s\S]*?)</coordinates>").unwrap());

/// Fields read from a single `<Placemark>` block. Missing tags come back empty.
#[derive(Debug, Clone, PartialEq)]
pub struct KmlPlacemark {
    pub name: String,
    pub description: String,
    pub coordinate: Option<LatLng>,
}

/// Splits a KML document into `<Placemark` blocks. Text before the first placemark is dropped.
pub fn split_placemarks(xml: &str) -> Vec<String> {
    PLACEMARK_START
        .split(xml)
        .skip(1)
        .map(|rest| format!("<Placemark{}", rest))
        .collect()
}

pub fn parse_placemark(block: &str) -> KmlPlacemark {
    KmlPlacemark {
        name: tag_text(&NAME_TAG, block),
        description: tag_text(&DESCRIPTION_TAG, block),
        coordinate: extract_coordinate(block),
    }
}

pub fn parse_placemarks(xml: &str) -> Vec<KmlPlacemark> {
    split_placemarks(xml)
        .iter()
        .map(|block| parse_placemark(block))
        .collect()
}

fn tag_text(pattern: &Regex, block: &str) -> String {
    pattern
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| decode_xml_entities(m.as_str().trim()))
        .unwrap_or_default()
}

pub fn decode_xml_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// First tuple of `<coordinates>`. KML orders it `lng,lat[,alt]`.
pub fn extract_coordinate(block: &str) -> Option<LatLng> {
    let coords = tag_text(&COORDINATES_TAG, block);
    let first = coords.split_whitespace().next()?;

    let mut parts = first.split(',');
    let lng: f64 = parts.next()?.trim().parse().ok()?;
    let lat: f64 = parts.next()?.trim().parse().ok()?;

    if !lat.is_finite() || !lng.is_finite() {
        return None;
    }
    Some(LatLng::new(lat, lng))
}
