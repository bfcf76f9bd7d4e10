// ============================================================
// HVO / XTL STATION EXPORT
// ============================================================
// KML placemarks -> filtered, deduplicated, sorted import CSV

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::domain::error::Result;
use crate::domain::fuel_station::{FuelFilterMode, FuelStationCandidate, IMPORT_CSV_HEADER};
use crate::domain::geo::BoundingBox;
use crate::domain::place::PlaceType;
use crate::infrastructure::csv::to_csv;
use crate::infrastructure::kml::{parse_placemarks, KmlPlacemark, KmlSource};
use crate::infrastructure::storage::{default_fuel_export_path, write_text_file};

const SURE_MARKERS: [&str; 3] = ["hvo100", "xtl", "15940"];
const BLEND_MARKERS: [&str; 7] = ["blend", "hvo20", "hvo30", "hvo50", "b7", "%", "beimisch"];

/// Decides whether a placemark text advertises HVO/XTL under the given mode.
pub fn is_hvo_station(text: &str, mode: FuelFilterMode) -> bool {
    let t = text.to_lowercase();
    let sure = SURE_MARKERS.iter().any(|m| t.contains(m));
    let mentions_hvo = t.contains("hvo");

    match mode {
        FuelFilterMode::IncludeBlends => sure || mentions_hvo,
        FuelFilterMode::SureOnly => {
            let blend = BLEND_MARKERS.iter().any(|m| t.contains(m));
            sure || (mentions_hvo && !blend)
        }
    }
}

pub fn google_maps_search_url(lat: f64, lng: f64) -> String {
    format!("https://www.google.com/maps/search/?api=1&query={},{}", lat, lng)
}

/// Collation weights of a name, compared level by level: base letters, then accents,
/// then case with lowercase first. Follows the German (non-phonebook) ordering, where
/// umlauts sort with their base vowel and `ß` as a variant of `ss`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    base: String,
    accents: Vec<String>,
    case: Vec<u8>,
}

impl CollationKey {
    fn push_base(&mut self, letter: char, case: u8) {
        self.base.push(letter);
        self.accents.push(String::new());
        self.case.push(case);
    }
}

/// Letters without a canonical decomposition that still collate as plain Latin.
fn expansion(c: char) -> Option<&'static str> {
    match c {
        'ß' | 'ẞ' => Some("ss"),
        'æ' | 'Æ' => Some("ae"),
        'œ' | 'Œ' => Some("oe"),
        'ø' | 'Ø' => Some("o"),
        'ł' | 'Ł' => Some("l"),
        'đ' | 'Đ' => Some("d"),
        _ => None,
    }
}

pub fn german_collation_key(name: &str) -> CollationKey {
    let mut key = CollationKey::default();

    for c in name.nfd() {
        if is_combining_mark(c) {
            if let Some(marks) = key.accents.last_mut() {
                marks.push(c);
            }
            continue;
        }

        if let Some(letters) = expansion(c) {
            for letter in letters.chars() {
                key.push_base(letter, 2);
            }
            continue;
        }

        let case = u8::from(c.is_uppercase());
        for lower in c.to_lowercase() {
            key.push_base(lower, case);
        }
    }

    key
}

pub fn compare_german(a: &str, b: &str) -> Ordering {
    german_collation_key(a)
        .cmp(&german_collation_key(b))
        .then_with(|| a.cmp(b))
}

pub fn extract_fuel_stations(
    kml: &str,
    bbox: &BoundingBox,
    mode: FuelFilterMode,
) -> Vec<FuelStationCandidate> {
    select_fuel_stations(parse_placemarks(kml), bbox, mode)
}

/// Keeps named, in-box HVO placemarks, first occurrence per name and position, sorted by name.
pub fn select_fuel_stations(
    placemarks: Vec<KmlPlacemark>,
    bbox: &BoundingBox,
    mode: FuelFilterMode,
) -> Vec<FuelStationCandidate> {
    let mut seen = HashSet::new();
    let mut stations = Vec::new();

    for placemark in placemarks {
        let Some(coord) = placemark.coordinate else {
            continue;
        };
        if placemark.name.is_empty() || !bbox.contains(coord.lat, coord.lng) {
            continue;
        }

        let text = format!("{}\n{}", placemark.name, placemark.description);
        if !is_hvo_station(&text, mode) {
            continue;
        }

        let candidate = FuelStationCandidate {
            google_maps_url: google_maps_search_url(coord.lat, coord.lng),
            place_name: placemark.name,
            place_type_hint: PlaceType::HvoTankstelle,
            lat: coord.lat,
            lng: coord.lng,
            plus_code: String::new(),
        };
        if seen.insert(candidate.dedup_key()) {
            stations.push(candidate);
        }
    }

    stations.sort_by(|a, b| compare_german(&a.place_name, &b.place_name));
    stations
}

pub fn stations_to_csv(stations: &[FuelStationCandidate]) -> Result<String> {
    to_csv(&IMPORT_CSV_HEADER, stations.iter().map(FuelStationCandidate::to_record))
}

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub mode: FuelFilterMode,
    /// Overrides the dated default file in the output directory.
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportResult {
    pub path: PathBuf,
    pub placemarks: usize,
    pub rows: usize,
}

pub struct FuelStationExportUseCase {
    source: Arc<dyn KmlSource>,
    bbox: BoundingBox,
    output_dir: PathBuf,
}

impl FuelStationExportUseCase {
    pub fn new(source: Arc<dyn KmlSource>, bbox: BoundingBox, output_dir: PathBuf) -> Self {
        Self {
            source,
            bbox,
            output_dir,
        }
    }

    pub async fn execute(&self, options: &ExportOptions) -> Result<ExportResult> {
        self.execute_on(options, Utc::now().date_naive()).await
    }

    pub async fn execute_on(&self, options: &ExportOptions, today: NaiveDate) -> Result<ExportResult> {
        let kml = self.source.fetch_kml().await?;

        let placemarks = parse_placemarks(&kml);
        let placemark_count = placemarks.len();
        info!(count = placemark_count, "Placemark blocks: {}", placemark_count);

        let stations = select_fuel_stations(placemarks, &self.bbox, options.mode);
        let csv = stations_to_csv(&stations)?;

        let path = options
            .out
            .clone()
            .unwrap_or_else(|| default_fuel_export_path(&self.output_dir, today));
        write_text_file(&path, &csv)?;

        info!(rows = stations.len(), path = %path.display(), "OK - wrote {} rows", stations.len());
        info!(mode = options.mode.describe(), "Mode: {}", options.mode.describe());

        Ok(ExportResult {
            path,
            placemarks: placemark_count,
            rows: stations.len(),
        })
    }
}
