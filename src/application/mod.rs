pub mod use_cases;

pub use use_cases::fuel_station_export::{ExportOptions, ExportResult, FuelStationExportUseCase};
pub use use_cases::geo_resolver::{GeoInput, GeoPriorityResolver, GeoResolutionError};
pub use use_cases::place_classifier::classify_place;
pub use use_cases::place_import::PlaceImportUseCase;
pub use use_cases::place_service::PlaceService;
