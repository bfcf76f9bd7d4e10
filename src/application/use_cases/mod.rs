pub mod fuel_station_export;
pub mod geo_resolver;
pub mod place_classifier;
pub mod place_import;
pub mod place_service;
