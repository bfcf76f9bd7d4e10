pub mod error;
pub mod fuel_station;
pub mod geo;
pub mod import;
pub mod place;
pub mod rating;

// CSV import rows
pub mod csv;
