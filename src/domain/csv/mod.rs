// ============================================================
// CSV DOMAIN LAYER
// ============================================================
// Header-keyed rows as read from an import file
// No I/O, no async

mod csv_row;

pub use csv_row::{CsvField, CsvRow};
