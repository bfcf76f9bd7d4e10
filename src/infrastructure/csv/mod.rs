// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Import file parsing and import-compatible CSV output

mod csv_parser;
mod csv_writer;

pub use csv_parser::{parse_csv, CsvParser};
pub use csv_writer::{rows_to_csv, to_csv};
