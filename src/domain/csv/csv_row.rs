// ============================================================
// CSV ROW TYPES
// ============================================================
// One row per CSV line, addressed by header name

use serde::{Deserialize, Serialize};

/// A single cell together with the header it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvField {
    /// Header name (trimmed)
    pub name: String,

    /// Cell value (trimmed)
    pub value: String,
}

impl CsvField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A single row in a CSV file.
///
/// Holds exactly one field per header column, in header order. Missing trailing
/// cells are stored as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRow {
    /// Row index among data rows (0-based, header excluded)
    pub index: usize,

    pub fields: Vec<CsvField>,
}

impl CsvRow {
    pub fn new(index: usize, fields: Vec<CsvField>) -> Self {
        Self { index, fields }
    }

    /// Builds a row from `(header, value)` pairs.
    pub fn from_pairs<'a>(index: usize, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let fields = pairs
            .into_iter()
            .map(|(name, value)| CsvField::new(name, value))
            .collect();
        Self::new(index, fields)
    }

    /// Value of the first column with this header, or `""` when absent.
    pub fn get(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    /// Trimmed value of a column.
    pub fn get_trimmed(&self, name: &str) -> &str {
        self.get(name).trim()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}
