// ============================================================
// CSV PARSER
// ============================================================
// Tolerant header-keyed parsing of place import files

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::domain::csv::{CsvField, CsvRow};
use crate::domain::error::AppError;

/// CSV parser for import files
pub struct CsvParser {
    /// Delimiter character (default: comma)
    delimiter: u8,

    /// Lines whose first non-whitespace char is this are skipped
    comment_prefix: char,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            delimiter: b',',
            comment_prefix: '#',
        }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a CSV file and return rows
    pub fn parse_file(&self, path: &Path) -> Result<Vec<CsvRow>, AppError> {
        let content = read_lossy(path)?;
        self.parse_content(&content)
    }

    /// Parse CSV content from string.
    ///
    /// The first non-blank, non-comment line is the header. Short rows are padded with
    /// empty strings, cells beyond the header are dropped.
    pub fn parse_content(&self, content: &str) -> Result<Vec<CsvRow>, AppError> {
        let cleaned = self.strip_blank_and_comment_lines(content);
        if cleaned.is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .flexible(true) // Allow rows with different lengths
            .from_reader(cleaned.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            rows.push(self.parse_row(index, &headers, &record));
        }

        Ok(rows)
    }

    /// Drops blank and comment lines that start outside a quoted field, and folds
    /// `\r\n` / `\r` into `\n`.
    fn strip_blank_and_comment_lines(&self, content: &str) -> String {
        let normalized = content.replace("\r\n", "\n").replace('\r', "\n");

        let mut kept: Vec<&str> = Vec::new();
        let mut state = QuoteState::FieldStart;

        for line in normalized.split('\n') {
            if state != QuoteState::Quoted {
                let trimmed = line.trim_start();
                if trimmed.is_empty() || trimmed.starts_with(self.comment_prefix) {
                    continue;
                }
            }

            kept.push(line);
            state = self.scan_line(line, state);
        }

        kept.join("\n")
    }

    /// Quote state after `line`. A quote opens a quoted field only as the first character
    /// of a field, like the reader itself; anywhere else it is literal.
    fn scan_line(&self, line: &str, state: QuoteState) -> QuoteState {
        let delimiter = char::from(self.delimiter);
        let mut state = match state {
            QuoteState::Quoted => QuoteState::Quoted,
            _ => QuoteState::FieldStart,
        };

        for c in line.chars() {
            state = match (state, c) {
                (QuoteState::Quoted, '"') => QuoteState::QuoteInQuoted,
                (QuoteState::Quoted, _) => QuoteState::Quoted,
                // `""` inside a quoted field
                (QuoteState::QuoteInQuoted, '"') => QuoteState::Quoted,
                (_, c) if c == delimiter => QuoteState::FieldStart,
                (QuoteState::FieldStart, '"') => QuoteState::Quoted,
                _ => QuoteState::Unquoted,
            };
        }

        match state {
            QuoteState::Quoted => QuoteState::Quoted,
            _ => QuoteState::FieldStart,
        }
    }

    /// Parse a single CSV row
    fn parse_row(&self, index: usize, headers: &StringRecord, record: &StringRecord) -> CsvRow {
        let fields = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| CsvField::new(header, record.get(idx).unwrap_or("")))
            .collect();

        CsvRow::new(index, fields)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Convenience wrapper with default settings
pub fn parse_csv(content: &str) -> Result<Vec<CsvRow>, AppError> {
    CsvParser::new().parse_content(content)
}

/// Reads a file as UTF-8, replacing invalid sequences
fn read_lossy(path: &Path) -> Result<String, AppError> {
    let buffer = std::fs::read(path).map_err(|e| {
        AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    match String::from_utf8(buffer) {
        Ok(content) => Ok(content),
        Err(err) => Ok(String::from_utf8_lossy(err.as_bytes()).into_owned()),
    }
}
