// ============================================================
// CSV WRITER
// ============================================================
// RFC4180 output compatible with CsvParser

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::domain::csv::CsvRow;
use crate::domain::error::AppError;

/// Writes a header line and records, quoting only where needed
/// (comma, quote, CR, LF) and terminating records with `\n`.
pub fn to_csv<H, R, F>(headers: &[H], records: R) -> Result<String, AppError>
where
    H: AsRef<str>,
    R: IntoIterator<Item = Vec<F>>,
    F: AsRef<str>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(headers.iter().map(|h| h.as_ref()))?;
    for record in records {
        writer.write_record(record.iter().map(|f| f.as_ref()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV writer: {}", e)))?;

    String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("CSV output is not valid UTF-8: {}", e)))
}

/// Serializes parsed rows back to CSV, taking the header from the first row.
pub fn rows_to_csv(rows: &[CsvRow]) -> Result<String, AppError> {
    let Some(first) = rows.first() else {
        return Ok(String::new());
    };

    let headers: Vec<&str> = first.headers().collect();
    let records = rows
        .iter()
        .map(|row| headers.iter().map(|h| row.get(h)).collect::<Vec<_>>());

    to_csv(&headers, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::csv::parse_csv;

    #[test]
    fn test_quotes_only_when_needed() {
        let out = to_csv(
            &["placeName", "lat"],
            vec![vec!["Plain", "1.0"], vec!["Komma, drin", "2.0"], vec!["Sag \"Hallo\"", "3.0"]],
        )
        .unwrap();

        assert_eq!(
            out,
            "placeName,lat\nPlain,1.0\n\"Komma, drin\",2.0\n\"Sag \"\"Hallo\"\"\",3.0\n"
        );
    }

    #[test]
    fn test_round_trip_through_parser() {
        let rows = vec![
            CsvRow::from_pairs(0, [("placeName", "Camping \"Am See\", Nord"), ("note", "zwei\nZeilen")]),
            CsvRow::from_pairs(1, [("placeName", "Loreley"), ("note", "")]),
            CsvRow::from_pairs(2, [("placeName", "Stellplatz, \"Rhein\""), ("note", "a,b,\"c\"")]),
        ];

        let text = rows_to_csv(&rows).unwrap();
        let parsed = parse_csv(&text).unwrap();

        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_empty_rows_produce_empty_output() {
        assert_eq!(rows_to_csv(&[]).unwrap(), "");
    }
}
