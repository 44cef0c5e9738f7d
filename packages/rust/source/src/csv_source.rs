//! CSV reader. The first line is the header row.

use std::io::Read;

use aidata_shared::{AiDataError, Result};
use tracing::debug;

use crate::mapper::RawRow;

/// Read every data row of a CSV document.
///
/// Rows that cannot be decoded are returned as `MalformedRecord` errors
/// alongside the good rows; only a broken header is fatal.
pub(crate) fn read_rows<R: Read>(
    reader: R,
    origin: &str,
) -> Result<(Vec<RawRow>, Vec<AiDataError>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| AiDataError::parse(format!("{origin}: unreadable header row: {e}")))?
        .clone();

    if headers.is_empty() {
        debug!(origin, "CSV has no header row");
        return Ok((Vec::new(), Vec::new()));
    }

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        // Header is line 1, so the i-th data row is at least line i + 2.
        let fallback_line = i + 2;
        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                let mut raw = RawRow::new(line);
                for (header, value) in headers.iter().zip(record.iter()) {
                    raw.insert(header, value);
                }
                rows.push(raw);
            }
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                errors.push(AiDataError::malformed(line, format!("{origin}: {e}")));
            }
        }
    }

    debug!(origin, rows = rows.len(), errors = errors.len(), "CSV read");
    Ok((rows, errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_quoted_fields_with_commas_and_newlines() {
        let data = "id,category,title,body\n\
                    1,Service,\"Decks, Patios\",\"Line one\nLine two\"\n\
                    2,FAQ,Warranty?,Ten years.\n";
        let (rows, errors) = read_rows(data.as_bytes(), "inline.csv").unwrap();
        assert!(errors.is_empty());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells["title"], "Decks, Patios");
        assert_eq!(rows[0].cells["body"], "Line one\nLine two");
        assert_eq!(rows[0].row, 2);
        // The quoted newline pushes the second record down a line.
        assert_eq!(rows[1].row, 4);
    }

    #[test]
    fn short_rows_are_accepted() {
        let data = "id,category,title,body\n3,Service\n";
        let (rows, _) = read_rows(data.as_bytes(), "inline.csv").unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].cells.contains_key("title"));
    }

    #[test]
    fn empty_document_has_no_rows() {
        let (rows, errors) = read_rows("".as_bytes(), "empty.csv").unwrap();
        assert!(rows.is_empty());
        assert!(errors.is_empty());
    }
}
