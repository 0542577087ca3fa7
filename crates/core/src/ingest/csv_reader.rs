//! CSV reading for broker files.
//!
//! Produces a raw batch (header + trimmed string rows) or nothing: a
//! malformed file never yields a partial parse.

use std::path::Path;

use csv::ReaderBuilder;

use super::ingest_errors::SchemaError;
use crate::errors::Result;

/// Raw tabular input: one header row plus data rows, every cell trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBatch {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Reads one delimited file into a raw batch.
pub fn read_csv_file(path: &Path) -> Result<RawBatch> {
    let content = std::fs::read(path)?;
    parse_csv(&content)
}

/// Parses CSV bytes into a raw batch.
///
/// Handles a UTF-8 BOM, trims cells, skips blank lines and full-width
/// empty rows, and rejects ragged rows by source line. The first
/// non-empty row is the header.
pub fn parse_csv(content: &[u8]) -> Result<RawBatch> {
    let content = strip_bom(content);
    let text = std::str::from_utf8(content)
        .map_err(|e| SchemaError::Encoding(e.to_string()))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<String>> = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| SchemaError::Malformed(e.to_string()))?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        let all_empty = row.iter().all(|cell| cell.is_empty());

        let expected = match &headers {
            None => {
                if all_empty {
                    continue;
                }
                headers = Some(row);
                continue;
            }
            Some(headers) => headers.len(),
        };

        // a whitespace-only line or a full-width row of empty cells is a
        // spreadsheet export artifact and is dropped; a short one is
        // ragged like any other
        if all_empty && (row.len() == 1 || row.len() == expected) {
            continue;
        }
        if row.len() != expected {
            return Err(SchemaError::RaggedRow {
                line,
                expected,
                found: row.len(),
            }
            .into());
        }
        rows.push(row);
    }

    let headers = match headers {
        Some(headers) => headers,
        None => return Err(SchemaError::EmptyInput.into()),
    };

    Ok(RawBatch { headers, rows })
}

fn strip_bom(content: &[u8]) -> &[u8] {
    content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn parses_header_and_rows() {
        let batch = parse_csv(b"Symbol,Net_Qty\nRELIANCE,100\nTCS,-50").unwrap();
        assert_eq!(batch.headers, vec!["Symbol", "Net_Qty"]);
        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.rows[1], vec!["TCS", "-50"]);
    }

    #[test]
    fn trims_cells_and_skips_empty_rows() {
        let batch = parse_csv(b"Symbol , Net_Qty\n RELIANCE , 100 \n,\n").unwrap();
        assert_eq!(batch.headers, vec!["Symbol", "Net_Qty"]);
        assert_eq!(batch.rows, vec![vec!["RELIANCE", "100"]]);
    }

    #[test]
    fn strips_utf8_bom() {
        let batch = parse_csv(b"\xEF\xBB\xBFSymbol\nRELIANCE").unwrap();
        assert_eq!(batch.headers, vec!["Symbol"]);
    }

    #[test]
    fn rejects_empty_input() {
        let err = parse_csv(b"").unwrap_err();
        assert!(matches!(err, Error::Schema(SchemaError::EmptyInput)));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = parse_csv(b"a,b,c\n1,2\n").unwrap_err();
        match err {
            Error::Schema(SchemaError::RaggedRow {
                line,
                expected,
                found,
            }) => {
                assert_eq!(line, 2);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn ragged_row_reports_the_source_line_past_blank_lines() {
        let err = parse_csv(b"a,b,c\n\n\n1,2\n").unwrap_err();
        match err {
            Error::Schema(SchemaError::RaggedRow { line, .. }) => assert_eq!(line, 4),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_row_of_empty_cells_is_ragged_not_skipped() {
        let err = parse_csv(b"a,b,c\n,\n").unwrap_err();
        match err {
            Error::Schema(SchemaError::RaggedRow {
                line,
                expected,
                found,
            }) => {
                assert_eq!(line, 2);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = parse_csv(b"Symbol\n\xFF\xFE").unwrap_err();
        assert!(matches!(err, Error::Schema(SchemaError::Encoding(_))));
    }

    #[test]
    fn handles_quoted_fields() {
        let batch = parse_csv(b"Symbol,Note\nRELIANCE,\"a, quoted\"").unwrap();
        assert_eq!(batch.rows[0][1], "a, quoted");
    }
}
