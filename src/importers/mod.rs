//! Bulk importers
//!
//! Turn CSV files into task and user payloads. Files come from a remote URL,
//! a Google Drive spreadsheet, or a file already uploaded to local disk:
//!
//! ```text
//! CsvSource ──fetch/read──▶ text ──csv::Reader──▶ rows ──▶ TaskData / UserData
//! ```
//!
//! The first row is always the header. Header and row-shape problems abort
//! the whole import with a message fit to show the uploader.

pub mod csv;
pub mod fetch;
pub mod usercsv;

pub use self::csv::{TaskCsvImporter, TaskData, gdocs_export_url};
pub use fetch::{CsvFetcher, CsvResponse, HttpCsvFetcher};
pub use usercsv::{UserCsvImporter, UserData};

use crate::error::{ImportError, ImportResult};
use crate::util::{RequiredFields, strip_bom};
use ::csv::{Position, ReaderBuilder, StringRecord};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Where a CSV file comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvSource {
    /// Plain URL serving CSV
    Url(String),
    /// Google Drive spreadsheet share link
    GoogleDrive(String),
    /// File uploaded to local disk; `None` when the upload form had no file
    LocalFile(Option<PathBuf>),
}

/// Read an uploaded file as UTF-8, ignoring a leading BOM
pub(crate) fn read_local_file(path: Option<&Path>) -> ImportResult<String> {
    let path = path.ok_or(ImportError::InvalidFile)?;
    let text = std::fs::read_to_string(path)?;
    Ok(strip_bom(&text).to_string())
}

/// Split CSV text into records; row shape is checked by the callers
///
/// The reader skips blank lines. Each one in front of a record comes back as
/// an empty row so the row-length check rejects it. Blank lines after the
/// last record are dropped.
pub(crate) fn read_records(text: &str) -> ImportResult<Vec<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        // a record's position is where the previous one ended, so any extra
        // lines consumed beyond its own were skipped blanks
        let end = reader.position().line();
        let start = record.position().map_or(end, Position::line);
        let embedded: u64 = record.iter().map(|cell| cell.matches('\n').count() as u64).sum();
        let skipped = end.saturating_sub(start + embedded + 1);

        rows.extend((0..skipped).map(|_| Vec::new()));
        rows.push(record_cells(&record));
    }
    Ok(rows)
}

fn record_cells(record: &StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

pub(crate) fn check_no_duplicated_headers(headers: &[String]) -> ImportResult<()> {
    let unique: HashSet<&String> = headers.iter().collect();
    if unique.len() != headers.len() {
        return Err(ImportError::DuplicatedHeaders);
    }
    Ok(())
}

pub(crate) fn check_no_empty_headers(headers: &[String]) -> ImportResult<()> {
    match headers.iter().position(|h| h.trim().is_empty()) {
        Some(index) => Err(ImportError::EmptyHeader {
            position: index + 1,
        }),
        None => Ok(()),
    }
}

/// `row_number` counts data rows from 1; the message counts the header too
pub(crate) fn check_valid_row_length(
    row: &[String],
    row_number: usize,
    headers: &[String],
) -> ImportResult<()> {
    if row.len() != headers.len() {
        return Err(ImportError::RowLength {
            row: row_number + 1,
        });
    }
    Ok(())
}

pub(crate) fn check_required_headers(
    headers: &[String],
    required: &RequiredFields,
) -> ImportResult<()> {
    let missing = required.missing_headers(headers);
    if !missing.is_empty() {
        return Err(ImportError::MissingHeaders(missing));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_read_records() {
        let records = read_records("a,b\n1,\"x, y\"\n").unwrap();
        assert_eq!(records, vec![headers(&["a", "b"]), headers(&["1", "x, y"])]);
    }

    #[test]
    fn test_read_records_blank_line_kept() {
        let records = read_records("a,b\n1,2\n\n3,4\n").unwrap();
        assert_eq!(
            records,
            vec![headers(&["a", "b"]), headers(&["1", "2"]), vec![], headers(&["3", "4"])]
        );
    }

    #[test]
    fn test_read_records_multiline_cell() {
        let records = read_records("a,b\n\"x\n\ny\",2\n3,4\n").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1][0], "x\n\ny");
    }

    #[test]
    fn test_read_records_trailing_blank_lines() {
        let records = read_records("a,b\n1,2\n\n\n").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_read_records_ragged_rows() {
        let records = read_records("a,b\n1,2,3\n").unwrap();
        assert_eq!(records[1].len(), 3);
    }

    #[test]
    fn test_duplicated_headers() {
        assert!(check_no_duplicated_headers(&headers(&["a", "b"])).is_ok());
        assert!(matches!(
            check_no_duplicated_headers(&headers(&["a", "a"])),
            Err(ImportError::DuplicatedHeaders)
        ));
    }

    #[test]
    fn test_empty_header_position() {
        assert!(matches!(
            check_no_empty_headers(&headers(&["a", "  ", "c"])),
            Err(ImportError::EmptyHeader { position: 2 })
        ));
    }

    #[test]
    fn test_row_length() {
        let h = headers(&["a", "b"]);
        assert!(check_valid_row_length(&headers(&["1", "2"]), 1, &h).is_ok());
        assert!(matches!(
            check_valid_row_length(&headers(&["1"]), 1, &h),
            Err(ImportError::RowLength { row: 2 })
        ));
    }

    #[test]
    fn test_required_headers() {
        let h = headers(&["name", "email_addr"]);
        assert!(check_required_headers(&h, &RequiredFields::from_names(["name"])).is_ok());
        assert!(check_required_headers(&h, &RequiredFields::default()).is_ok());
        assert!(matches!(
            check_required_headers(&h, &RequiredFields::from_names(["name", "fullname"])),
            Err(ImportError::MissingHeaders(missing)) if missing == vec!["fullname"]
        ));
    }

    #[test]
    fn test_read_local_file_missing_name() {
        assert!(matches!(
            read_local_file(None),
            Err(ImportError::InvalidFile)
        ));
    }
}
