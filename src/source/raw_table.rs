use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::{fs::File, io::Read, path::Path};
use tracing::debug;

use super::dates::parse_report_date;
use crate::error::MissingColumnError;

/// A source table exactly as read: every cell kept as a string.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Name used in errors and logs (file stem or collection name).
    pub name: String,
    /// Column names from the header row.
    pub headers: Vec<String>,
    /// Each data row, one String per field. Short rows are allowed.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Parse CSV with a header row from any reader.
    pub fn from_csv_reader<R: Read>(name: &str, reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // keep this so records with different field-counts work
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .with_context(|| format!("reading CSV header of {}", name))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record =
                result.with_context(|| format!("CSV parse error in {} at record {}", name, idx))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!(table = name, columns = headers.len(), rows = rows.len(), "parsed CSV");
        Ok(Self::new(name, headers, rows))
    }

    /// Open and parse a CSV file; the table is named after the file stem.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let file =
            File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
        Self::from_csv_reader(&name, file)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Index of a column the caller cannot do without.
    pub fn require(&self, column: &str) -> Result<usize, MissingColumnError> {
        self.column_index(column)
            .ok_or_else(|| MissingColumnError::new(&self.name, column))
    }

    /// Every header that parses as a report date, ordered by date ascending.
    pub fn date_columns(&self) -> Vec<(usize, NaiveDate)> {
        let mut cols: Vec<(usize, NaiveDate)> = self
            .headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| parse_report_date(h).map(|d| (i, d)))
            .collect();
        cols.sort_by_key(|&(i, d)| (d, i));
        cols
    }
}

/// Cell `col` of `row`, or `""` when the row is short.
pub fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("")
}

/// Like [`cell`] for optional columns.
pub fn opt_cell(row: &[String], col: Option<usize>) -> &str {
    col.map(|c| cell(row, c)).unwrap_or("")
}
