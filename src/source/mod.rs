//! # Telemetry Source Module
//!
//! Polls CSV files written by the external telemetry receiver.
//!
//! This module handles:
//! - Re-reading the whole file on every call (no caching)
//! - Dropping every column that has a missing value anywhere in the file
//! - Exposing all rows or only the latest row
//!
//! A failed read is never fatal: callers treat it as "no update this tick".

pub mod source_trait;

pub use source_trait::{CsvFileSource, TableSource};

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

use crate::error::{GroundStationError, Result};

/// Cell values treated as missing, in addition to empty cells
const NA_MARKERS: &[&str] = &["NA", "N/A", "NaN", "nan", "null"];

/// Parsed telemetry table, one column per field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Owned copy of a single table row, addressable by field name
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl CsvTable {
    /// Parse CSV text and drop incomplete columns
    ///
    /// # Arguments
    ///
    /// * `reader` - CSV content with a header row
    /// * `origin` - Path used in error messages
    ///
    /// # Errors
    ///
    /// Returns `Read` if the content has no header or a record is malformed
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use ground_station::source::CsvTable;
    ///
    /// let table = CsvTable::from_reader("A,B\n1,\n2,3\n".as_bytes(), Path::new("DATA.csv"))?;
    /// assert_eq!(table.headers(), &["A".to_string()]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| GroundStationError::read(origin, format!("invalid header: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(GroundStationError::read(origin, "file is empty"));
        }

        let mut rows = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record.map_err(|e| {
                GroundStationError::read(origin, format!("malformed row {}: {}", line + 1, e))
            })?;
            if record.len() > headers.len() {
                return Err(GroundStationError::read(
                    origin,
                    format!(
                        "malformed row {}: expected {} fields, saw {}",
                        line + 1,
                        headers.len(),
                        record.len()
                    ),
                ));
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows }.drop_incomplete_columns())
    }

    /// Remove every column with a missing cell in any row
    fn drop_incomplete_columns(self) -> Self {
        let keep: Vec<bool> = (0..self.headers.len())
            .map(|col| {
                self.rows.iter().all(|row| {
                    row.get(col).is_some_and(|cell| !is_missing(cell))
                })
            })
            .collect();

        if keep.iter().all(|&k| k) {
            return self;
        }

        let dropped: Vec<&str> = self
            .headers
            .iter()
            .zip(&keep)
            .filter(|(_, k)| !**k)
            .map(|(h, _)| h.as_str())
            .collect();
        debug!("Dropping incomplete columns: {:?}", dropped);

        let project = |cells: &[String]| -> Vec<String> {
            cells
                .iter()
                .zip(&keep)
                .filter(|(_, k)| **k)
                .map(|(c, _)| c.clone())
                .collect()
        };

        Self {
            headers: project(&self.headers),
            rows: self.rows.iter().map(|row| project(row)).collect(),
        }
    }

    /// Column names that survived filtering, in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the file has a header but no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of `field` in the filtered table
    pub fn column_index(&self, field: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == field)
    }

    /// True if `field` survived the empty-column filter
    pub fn has_column(&self, field: &str) -> bool {
        self.column_index(field).is_some()
    }

    /// Raw cell at `row` for `field`
    pub fn value(&self, row: usize, field: &str) -> Option<&str> {
        let col = self.column_index(field)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Numeric cell at `row` for `field`
    ///
    /// # Errors
    ///
    /// `FieldMissing` if the column or row is absent, or the cell is not a number
    pub fn number(&self, row: usize, field: &str) -> Result<f64> {
        let raw = self
            .value(row, field)
            .ok_or_else(|| GroundStationError::FieldMissing(format!("{} (row {})", field, row)))?;
        parse_number(field, raw)
    }

    /// Copy of row `index`
    pub fn record(&self, index: usize) -> Option<Record> {
        let row = self.rows.get(index)?;
        Some(Record {
            fields: self.headers.iter().cloned().zip(row.iter().cloned()).collect(),
        })
    }

    /// Copy of the latest row
    pub fn last_record(&self) -> Option<Record> {
        self.rows.len().checked_sub(1).and_then(|i| self.record(i))
    }
}

impl Record {
    /// Raw value of `field`, if it survived filtering
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Numeric value of `field`
    ///
    /// # Errors
    ///
    /// `FieldMissing` if the field is absent or not a number
    pub fn number(&self, field: &str) -> Result<f64> {
        let raw = self
            .get(field)
            .ok_or_else(|| GroundStationError::FieldMissing(field.to_string()))?;
        parse_number(field, raw)
    }

    /// Field names in column order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

fn parse_number(field: &str, raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GroundStationError::FieldMissing(format!("{} is not numeric: '{}'", field, raw)))
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || NA_MARKERS.contains(&cell)
}

/// Read a CSV file fresh from disk, dropping incomplete columns
///
/// # Errors
///
/// Returns `Read` if the file is absent, empty or malformed
pub fn read_all<P: AsRef<Path>>(path: P) -> Result<CsvTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| GroundStationError::read(path, e.to_string()))?;
    CsvTable::from_reader(BufReader::new(file), path)
}

/// Read only the latest row of a CSV file
///
/// # Errors
///
/// Returns `Read` if the file cannot be read or has no data rows
pub fn read_latest<P: AsRef<Path>>(path: P) -> Result<Record> {
    let path = path.as_ref();
    read_all(path)?
        .last_record()
        .ok_or_else(|| GroundStationError::read(path, "no data rows"))
}
