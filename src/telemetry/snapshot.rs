//! # Field Snapshot Recorder
//!
//! Captures the latest value of every tracked field once per tick and keeps
//! the whole session history in memory.
//!
//! ## Missing fields
//!
//! A tracked field that did not survive the empty-column filter on this tick
//! is recorded as [`FieldValue::Missing`], which renders as an empty string.
//!
//! ## Export
//!
//! [`SnapshotRecorder::export`] writes the history as CSV: one header row with
//! the tracked field names, then one row per snapshot. The target file is
//! overwritten. The file is a copy; later ticks do not update it.

use chrono::NaiveDateTime;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

use super::clock::{date_label, time_label, Clock};
use crate::error::{GroundStationError, Result};
use crate::source::TableSource;

/// Latest observed value of one field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Missing,
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Classify a raw CSV cell
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Self::Number(v),
            _ => Self::Text(raw.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Number(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Values of every tracked field at one tick, in tracked order
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    taken_at: NaiveDateTime,
    values: Vec<(String, FieldValue)>,
}

impl Snapshot {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Rendered value of `field`; empty when missing or untracked
    pub fn text(&self, field: &str) -> String {
        self.get(field).map(ToString::to_string).unwrap_or_default()
    }

    pub fn values(&self) -> &[(String, FieldValue)] {
        &self.values
    }

    pub fn taken_at(&self) -> NaiveDateTime {
        self.taken_at
    }

    pub fn date_label(&self) -> String {
        date_label(self.taken_at)
    }

    pub fn time_label(&self) -> String {
        time_label(self.taken_at)
    }
}

/// Per-tick recorder with an unbounded in-memory history
#[derive(Debug, Default)]
pub struct SnapshotRecorder {
    tracked: Vec<String>,
    history: Vec<Snapshot>,
}

impl SnapshotRecorder {
    /// Create a recorder for `tracked` fields
    ///
    /// With an empty list the recorder adopts the columns of the first
    /// successful read and keeps them for the rest of the session.
    pub fn new(tracked: Vec<String>) -> Self {
        Self {
            tracked,
            history: Vec::new(),
        }
    }

    /// Capture the latest row and append it to the history
    ///
    /// # Errors
    ///
    /// Returns `Read` if the source cannot be read or has no data rows;
    /// nothing is recorded for that tick.
    pub fn on_tick(&mut self, source: &dyn TableSource, clock: &dyn Clock) -> Result<Snapshot> {
        let table = source.read_all()?;
        let latest = table
            .last_record()
            .ok_or_else(|| GroundStationError::read(source.origin(), "no data rows"))?;

        if self.tracked.is_empty() {
            self.tracked = latest.field_names().map(str::to_string).collect();
            info!("Tracking {} fields: {:?}", self.tracked.len(), self.tracked);
        }

        let values = self
            .tracked
            .iter()
            .map(|field| {
                let value = match latest.get(field) {
                    Some(raw) => FieldValue::parse(raw),
                    None => {
                        debug!("{}", GroundStationError::FieldMissing(field.clone()));
                        FieldValue::Missing
                    }
                };
                (field.clone(), value)
            })
            .collect();

        let snapshot = Snapshot {
            taken_at: clock.now(),
            values,
        };
        self.history.push(snapshot.clone());
        Ok(snapshot)
    }

    /// Write the history to `path` as CSV, replacing any existing file
    ///
    /// # Returns
    ///
    /// Number of snapshot rows written
    ///
    /// # Errors
    ///
    /// `NoData` if nothing has been recorded yet (no file is written);
    /// `Csv`/`Io` if the file cannot be written.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        if self.history.is_empty() {
            return Err(GroundStationError::NoData);
        }

        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.tracked)?;
        for snapshot in &self.history {
            writer.write_record(snapshot.values.iter().map(|(_, v)| v.to_string()))?;
        }
        writer.flush()?;

        info!("Exported {} snapshots to {}", self.history.len(), path.display());
        Ok(self.history.len())
    }

    pub fn tracked_fields(&self) -> &[String] {
        &self.tracked
    }

    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.history.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::source_trait::MockTableSource;
    use crate::source::CsvTable;
    use crate::telemetry::clock::MockClock;
    use chrono::NaiveDate;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    fn source(content: &'static str) -> MockTableSource {
        let mut mock = MockTableSource::new();
        mock.expect_read_all().returning(move || {
            CsvTable::from_reader(content.as_bytes(), Path::new("DATA.csv"))
        });
        mock
    }

    fn clock() -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_now().return_const(
            NaiveDate::from_ymd_opt(2026, 10, 19)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
        );
        clock
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_field_is_empty() {
        let src = source("TEAM_ID,ALTITUDE,STATE\n1062,100.5,LAUNCH\n1062,,ASCENT\n");
        let mut recorder = SnapshotRecorder::new(fields(&["TEAM_ID", "ALTITUDE", "STATE"]));

        let snapshot = recorder.on_tick(&src, &clock()).unwrap();
        assert_eq!(snapshot.text("ALTITUDE"), "");
        assert!(snapshot.get("ALTITUDE").unwrap().is_missing());
        assert_eq!(snapshot.text("TEAM_ID"), "1062");
        assert_eq!(snapshot.text("STATE"), "ASCENT");
        assert_eq!(snapshot.get("TEAM_ID").unwrap().as_f64(), Some(1062.0));
    }

    #[test]
    fn test_keys_are_tracked_fields_in_order() {
        let src = source("B,A,EXTRA\n2,1,9\n");
        let mut recorder = SnapshotRecorder::new(fields(&["A", "B", "GONE"]));

        let snapshot = recorder.on_tick(&src, &clock()).unwrap();
        let keys: Vec<&str> = snapshot.values().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["A", "B", "GONE"]);
        assert!(snapshot.get("EXTRA").is_none());
    }

    #[test]
    fn test_adopts_surviving_columns_when_untracked() {
        let src = source("A,B,C\n1,,3\n");
        let mut recorder = SnapshotRecorder::new(Vec::new());

        recorder.on_tick(&src, &clock()).unwrap();
        assert_eq!(recorder.tracked_fields(), &["A", "C"]);
    }

    #[test]
    fn test_history_grows_each_tick() {
        let src = source("A\n1\n");
        let mut recorder = SnapshotRecorder::new(fields(&["A"]));
        for _ in 0..3 {
            recorder.on_tick(&src, &clock()).unwrap();
        }
        assert_eq!(recorder.history().len(), 3);
        assert_eq!(recorder.latest().unwrap().time_label(), "02:30:00 PM");
        assert_eq!(recorder.latest().unwrap().date_label(), "19-Oct-2026");
    }

    #[test]
    fn test_read_error_records_nothing() {
        let mut mock = MockTableSource::new();
        mock.expect_read_all()
            .returning(|| Err(GroundStationError::read("DATA.csv", "file is empty")));
        let mut recorder = SnapshotRecorder::new(fields(&["A"]));

        assert_err!(recorder.on_tick(&mock, &clock()));
        assert!(recorder.history().is_empty());
    }

    #[test]
    fn test_header_only_names_source_file() {
        let mut mock = MockTableSource::new();
        mock.expect_read_all()
            .returning(|| CsvTable::from_reader("A,B\n".as_bytes(), Path::new("DATA.csv")));
        mock.expect_origin()
            .return_const(std::path::PathBuf::from("DATA.csv"));
        let mut recorder = SnapshotRecorder::new(fields(&["A"]));

        match recorder.on_tick(&mock, &clock()) {
            Err(GroundStationError::Read { path, reason }) => {
                assert_eq!(path, Path::new("DATA.csv"));
                assert_eq!(reason, "no data rows");
            }
            other => panic!("Expected Read error, got: {:?}", other),
        }
        assert!(recorder.history().is_empty());
    }

    #[test]
    fn test_export_without_history_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Telemetry data.csv");
        let recorder = SnapshotRecorder::new(fields(&["A"]));

        assert!(matches!(recorder.export(&path), Err(GroundStationError::NoData)));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Telemetry data.csv");
        let src = source("ALTITUDE,STATE,VOLTAGE\n120.5,ASCENT,\n");
        let mut recorder = SnapshotRecorder::new(fields(&["STATE", "ALTITUDE", "VOLTAGE"]));

        for _ in 0..4 {
            recorder.on_tick(&src, &clock()).unwrap();
        }
        let written = assert_ok!(recorder.export(&path));
        assert_eq!(written, 4);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "STATE,ALTITUDE,VOLTAGE");
        assert!(lines[1..].iter().all(|l| *l == "ASCENT,120.5,"));
    }

    #[test]
    fn test_export_overwrites_and_is_not_live() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Telemetry data.csv");
        std::fs::write(&path, "stale\nstale\nstale\nstale\nstale\n").unwrap();

        let src = source("A\n1\n");
        let mut recorder = SnapshotRecorder::new(fields(&["A"]));
        recorder.on_tick(&src, &clock()).unwrap();
        recorder.export(&path).unwrap();

        recorder.on_tick(&src, &clock()).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().collect::<Vec<_>>(), vec!["A", "1"]);
    }

    #[test]
    fn test_field_value_parse() {
        assert_eq!(FieldValue::parse("12.5"), FieldValue::Number(12.5));
        assert_eq!(FieldValue::parse("LAUNCH"), FieldValue::Text("LAUNCH".to_string()));
        assert_eq!(FieldValue::Missing.to_string(), "");
        assert_eq!(FieldValue::Number(100.0).to_string(), "100");
    }
}
