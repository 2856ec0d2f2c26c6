//! # Error Types
//!
//! Custom error types for the ground station using `thiserror`.
//!
//! Every data error is recoverable: the dashboard logs it and waits for the
//! next tick.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the ground station
#[derive(Debug, Error)]
pub enum GroundStationError {
    /// Telemetry file missing, empty or corrupt
    #[error("Failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// Column absent after empty-column filtering
    #[error("Field missing: {0}")]
    FieldMissing(String),

    /// Latitude/longitude missing or not numeric
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    /// Export requested before any snapshot was recorded
    #[error("No data recorded yet")]
    NoData,

    /// Operator typed something that is not a command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// CSV writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GroundStationError {
    /// Build a `Read` error for `path`
    pub fn read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for the ground station
pub type Result<T> = std::result::Result<T, GroundStationError>;
