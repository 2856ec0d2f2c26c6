//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{GroundStationError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub position: PositionConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_graphs")]
    pub graphs: Vec<GraphConfig>,
}

/// Telemetry input and export files
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,

    #[serde(default = "default_altitude_file")]
    pub altitude_file: String,

    #[serde(default = "default_export_file")]
    pub export_file: String,
}

/// Tick periods of the independent timers
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    #[serde(default = "default_replay_interval_ms")]
    pub replay_interval_ms: u64,

    #[serde(default = "default_graph_interval_ms")]
    pub graph_interval_ms: u64,

    #[serde(default = "default_snapshot_interval_ms")]
    pub snapshot_interval_ms: u64,

    #[serde(default = "default_position_interval_ms")]
    pub position_interval_ms: u64,
}

/// Altitude replay columns
#[derive(Debug, Deserialize, Clone)]
pub struct ReplayConfig {
    #[serde(default = "default_replay_x_field")]
    pub x_field: String,

    #[serde(default = "default_replay_y_field")]
    pub y_field: String,

    #[serde(default = "default_reference_samples")]
    pub reference_samples: usize,
}

/// Map marker columns and viewport
#[derive(Debug, Deserialize, Clone)]
pub struct PositionConfig {
    #[serde(default = "default_latitude_field")]
    pub latitude_field: String,

    #[serde(default = "default_longitude_field")]
    pub longitude_field: String,

    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: u8,
}

/// Snapshot recorder configuration
///
/// An empty `tracked_fields` list tracks every column of the first read.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub tracked_fields: Vec<String>,
}

/// Live graph display configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

/// Log file configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_file_logging")]
    pub file_logging: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
}

/// One live graph
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GraphConfig {
    pub field: String,
    pub y_min: f64,
    pub y_max: f64,
}

// Default value functions
fn default_data_file() -> String { "DATA.csv".to_string() }
fn default_altitude_file() -> String { "Altitude.csv".to_string() }
fn default_export_file() -> String { "Telemetry data.csv".to_string() }

fn default_replay_interval_ms() -> u64 { 1000 }
fn default_graph_interval_ms() -> u64 { 1000 }
fn default_snapshot_interval_ms() -> u64 { 1200 }
fn default_position_interval_ms() -> u64 { 1000 }

fn default_replay_x_field() -> String { "PACKET_COUNT".to_string() }
fn default_replay_y_field() -> String { "ALTITUDE".to_string() }
fn default_reference_samples() -> usize { 50 }

fn default_latitude_field() -> String { "GNSS_LATITUDE".to_string() }
fn default_longitude_field() -> String { "GNSS_LONGITUDE".to_string() }
fn default_initial_zoom() -> u8 { 10 }

fn default_window_size() -> usize { 8 }

fn default_file_logging() -> bool { true }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_log_file_prefix() -> String { "ground-station.log".to_string() }

fn default_graphs() -> Vec<GraphConfig> {
    [
        ("ALTITUDE", 100.0, 200.0),
        ("TEMPERATURE", 1000.0, 1100.0),
        ("VOLTAGE", 12.0, 13.0),
        ("PRESSURE", 0.0, 200.0),
        ("VIBRATION_DATA", 0.1, 0.6),
        ("PACKET_COUNT", 30.0, 60.0),
    ]
    .iter()
    .map(|&(field, y_min, y_max)| GraphConfig {
        field: field.to_string(),
        y_min,
        y_max,
    })
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            files: FilesConfig::default(),
            timing: TimingConfig::default(),
            replay: ReplayConfig::default(),
            position: PositionConfig::default(),
            snapshot: SnapshotConfig::default(),
            display: DisplayConfig::default(),
            logging: LoggingConfig::default(),
            graphs: default_graphs(),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            altitude_file: default_altitude_file(),
            export_file: default_export_file(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            replay_interval_ms: default_replay_interval_ms(),
            graph_interval_ms: default_graph_interval_ms(),
            snapshot_interval_ms: default_snapshot_interval_ms(),
            position_interval_ms: default_position_interval_ms(),
        }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            x_field: default_replay_x_field(),
            y_field: default_replay_y_field(),
            reference_samples: default_reference_samples(),
        }
    }
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            latitude_field: default_latitude_field(),
            longitude_field: default_longitude_field(),
            initial_zoom: default_initial_zoom(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_logging: default_file_logging(),
            log_dir: default_log_dir(),
            file_prefix: default_log_file_prefix(),
        }
    }
}

fn invalid(msg: impl std::fmt::Display) -> GroundStationError {
    GroundStationError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ground_station::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("data_file", &self.files.data_file),
            ("altitude_file", &self.files.altitude_file),
            ("export_file", &self.files.export_file),
            ("replay x_field", &self.replay.x_field),
            ("replay y_field", &self.replay.y_field),
            ("latitude_field", &self.position.latitude_field),
            ("longitude_field", &self.position.longitude_field),
        ] {
            if value.is_empty() {
                return Err(invalid(format!("{} cannot be empty", name)));
            }
        }

        for (name, value) in [
            ("replay_interval_ms", self.timing.replay_interval_ms),
            ("graph_interval_ms", self.timing.graph_interval_ms),
            ("snapshot_interval_ms", self.timing.snapshot_interval_ms),
            ("position_interval_ms", self.timing.position_interval_ms),
        ] {
            if value == 0 || value > 60000 {
                return Err(invalid(format!("{} must be between 1 and 60000", name)));
            }
        }

        if self.replay.reference_samples < 2 || self.replay.reference_samples > 10000 {
            return Err(invalid("reference_samples must be between 2 and 10000"));
        }

        if self.display.window_size == 0 || self.display.window_size > 1000 {
            return Err(invalid("window_size must be between 1 and 1000"));
        }

        if self.position.initial_zoom > 19 {
            return Err(invalid("initial_zoom must be between 0 and 19"));
        }

        if self.logging.file_logging && self.logging.log_dir.is_empty() {
            return Err(invalid("log_dir cannot be empty when file logging is enabled"));
        }

        for (i, graph) in self.graphs.iter().enumerate() {
            if graph.field.is_empty() {
                return Err(invalid(format!("graphs[{}].field cannot be empty", i)));
            }
            if !(graph.y_min < graph.y_max) {
                return Err(invalid(format!("graphs[{}] ({}): y_min must be less than y_max", i, graph.field)));
            }
            if self.graphs[..i].iter().any(|g| g.field == graph.field) {
                return Err(invalid(format!("graphs[{}]: duplicate field {}", i, graph.field)));
            }
        }

        if self.snapshot.tracked_fields.iter().any(String::is_empty) {
            return Err(invalid("tracked_fields cannot contain empty names"));
        }

        Ok(())
    }
}
