//! # Position Tracker
//!
//! Follows the vehicle's latest GNSS fix and owns the map viewport.
//!
//! One read attempt per tick. When the coordinates cannot be read the last
//! known position is kept and the marker stays where it is.

use tracing::debug;

use crate::error::{GroundStationError, Result};
use crate::source::TableSource;

/// Default column holding latitude in degrees
pub const DEFAULT_LATITUDE_FIELD: &str = "GNSS_LATITUDE";

/// Default column holding longitude in degrees
pub const DEFAULT_LONGITUDE_FIELD: &str = "GNSS_LONGITUDE";

/// Zoom level range supported by slippy-map tile sources
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 19;

/// Map marker position in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// Latest-fix tracker with a zoomable viewport
#[derive(Debug, Clone)]
pub struct PositionTracker {
    latitude_field: String,
    longitude_field: String,
    position: Option<Position>,
    zoom: u8,
}

impl PositionTracker {
    pub fn new(latitude_field: impl Into<String>, longitude_field: impl Into<String>, zoom: u8) -> Self {
        Self {
            latitude_field: latitude_field.into(),
            longitude_field: longitude_field.into(),
            position: None,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    /// Move the marker to the latest row's coordinates
    ///
    /// # Errors
    ///
    /// * `Read` - the file could not be read
    /// * `PositionUnavailable` - no rows, or latitude/longitude missing or
    ///   not numeric; the previous position is kept
    pub fn on_tick(&mut self, source: &dyn TableSource) -> Result<Position> {
        let table = source.read_all()?;
        let latest = table
            .last_record()
            .ok_or_else(|| GroundStationError::PositionUnavailable("no data rows".to_string()))?;

        let fix = latest
            .number(&self.latitude_field)
            .and_then(|latitude| {
                latest
                    .number(&self.longitude_field)
                    .map(|longitude| Position { latitude, longitude })
            })
            .map_err(|e| GroundStationError::PositionUnavailable(e.to_string()))?;

        debug!("Position {:.6}, {:.6}", fix.latitude, fix.longitude);
        self.position = Some(fix);
        Ok(fix)
    }

    /// Last known position, `None` until the first good fix
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn zoom_in(&mut self) -> u8 {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
        self.zoom
    }

    pub fn zoom_out(&mut self) -> u8 {
        self.zoom = self.zoom.saturating_sub(1);
        self.zoom
    }
}
