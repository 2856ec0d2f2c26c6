//! # Altitude Replay
//!
//! Replays a finite trajectory file one row per tick.
//!
//! Unlike the live graphs, which always look at the newest data, the replay
//! walks the file from the top: each tick consumes exactly one new row, even
//! if several have arrived since the last tick. When a tick finds no unread
//! row the replay finishes and its timer is cancelled for good.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{GroundStationError, Result};
use crate::source::TableSource;
use crate::telemetry::series::{Sample, Series};

/// Row-by-row replay of `x_field` against `y_field`
#[derive(Debug)]
pub struct AltitudeReplay {
    x_field: String,
    y_field: String,
    /// Rows consumed so far; the last plotted index is `consumed - 1`
    consumed: usize,
    series: Series,
    finished: bool,
    started_at: Instant,
}

impl AltitudeReplay {
    pub fn new(x_field: impl Into<String>, y_field: impl Into<String>) -> Self {
        let y_field = y_field.into();
        Self {
            x_field: x_field.into(),
            series: Series::new(y_field.clone()),
            y_field,
            consumed: 0,
            finished: false,
            started_at: Instant::now(),
        }
    }

    /// Consume at most one new row
    ///
    /// # Returns
    ///
    /// * `Ok(Some(sample))` - The next row was appended to the series
    /// * `Ok(None)` - No unread row; the replay is now finished
    ///
    /// # Errors
    ///
    /// * `Read` - nothing is consumed; the next tick retries
    /// * `FieldMissing` for a dropped column - nothing is consumed; the next
    ///   tick retries
    /// * `FieldMissing` for a non-numeric cell - the row is consumed without
    ///   plotting
    ///
    /// The replay stays active after any error.
    pub fn on_tick(&mut self, source: &dyn TableSource) -> Result<Option<Sample>> {
        if self.finished {
            return Ok(None);
        }

        let table = source.read_all()?;

        if table.len() <= self.consumed {
            self.finished = true;
            info!(
                "Replay finished after {} rows ({:.2}s)",
                self.consumed,
                self.elapsed().as_secs_f64()
            );
            return Ok(None);
        }

        for field in [&self.x_field, &self.y_field] {
            if !table.has_column(field) {
                return Err(GroundStationError::FieldMissing(field.clone()));
            }
        }

        let row = self.consumed;
        let sample = match table
            .number(row, &self.x_field)
            .and_then(|x| table.number(row, &self.y_field).map(|y| Sample::new(x, y)))
        {
            Ok(sample) => sample,
            Err(e) => {
                self.consumed += 1;
                warn!("Skipping replay row {}: {}", row, e);
                return Err(e);
            }
        };

        self.series.push(sample);
        self.consumed += 1;
        debug!("Replay row {}: {} = {}, {} = {}", row, self.x_field, sample.x, self.y_field, sample.y);

        Ok(Some(sample))
    }

    /// False once the file has been exhausted
    pub fn is_active(&self) -> bool {
        !self.finished
    }

    /// Index of the last consumed row, `None` before the first
    pub fn last_plotted_index(&self) -> Option<usize> {
        self.consumed.checked_sub(1)
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Plot title carrying the elapsed replay time
    pub fn title(&self) -> String {
        format!(
            "Live Altitude Data (Time Elapsed: {:.2} seconds)",
            self.elapsed().as_secs_f64()
        )
    }
}
