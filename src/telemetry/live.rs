//! # Live Field Graphs
//!
//! Rolling plots of one telemetry field against wall-clock time.
//!
//! Each tick takes the field's value at the current frame index, stamps it
//! with the current time at 1-second resolution, and advances the frame.
//! Only the most recent `window` samples are shown; the x-axis is relabelled
//! with their timestamps every tick.

use chrono::NaiveTime;
use tracing::debug;

use super::clock::{to_second, Clock};
use crate::error::Result;
use crate::source::TableSource;

/// Samples visible on a live graph
pub const DEFAULT_WINDOW: usize = 8;

/// One value stamped with the time it was plotted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSample {
    pub time: NaiveTime,
    pub value: f64,
}

/// Rolling graph for a single field
#[derive(Debug, Clone)]
pub struct LiveGraph {
    field: String,
    y_limits: (f64, f64),
    window: usize,
    /// Next row to plot
    frame: usize,
    samples: Vec<TimedSample>,
}

impl LiveGraph {
    /// Create a graph for `field`
    ///
    /// A `window` of 0 is treated as 1.
    pub fn new(field: impl Into<String>, y_limits: (f64, f64), window: usize) -> Self {
        Self {
            field: field.into(),
            y_limits,
            window: window.max(1),
            frame: 0,
            samples: Vec::new(),
        }
    }

    /// Plot the value at the current frame, if the file has reached it
    ///
    /// # Returns
    ///
    /// * `Ok(Some(sample))` - A new point was appended and the frame advanced
    /// * `Ok(None)` - The file has no row at the current frame yet
    ///
    /// # Errors
    ///
    /// Read and field errors; the frame does not advance.
    pub fn on_tick(&mut self, source: &dyn TableSource, clock: &dyn Clock) -> Result<Option<TimedSample>> {
        let table = source.read_all()?;

        if self.frame >= table.len() {
            debug!("{}: waiting for row {}", self.field, self.frame);
            return Ok(None);
        }

        let value = table.number(self.frame, &self.field)?;
        let sample = TimedSample {
            time: to_second(clock.now()),
            value,
        };

        self.samples.push(sample);
        self.frame += 1;
        Ok(Some(sample))
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn y_limits(&self) -> (f64, f64) {
        self.y_limits
    }

    /// Every sample plotted this session
    pub fn samples(&self) -> &[TimedSample] {
        &self.samples
    }

    /// The most recent `window` samples, oldest first
    pub fn visible(&self) -> &[TimedSample] {
        let start = self.samples.len().saturating_sub(self.window);
        &self.samples[start..]
    }

    /// Timestamps of the oldest and newest visible samples
    ///
    /// Taken in plot order, so a window spanning midnight keeps
    /// `start > end` rather than inverting.
    pub fn x_limits(&self) -> Option<(NaiveTime, NaiveTime)> {
        let visible = self.visible();
        Some((visible.first()?.time, visible.last()?.time))
    }

    /// `HH:MM:SS` label for each visible sample
    pub fn tick_labels(&self) -> Vec<String> {
        self.visible()
            .iter()
            .map(|s| s.time.format("%H:%M:%S").to_string())
            .collect()
    }
}
