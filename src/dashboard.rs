//! # Dashboard
//!
//! Owns every telemetry component and drives their ticks.
//!
//! Each component has its own periodic timer; all of them are polled from a
//! single `tokio::select!` loop, so no two handlers ever run at once and no
//! state is shared. Every update is forwarded to a [`Renderer`], which is the
//! boundary to whatever front end draws the plots, readouts and map.
//!
//! Operator commands arrive one per line:
//!
//! | Command              | Effect                              |
//! |----------------------|-------------------------------------|
//! | `export`, `e`        | Write the snapshot history to CSV   |
//! | `zoom in`, `+`       | Zoom the map in                     |
//! | `zoom out`, `-`      | Zoom the map out                    |
//! | `quit`, `q`, `exit`  | Stop the dashboard                  |

use chrono::NaiveTime;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{Config, TimingConfig};
use crate::error::{GroundStationError, Result};
use crate::source::CsvFileSource;
use crate::telemetry::clock::SystemClock;
use crate::telemetry::live::{LiveGraph, TimedSample};
use crate::telemetry::position::{Position, PositionTracker};
use crate::telemetry::series::{Sample, Series};
use crate::telemetry::snapshot::{Snapshot, SnapshotRecorder};
use crate::trajectory::reference::reference_bands;
use crate::trajectory::replay::AltitudeReplay;

/// Something the front end should draw
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardUpdate {
    /// Static expected-trajectory bands, sent once at startup
    ReferenceBands(Vec<Series>),
    /// New point on the altitude replay plot
    Altitude { sample: Sample, title: String },
    /// The replay file is exhausted
    ReplayFinished { samples: usize },
    /// New point on a live graph, with the relabelled x-axis and plot limits
    Graph {
        field: String,
        sample: TimedSample,
        tick_labels: Vec<String>,
        x_limits: (NaiveTime, NaiveTime),
        y_limits: (f64, f64),
    },
    /// Fresh values for the readout labels
    Snapshot(Snapshot),
    /// Map marker moved
    Position { position: Position, zoom: u8 },
    /// Map zoom changed
    Zoom(u8),
    /// Snapshot history written to disk
    Exported { path: PathBuf, rows: usize },
}

/// Render layer boundary
pub trait Renderer {
    fn render(&mut self, update: &DashboardUpdate);
}

/// Renders every update as a log line
#[derive(Debug, Default)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn render(&mut self, update: &DashboardUpdate) {
        match update {
            DashboardUpdate::ReferenceBands(bands) => {
                for band in bands {
                    info!("Reference band '{}' ({} points)", band.name(), band.len());
                }
            }
            DashboardUpdate::Altitude { sample, title } => {
                info!("{}: packet {} altitude {}", title, sample.x, sample.y);
            }
            DashboardUpdate::ReplayFinished { samples } => {
                info!("Altitude replay complete ({} samples)", samples);
            }
            DashboardUpdate::Graph { field, sample, .. } => {
                debug!("{} @ {}: {}", field, sample.time.format("%H:%M:%S"), sample.value);
            }
            DashboardUpdate::Snapshot(snapshot) => {
                let fields: Vec<String> = snapshot
                    .values()
                    .iter()
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect();
                info!("{} {} | {}", snapshot.date_label(), snapshot.time_label(), fields.join(" "));
            }
            DashboardUpdate::Position { position, zoom } => {
                info!("Position {:.6}, {:.6} (zoom {})", position.latitude, position.longitude, zoom);
            }
            DashboardUpdate::Zoom(zoom) => info!("Map zoom {}", zoom),
            DashboardUpdate::Exported { path, rows } => {
                info!("CSV file '{}' created successfully ({} rows)", path.display(), rows);
            }
        }
    }
}

/// Operator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Export,
    ZoomIn,
    ZoomOut,
    Quit,
}

impl FromStr for Command {
    type Err = GroundStationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "export" | "e" => Ok(Self::Export),
            "zoom in" | "+" => Ok(Self::ZoomIn),
            "zoom out" | "-" => Ok(Self::ZoomOut),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(GroundStationError::UnknownCommand(other.to_string())),
        }
    }
}

/// The whole ground station: components, timers and render boundary
pub struct Dashboard<R: Renderer> {
    data_source: CsvFileSource,
    altitude_source: CsvFileSource,
    clock: SystemClock,
    reference: Vec<Series>,
    replay: AltitudeReplay,
    graphs: Vec<LiveGraph>,
    recorder: SnapshotRecorder,
    tracker: PositionTracker,
    export_path: PathBuf,
    timing: TimingConfig,
    renderer: R,
}

impl<R: Renderer> Dashboard<R> {
    /// Build every component from `config`
    pub fn from_config(config: &Config, renderer: R) -> Self {
        let graphs = config
            .graphs
            .iter()
            .map(|g| LiveGraph::new(g.field.clone(), (g.y_min, g.y_max), config.display.window_size))
            .collect();

        Self {
            data_source: CsvFileSource::new(&config.files.data_file),
            altitude_source: CsvFileSource::new(&config.files.altitude_file),
            clock: SystemClock,
            reference: reference_bands(config.replay.reference_samples),
            replay: AltitudeReplay::new(config.replay.x_field.clone(), config.replay.y_field.clone()),
            graphs,
            recorder: SnapshotRecorder::new(config.snapshot.tracked_fields.clone()),
            tracker: PositionTracker::new(
                config.position.latitude_field.clone(),
                config.position.longitude_field.clone(),
                config.position.initial_zoom,
            ),
            export_path: PathBuf::from(&config.files.export_file),
            timing: config.timing.clone(),
            renderer,
        }
    }

    /// Send the static reference bands to the renderer
    pub fn start(&mut self) {
        info!(
            "Watching {} and {}",
            self.data_source.path().display(),
            self.altitude_source.path().display()
        );
        self.renderer
            .render(&DashboardUpdate::ReferenceBands(self.reference.clone()));
    }

    /// Advance the altitude replay by one row
    ///
    /// Returns `false` once the replay has finished.
    pub fn tick_replay(&mut self) -> bool {
        if !self.replay.is_active() {
            return false;
        }

        match self.replay.on_tick(&self.altitude_source) {
            Ok(Some(sample)) => {
                let title = self.replay.title();
                self.renderer.render(&DashboardUpdate::Altitude { sample, title });
            }
            Ok(None) => {
                self.renderer.render(&DashboardUpdate::ReplayFinished {
                    samples: self.replay.series().len(),
                });
            }
            Err(e) => warn!("Altitude replay: {}", e),
        }

        self.replay.is_active()
    }

    /// Plot the next value on every live graph
    pub fn tick_graphs(&mut self) {
        for graph in &mut self.graphs {
            match graph.on_tick(&self.data_source, &self.clock) {
                Ok(Some(sample)) => {
                    let x_limits = graph.x_limits().unwrap_or((sample.time, sample.time));
                    self.renderer.render(&DashboardUpdate::Graph {
                        field: graph.field().to_string(),
                        sample,
                        tick_labels: graph.tick_labels(),
                        x_limits,
                        y_limits: graph.y_limits(),
                    });
                }
                Ok(None) => {}
                Err(e) => warn!("Graph {}: {}", graph.field(), e),
            }
        }
    }

    /// Record a snapshot of the tracked fields
    pub fn tick_snapshot(&mut self) {
        match self.recorder.on_tick(&self.data_source, &self.clock) {
            Ok(snapshot) => self.renderer.render(&DashboardUpdate::Snapshot(snapshot)),
            Err(e) => warn!("Snapshot: {}", e),
        }
    }

    /// Move the map marker to the latest fix
    pub fn tick_position(&mut self) {
        match self.tracker.on_tick(&self.data_source) {
            Ok(position) => self.renderer.render(&DashboardUpdate::Position {
                position,
                zoom: self.tracker.zoom(),
            }),
            Err(e) => warn!("Map: {}", e),
        }
    }

    /// Write the snapshot history to the export file
    ///
    /// # Errors
    ///
    /// `NoData` before the first snapshot, or the write error
    pub fn export(&mut self) -> Result<usize> {
        let rows = self.recorder.export(&self.export_path)?;
        self.renderer.render(&DashboardUpdate::Exported {
            path: self.export_path.clone(),
            rows,
        });
        Ok(rows)
    }

    /// Apply one operator command
    pub fn handle_command(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Export => {
                if let Err(e) = self.export() {
                    warn!("Export failed: {}", e);
                }
            }
            Command::ZoomIn => {
                let zoom = self.tracker.zoom_in();
                self.renderer.render(&DashboardUpdate::Zoom(zoom));
            }
            Command::ZoomOut => {
                let zoom = self.tracker.zoom_out();
                self.renderer.render(&DashboardUpdate::Zoom(zoom));
            }
            Command::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Run until `quit` on stdin or Ctrl+C
    ///
    /// # Errors
    ///
    /// Data errors never end the loop; this currently always returns `Ok`.
    pub async fn run(&mut self) -> Result<()> {
        self.run_with_input(BufReader::new(tokio::io::stdin())).await
    }

    /// Run until `quit` arrives on `input` or Ctrl+C
    ///
    /// End of input only stops command handling; the timers keep running.
    pub async fn run_with_input<I: AsyncBufRead + Unpin>(&mut self, input: I) -> Result<()> {
        self.start();

        let mut replay_tick = ticker(self.timing.replay_interval_ms);
        let mut graph_tick = ticker(self.timing.graph_interval_ms);
        let mut snapshot_tick = ticker(self.timing.snapshot_interval_ms);
        let mut position_tick = ticker(self.timing.position_interval_ms);

        let mut lines = input.lines();
        let mut input_open = true;

        info!("Dashboard running; commands: export, zoom in, zoom out, quit");

        loop {
            tokio::select! {
                _ = replay_tick.tick(), if self.replay.is_active() => {
                    self.tick_replay();
                }

                _ = graph_tick.tick() => self.tick_graphs(),

                _ = snapshot_tick.tick() => self.tick_snapshot(),

                _ = position_tick.tick() => self.tick_position(),

                line = lines.next_line(), if input_open => match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => match line.parse::<Command>() {
                        Ok(command) => {
                            if self.handle_command(command).is_break() {
                                info!("Quit requested, shutting down...");
                                break;
                            }
                        }
                        Err(e) => warn!("{}", e),
                    },
                    Ok(None) => {
                        debug!("Command input closed");
                        input_open = false;
                    }
                    Err(e) => {
                        warn!("Failed to read command: {}", e);
                        input_open = false;
                    }
                },

                // Handle Ctrl+C for graceful shutdown
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down...");
                    break;
                }
            }
        }

        info!(
            "Recorded {} snapshots, replayed {} altitude samples",
            self.recorder.history().len(),
            self.replay.series().len()
        );
        Ok(())
    }

    pub fn replay(&self) -> &AltitudeReplay {
        &self.replay
    }

    pub fn graphs(&self) -> &[LiveGraph] {
        &self.graphs
    }

    pub fn recorder(&self) -> &SnapshotRecorder {
        &self.recorder
    }

    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    pub fn reference(&self) -> &[Series] {
        &self.reference
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

fn ticker(period_ms: u64) -> tokio::time::Interval {
    let mut timer = interval(Duration::from_millis(period_ms));
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingRenderer {
        updates: Vec<DashboardUpdate>,
    }

    impl Renderer for RecordingRenderer {
        fn render(&mut self, update: &DashboardUpdate) {
            self.updates.push(update.clone());
        }
    }

    fn setup() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("DATA.csv"),
            "PACKET_COUNT,ALTITUDE,VOLTAGE,GNSS_LATITUDE,GNSS_LONGITUDE\n\
             1,150.0,12.5,40.7128,-74.0060\n\
             2,160.0,,40.7130,-74.0062\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("Altitude.csv"),
            "PACKET_COUNT,ALTITUDE\n1,900\n2,850\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.files.data_file = dir.path().join("DATA.csv").display().to_string();
        config.files.altitude_file = dir.path().join("Altitude.csv").display().to_string();
        config.files.export_file = dir.path().join("Telemetry data.csv").display().to_string();
        config.timing.replay_interval_ms = 10;
        config.timing.graph_interval_ms = 10;
        config.timing.snapshot_interval_ms = 12;
        config.timing.position_interval_ms = 10;
        (dir, config)
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!("export".parse::<Command>().unwrap(), Command::Export);
        assert_eq!(" Zoom In ".parse::<Command>().unwrap(), Command::ZoomIn);
        assert_eq!("-".parse::<Command>().unwrap(), Command::ZoomOut);
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
        assert!(matches!(
            "launch".parse::<Command>(),
            Err(GroundStationError::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_start_renders_reference_bands_once() {
        let (_dir, config) = setup();
        let mut dashboard = Dashboard::from_config(&config, RecordingRenderer::default());
        dashboard.start();

        match &dashboard.renderer().updates[..] {
            [DashboardUpdate::ReferenceBands(bands)] => {
                assert_eq!(bands.len(), 3);
                assert!(bands.iter().all(|b| b.len() == 50));
            }
            other => panic!("Expected reference bands, got: {:?}", other),
        }
    }

    #[test]
    fn test_replay_ticks_until_exhausted() {
        let (_dir, config) = setup();
        let mut dashboard = Dashboard::from_config(&config, RecordingRenderer::default());

        assert!(dashboard.tick_replay());
        assert!(dashboard.tick_replay());
        assert!(!dashboard.tick_replay());
        assert!(!dashboard.tick_replay());

        let updates = &dashboard.renderer().updates;
        assert_eq!(updates.len(), 3);
        assert!(matches!(updates[2], DashboardUpdate::ReplayFinished { samples: 2 }));
    }

    #[test]
    fn test_graphs_skip_dropped_columns() {
        let (_dir, config) = setup();
        let mut dashboard = Dashboard::from_config(&config, RecordingRenderer::default());
        dashboard.tick_graphs();

        let fields: Vec<&str> = dashboard
            .renderer()
            .updates
            .iter()
            .filter_map(|u| match u {
                DashboardUpdate::Graph { field, .. } => Some(field.as_str()),
                _ => None,
            })
            .collect();
        // VOLTAGE has a blank cell; TEMPERATURE, PRESSURE and VIBRATION_DATA are absent
        assert_eq!(fields, vec!["ALTITUDE", "PACKET_COUNT"]);
    }

    #[test]
    fn test_graph_update_carries_plot_limits() {
        let (_dir, config) = setup();
        let mut dashboard = Dashboard::from_config(&config, RecordingRenderer::default());
        dashboard.tick_graphs();

        match &dashboard.renderer().updates[0] {
            DashboardUpdate::Graph {
                field,
                sample,
                tick_labels,
                x_limits,
                y_limits,
            } => {
                assert_eq!(field, "ALTITUDE");
                assert_eq!(*x_limits, (sample.time, sample.time));
                assert_eq!(*y_limits, (100.0, 200.0));
                assert_eq!(tick_labels.len(), 1);
            }
            other => panic!("Expected graph update, got: {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_and_export() {
        let (dir, config) = setup();
        let mut dashboard = Dashboard::from_config(&config, RecordingRenderer::default());

        assert!(matches!(dashboard.export(), Err(GroundStationError::NoData)));

        dashboard.tick_snapshot();
        dashboard.tick_snapshot();
        assert_eq!(dashboard.export().unwrap(), 2);

        let contents = fs::read_to_string(dir.path().join("Telemetry data.csv")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "PACKET_COUNT,ALTITUDE,GNSS_LATITUDE,GNSS_LONGITUDE");
        assert_eq!(lines[1], "2,160,40.713,-74.0062");
    }

    #[test]
    fn test_position_and_zoom_commands() {
        let (_dir, config) = setup();
        let mut dashboard = Dashboard::from_config(&config, RecordingRenderer::default());

        dashboard.tick_position();
        assert_eq!(
            dashboard.tracker().position(),
            Some(Position { latitude: 40.7130, longitude: -74.0062 })
        );

        assert!(dashboard.handle_command(Command::ZoomIn).is_continue());
        assert_eq!(dashboard.tracker().zoom(), 11);
        assert!(dashboard.handle_command(Command::ZoomOut).is_continue());
        assert!(dashboard.handle_command(Command::Quit).is_break());
        assert_eq!(dashboard.renderer().updates.last(), Some(&DashboardUpdate::Zoom(10)));
    }

    #[tokio::test]
    async fn test_run_stops_on_quit() {
        let (_dir, config) = setup();
        let mut dashboard = Dashboard::from_config(&config, RecordingRenderer::default());

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            dashboard.run_with_input(&b"zoom in\nquit\n"[..]),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
        assert_eq!(dashboard.tracker().zoom(), 11);
    }

    #[tokio::test]
    async fn test_run_keeps_ticking_after_input_closes() {
        let (_dir, config) = setup();
        let mut dashboard = Dashboard::from_config(&config, RecordingRenderer::default());

        let result = tokio::time::timeout(
            Duration::from_millis(300),
            dashboard.run_with_input(&b""[..]),
        )
        .await;

        // Still running when the timeout fires
        assert!(result.is_err());
        assert!(!dashboard.replay().is_active());
        assert_eq!(dashboard.replay().series().len(), 2);
        assert!(!dashboard.recorder().history().is_empty());
        assert!(dashboard.tracker().position().is_some());
    }
}
