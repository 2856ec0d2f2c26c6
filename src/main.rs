//! # Ground Station
//!
//! Live telemetry dashboard for rocket and balloon payloads.
//!
//! Polls `DATA.csv` and `Altitude.csv` written by the telemetry receiver and
//! renders plots, readouts and the vehicle position.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use ground_station::config::{Config, LoggingConfig};
use ground_station::dashboard::{Dashboard, LogRenderer};

/// Configuration file, read from the working directory if present
const CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for the ground station
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (defaults if the file is absent)
///    - Set up console and rolling file logging
///
/// 2. **Main Loop**
///    - Replay the altitude file at one row per tick
///    - Refresh live graphs, readouts and map position on their own timers
///    - Accept `export`, `zoom in`, `zoom out` and `quit` on stdin
///
/// 3. **Shutdown**
///    - On `quit` or Ctrl+C, log session totals and exit
///
/// # Examples
///
/// ```bash
/// cargo run --release
/// ```
///
/// Expected output:
/// ```text
/// INFO ground_station: Ground Station v0.1.0 starting...
/// INFO ground_station::dashboard: Reference band 'Main Function' (50 points)
/// INFO ground_station::dashboard: Live Altitude Data (Time Elapsed: 0.00 seconds): packet 1 altitude 900
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH)
        .with_context(|| format!("Failed to load {}", CONFIG_PATH))?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(&config.logging);

    info!("Ground Station v{} starting...", env!("CARGO_PKG_VERSION"));
    if !Path::new(CONFIG_PATH).exists() {
        info!("No {} found, using defaults", CONFIG_PATH);
    }

    let mut dashboard = Dashboard::from_config(&config, LogRenderer);
    dashboard.run().await?;

    Ok(())
}

/// Console logging plus an optional daily-rolling log file
fn init_logging(logging: &LoggingConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    if logging.file_logging {
        let appender = tracing_appender::rolling::daily(&logging.log_dir, &logging.file_prefix);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .init();
        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_relative() {
        assert!(Path::new(CONFIG_PATH).is_relative());
        assert!(CONFIG_PATH.ends_with(".toml"));
    }
}
