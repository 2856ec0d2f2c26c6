//! # Telemetry Module
//!
//! Per-tick consumers of the telemetry files.
//!
//! This module handles:
//! - Rolling live graphs of individual fields
//! - Snapshots of every tracked field, with CSV export
//! - Following the latest GNSS position on the map
//! - The wall clock used for timestamps and readouts

pub mod clock;
pub mod live;
pub mod position;
pub mod series;
pub mod snapshot;
