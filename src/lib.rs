//! # Ground Station Library
//!
//! Live telemetry dashboard core for rocket and balloon ground stations.
//!
//! This library polls the CSV files written by a telemetry receiver and turns
//! them into plot samples, field readouts and map positions for a front end
//! to draw.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod source;
pub mod telemetry;
pub mod trajectory;
