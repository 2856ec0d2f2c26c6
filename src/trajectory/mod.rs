//! # Trajectory Module
//!
//! The altitude screen: a recorded trajectory replayed one row per tick,
//! plotted against three static reference bands.

pub mod reference;
pub mod replay;
