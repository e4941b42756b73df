//! Core types shared by every part of the vehicle simulation
//!
//! This crate provides:
//! - The per-tick state bus (`SimState`) and its component states
//! - Vehicle parameters and the built-in presets
//! - Model traits implemented by the control, mechanics and electrical crates
//! - Tick timing helpers and the input/telemetry ports used by runners

pub mod error;
pub mod ports;
pub mod state;
pub mod time;
pub mod traits;
pub mod vehicle;

pub use error::ConfigError;
pub use ports::{InputSource, TelemetrySink};
pub use state::*;
pub use time::{clamp_elapsed, TickScheduler, MAX_ELAPSED_S, MIN_ELAPSED_S};
pub use traits::*;
pub use vehicle::{VehicleAttribute, VehicleBrand, VehicleOption, VehicleParameters, VehiclePreset};
