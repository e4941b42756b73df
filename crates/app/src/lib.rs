//! Runners and collaborators around the simulation core
//!
//! - `simulator`: `VehicleSimulator`, one tick of arbiter, drivetrain and energy model
//! - `store`: file-backed key-value store used to exchange inputs and telemetry
//! - `display`: console dashboard renderer
//! - `scenario`: scripted input sequences loaded from JSON
//! - `config`: application configuration

pub mod config;
pub mod display;
pub mod scenario;
pub mod simulator;
pub mod store;

pub use config::AppConfig;
pub use display::{render_dashboard, ConsoleDisplay};
pub use scenario::{Scenario, ScenarioError, ScriptedInputs, Segment};
pub use simulator::VehicleSimulator;
pub use store::{KeyValueStore, StoreError};
