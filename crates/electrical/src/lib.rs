//! Climate loads, battery thermal model and the energy/range model
//!
//! - `power`: AC and blower power draw
//! - `thermal`: battery temperature update
//! - `battery`: `EnergyModel`, integrating energy, drain rate and range

pub mod battery;
pub mod power;
pub mod thermal;

pub use battery::{EnergyConfig, EnergyModel, EnergyOutput};
