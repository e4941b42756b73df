//! Driver-facing control logic
//!
//! - `pedal`: accelerator/brake intensity ramps and coincident-press arbitration
//! - `keys`: keyboard mapping and cabin (climate, turn signal, drive mode) controls

pub mod keys;
pub mod pedal;

pub use keys::{CabinControls, DriverKey};
pub use pedal::{PedalArbiter, PedalCommand, PedalRampConfig};
