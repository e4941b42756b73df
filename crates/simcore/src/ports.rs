//! Input and output capabilities used by simulation runners
//!
//! The engine never talks to a concrete store or terminal. Runners pull a
//! consistent [`TickInputs`] snapshot at the start of each tick from an
//! [`InputSource`] and hand the resulting [`Telemetry`] to any number of
//! [`TelemetrySink`]s.

use crate::state::{Telemetry, TickInputs};

pub trait InputSource {
    type Error;

    /// Take a snapshot of the current inputs. `Ok(None)` means the source is exhausted.
    fn snapshot(&mut self) -> Result<Option<TickInputs>, Self::Error>;
}

pub trait TelemetrySink {
    type Error;

    fn publish(&mut self, telemetry: &Telemetry) -> Result<(), Self::Error>;
}
