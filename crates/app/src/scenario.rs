//! Scripted driving scenarios
//!
//! A scenario is a list of segments, each holding a fixed set of inputs for a
//! number of ticks. Cabin settings left out of a segment carry over from the
//! previous one.

use std::convert::Infallible;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use simcore::{DriveMode, InputSource, TickInputs, TurnSignal};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scenario has no ticks")]
    Empty,
    #[error("invalid timestep {0} s")]
    InvalidTimestep(f64),
}

fn default_dt() -> f64 {
    0.06
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Segment {
    pub ticks: usize,
    #[serde(default)]
    pub accelerator: bool,
    #[serde(default)]
    pub brake: bool,
    pub drive_mode: Option<DriveMode>,
    pub ac_on: Option<bool>,
    pub ac_target_c: Option<i32>,
    pub wind_level: Option<u8>,
    pub turn_signal: Option<TurnSignal>,
}

impl Segment {
    /// Inputs for this segment on top of the previous segment's inputs
    pub fn apply(&self, previous: &TickInputs) -> TickInputs {
        TickInputs {
            accelerator_pressed: self.accelerator,
            brake_pressed: self.brake,
            drive_mode: self.drive_mode.unwrap_or(previous.drive_mode),
            ac_on: self.ac_on.unwrap_or(previous.ac_on),
            ac_target_c: self.ac_target_c.unwrap_or(previous.ac_target_c),
            wind_level: self.wind_level.unwrap_or(previous.wind_level),
            turn_signal: self.turn_signal.unwrap_or(previous.turn_signal),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Fixed elapsed time per tick (s)
    #[serde(default = "default_dt")]
    pub dt_s: f64,
    pub segments: Vec<Segment>,
}

impl Scenario {
    pub fn from_json_str(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !self.dt_s.is_finite() || self.dt_s <= 0.0 {
            return Err(ScenarioError::InvalidTimestep(self.dt_s));
        }
        if self.total_ticks() == 0 {
            return Err(ScenarioError::Empty);
        }
        Ok(())
    }

    pub fn total_ticks(&self) -> usize {
        self.segments.iter().map(|s| s.ticks).sum()
    }

    pub fn duration_s(&self) -> f64 {
        self.total_ticks() as f64 * self.dt_s
    }

    pub fn inputs(&self) -> ScriptedInputs {
        ScriptedInputs::new(self)
    }
}

/// Replays a scenario's segments as per-tick input snapshots
#[derive(Debug, Clone)]
pub struct ScriptedInputs {
    frames: Vec<(TickInputs, usize)>,
    index: usize,
    emitted: usize,
}

impl ScriptedInputs {
    pub fn new(scenario: &Scenario) -> Self {
        let mut previous = TickInputs::default();
        let frames = scenario
            .segments
            .iter()
            .map(|segment| {
                let inputs = segment.apply(&previous);
                previous = inputs;
                (inputs, segment.ticks)
            })
            .collect();

        ScriptedInputs {
            frames,
            index: 0,
            emitted: 0,
        }
    }
}

impl InputSource for ScriptedInputs {
    type Error = Infallible;

    fn snapshot(&mut self) -> Result<Option<TickInputs>, Infallible> {
        while let Some(&(inputs, ticks)) = self.frames.get(self.index) {
            if self.emitted < ticks {
                self.emitted += 1;
                return Ok(Some(inputs));
            }
            self.index += 1;
            self.emitted = 0;
        }
        Ok(None)
    }
}
