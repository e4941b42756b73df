//! Pedal arbitration
//!
//! Turns held/released pedal flags into ramped intensities. The brake ramps
//! ten times faster than the accelerator, and a simultaneous press is resolved
//! in favour of the brake with a safety flag raised for the caller.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use simcore::{ControlModel, Model, PedalState, SimContext, SimState};

/// Ramp rates per tick, in intensity points
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PedalRampConfig {
    pub accelerator_step: u8,
    pub brake_step: u8,
    pub max_intensity: u8,
}

impl Default for PedalRampConfig {
    fn default() -> Self {
        PedalRampConfig {
            accelerator_step: 1,
            brake_step: 10,
            max_intensity: 100,
        }
    }
}

impl PedalRampConfig {
    pub fn with_accelerator_step(mut self, step: u8) -> Self {
        self.accelerator_step = step;
        self
    }

    pub fn with_brake_step(mut self, step: u8) -> Self {
        self.brake_step = step;
        self
    }
}

/// What the arbiter decided for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PedalCommand {
    Accelerate,
    Brake,
    Release,
    /// Both pedals held; handled as `Brake`
    Coincident,
}

impl PedalCommand {
    pub fn from_flags(accelerator_pressed: bool, brake_pressed: bool) -> Self {
        match (accelerator_pressed, brake_pressed) {
            (true, true) => PedalCommand::Coincident,
            (true, false) => PedalCommand::Accelerate,
            (false, true) => PedalCommand::Brake,
            (false, false) => PedalCommand::Release,
        }
    }

    /// True when the caller must surface a safety action
    pub fn safety_action(&self) -> bool {
        matches!(self, PedalCommand::Coincident)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PedalArbiter {
    pub config: PedalRampConfig,
}

impl PedalArbiter {
    pub fn new(config: PedalRampConfig) -> Self {
        PedalArbiter { config }
    }

    /// Ramp the pedal intensities for one tick.
    pub fn tick(
        &self,
        pedals: &mut PedalState,
        accelerator_pressed: bool,
        brake_pressed: bool,
    ) -> PedalCommand {
        let max = self.config.max_intensity;
        let command = PedalCommand::from_flags(accelerator_pressed, brake_pressed);

        match command {
            PedalCommand::Accelerate => {
                pedals.accelerator_intensity = pedals
                    .accelerator_intensity
                    .saturating_add(self.config.accelerator_step)
                    .min(max);
                pedals.brake_intensity = 0;
            }
            PedalCommand::Brake | PedalCommand::Coincident => {
                pedals.brake_intensity = pedals
                    .brake_intensity
                    .saturating_add(self.config.brake_step)
                    .min(max);
                pedals.accelerator_intensity = 0;
            }
            PedalCommand::Release => {
                pedals.brake_intensity = pedals.brake_intensity.saturating_sub(self.config.brake_step);
                pedals.accelerator_intensity = pedals
                    .accelerator_intensity
                    .saturating_sub(self.config.accelerator_step);
            }
        }

        command
    }
}

impl Model for PedalArbiter {
    fn reset(&mut self) {
        // Pedal state lives on the SimState bus
    }
}

impl ControlModel for PedalArbiter {
    fn step_control(&mut self, ctx: SimContext, state: &mut SimState) {
        let command = self.tick(
            &mut state.pedals,
            state.inputs.accelerator_pressed,
            state.inputs.brake_pressed,
        );

        let safety = command.safety_action();
        if safety && !state.safety_action {
            warn!("Accelerator and brake pressed together at t={:.2}s, braking", ctx.t);
        } else if !safety && state.safety_action {
            info!("Coincident pedal press cleared at t={:.2}s", ctx.t);
        }
        state.safety_action = safety;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accelerator_ramps_one_step() {
        let arbiter = PedalArbiter::default();
        let mut pedals = PedalState {
            accelerator_intensity: 5,
            brake_intensity: 40,
        };

        let cmd = arbiter.tick(&mut pedals, true, false);
        assert_eq!(cmd, PedalCommand::Accelerate);
        assert_eq!(pedals.accelerator_intensity, 6);
        // Brake drops immediately, no ramp-down
        assert_eq!(pedals.brake_intensity, 0);
    }

    #[test]
    fn test_brake_ramps_ten_steps_and_caps() {
        let arbiter = PedalArbiter::default();
        let mut pedals = PedalState {
            accelerator_intensity: 30,
            brake_intensity: 0,
        };

        arbiter.tick(&mut pedals, false, true);
        assert_eq!(pedals.brake_intensity, 10);
        assert_eq!(pedals.accelerator_intensity, 0);

        for _ in 0..20 {
            arbiter.tick(&mut pedals, false, true);
        }
        assert_eq!(pedals.brake_intensity, 100);
    }

    #[test]
    fn test_release_ramps_both_down() {
        let arbiter = PedalArbiter::default();
        let mut pedals = PedalState {
            accelerator_intensity: 1,
            brake_intensity: 15,
        };

        assert_eq!(arbiter.tick(&mut pedals, false, false), PedalCommand::Release);
        assert_eq!(pedals.brake_intensity, 5);
        assert_eq!(pedals.accelerator_intensity, 0);

        arbiter.tick(&mut pedals, false, false);
        assert_eq!(pedals.brake_intensity, 0);
        assert_eq!(pedals.accelerator_intensity, 0);
    }

    #[test]
    fn test_coincident_press_brakes_and_flags() {
        let arbiter = PedalArbiter::default();
        let mut pedals = PedalState {
            accelerator_intensity: 50,
            brake_intensity: 95,
        };

        let cmd = arbiter.tick(&mut pedals, true, true);
        assert_eq!(cmd, PedalCommand::Coincident);
        assert!(cmd.safety_action());
        assert_eq!(pedals.brake_intensity, 100);
        assert_eq!(pedals.accelerator_intensity, 0);
    }

    #[test]
    fn test_ramp_rates_are_tunable() {
        let arbiter = PedalArbiter::new(PedalRampConfig::default().with_accelerator_step(5).with_brake_step(25));
        let mut pedals = PedalState::default();

        arbiter.tick(&mut pedals, true, false);
        assert_eq!(pedals.accelerator_intensity, 5);
        arbiter.tick(&mut pedals, false, true);
        assert_eq!(pedals.brake_intensity, 25);
    }

    #[test]
    fn test_step_control_sets_and_clears_safety_flag() {
        use simcore::{DrivetrainState, EnergyState, TickInputs};

        let mut arbiter = PedalArbiter::default();
        let mut state = SimState {
            inputs: TickInputs {
                accelerator_pressed: true,
                brake_pressed: true,
                ..Default::default()
            },
            pedals: PedalState::default(),
            safety_action: false,
            drivetrain: DrivetrainState::default(),
            energy: EnergyState {
                current_energy_kwh: 75.0,
                drain_rate_kwh_per_km: 0.13,
                battery_temperature_c: 35.0,
                battery_percentage: 100.0,
                remaining_range_km: 560.0,
            },
        };
        let ctx = SimContext { dt: 0.06, t: 0.0 };

        arbiter.step_control(ctx, &mut state);
        assert!(state.safety_action);
        assert_eq!(state.pedals.brake_intensity, 10);

        state.inputs.accelerator_pressed = false;
        arbiter.step_control(ctx, &mut state);
        assert!(!state.safety_action);
        assert_eq!(state.pedals.brake_intensity, 20);
    }
}
