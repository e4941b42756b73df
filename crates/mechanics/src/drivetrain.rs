use log::debug;
use serde::{Deserialize, Serialize};
use simcore::state::{ECO_FACTOR, SPORT_FACTOR};
use simcore::{
    clamp_elapsed, DriveMode, DrivetrainState, MechanicsModel, Model, PedalState, SimContext,
    SimState, VehicleParameters,
};

use crate::physics;

/// Tunables for the drivetrain integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivetrainConfig {
    /// Payload added to the vehicle weight (kg)
    pub load_kg: f64,
    /// Increment damping while accelerating in ECO
    pub eco_factor: f64,
    /// Increment damping while accelerating in SPORT
    pub sport_factor: f64,
}

impl Default for DrivetrainConfig {
    fn default() -> Self {
        DrivetrainConfig {
            load_kg: 200.0,
            eco_factor: ECO_FACTOR,
            sport_factor: SPORT_FACTOR,
        }
    }
}

impl DrivetrainConfig {
    pub fn with_load(mut self, load_kg: f64) -> Self {
        self.load_kg = load_kg.max(0.0);
        self
    }
}

/// Result of one drivetrain tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrivetrainOutput {
    pub speed_kmh: f64,
    pub total_distance_km: f64,
    /// Electrical power drawn by the motor this tick (W)
    pub power_consumption_w: f64,
    pub acceleration_ms2: f64,
}

/// Integrates vehicle speed and distance from pedal intensities and applies
/// the drive-mode speed policy.
///
/// The simulator holds only immutable configuration; all carried state lives in
/// [`DrivetrainState`], so a tick is a pure function of its arguments.
#[derive(Debug, Clone)]
pub struct DrivetrainSimulator {
    pub params: VehicleParameters,
    pub config: DrivetrainConfig,
}

impl DrivetrainSimulator {
    pub fn new(params: VehicleParameters, config: DrivetrainConfig) -> Self {
        DrivetrainSimulator { params, config }
    }

    /// Vehicle weight plus payload (kg)
    pub fn loaded_weight_kg(&self) -> f64 {
        self.params.weight_kg + self.config.load_kg
    }

    fn factor(&self, mode: DriveMode) -> f64 {
        match mode {
            DriveMode::Eco => self.config.eco_factor,
            DriveMode::Sport => self.config.sport_factor,
        }
    }

    /// Advance the drivetrain by one tick.
    ///
    /// `accelerating` is true only when the accelerator is held without the
    /// brake. While accelerating, the mode's factor damps the speed increment
    /// over the previous tick and speed never drops below that baseline unless
    /// the mode changed. Otherwise the integrated speed is only capped.
    pub fn tick(
        &self,
        state: &mut DrivetrainState,
        pedals: &PedalState,
        accelerating: bool,
        mode: DriveMode,
        elapsed_s: f64,
    ) -> DrivetrainOutput {
        let dt = clamp_elapsed(elapsed_s);
        let weight = self.loaded_weight_kg();

        // Forces and power at the current speed
        let speed_ms = state.current_speed_kmh / 3.6;
        let rpm = physics::rpm(speed_ms, self.params.wheel_radius_cm, self.params.max_rpm);
        let torque = physics::torque(
            rpm,
            self.params.max_rpm,
            pedals.accelerator_intensity,
            self.params.max_torque_nm,
        );
        let omega = physics::angular_speed(rpm);
        let power_w = physics::engine_electrical_power(torque, omega);
        let tractive = physics::tractive_force(self.params.wheel_radius_cm, torque);
        let accel = physics::acceleration(
            speed_ms,
            tractive,
            weight,
            pedals.brake_intensity,
            state.last_acceleration,
        );

        // Explicit integration
        let new_speed_ms = (speed_ms + accel * dt).max(0.0);
        let provisional_kmh = (new_speed_ms * 3.6).trunc();

        // Drive-mode policy
        let cap = mode.max_speed_kmh(&self.params);
        let mode_changed = state.last_drive_mode.is_some_and(|last| last != mode);

        let speed_kmh = if accelerating {
            let downshift = state.last_drive_mode == Some(DriveMode::Sport) && mode == DriveMode::Eco;
            if downshift && provisional_kmh > cap {
                debug!(
                    "SPORT -> ECO: clamping {:.1} km/h to ECO cap {:.1} km/h",
                    provisional_kmh, cap
                );
                state.last_tick_speed_kmh = cap;
                cap
            } else {
                let baseline = state.last_tick_speed_kmh;
                let increment = provisional_kmh - baseline;
                let mut speed = if increment > 0.0 {
                    (baseline + increment * self.factor(mode)).trunc()
                } else {
                    provisional_kmh
                };
                speed = speed.min(cap);
                if !mode_changed {
                    speed = speed.max(baseline);
                }
                speed
            }
        } else {
            if provisional_kmh > cap {
                debug!("{} cap: {:.1} -> {:.1} km/h", mode.as_str(), provisional_kmh, cap);
            }
            provisional_kmh.min(cap)
        };

        // Kinematic distance from the pre-cap motion
        let step_m = new_speed_ms * dt + 0.5 * accel * dt * dt;
        state.total_distance_km += step_m.max(0.0) / 1000.0;

        state.current_speed_kmh = speed_kmh.max(0.0);
        state.last_tick_speed_kmh = state.current_speed_kmh;
        state.last_drive_mode = Some(mode);
        state.last_acceleration = accel;
        state.power_consumption_w = power_w;

        DrivetrainOutput {
            speed_kmh: state.current_speed_kmh,
            total_distance_km: state.total_distance_km,
            power_consumption_w: power_w,
            acceleration_ms2: accel,
        }
    }
}

impl Model for DrivetrainSimulator {
    fn reset(&mut self) {
        // Carried state lives on the SimState bus
    }
}

impl MechanicsModel for DrivetrainSimulator {
    fn step_physics(&mut self, ctx: SimContext, state: &mut SimState) {
        let accelerating = state.inputs.accelerating();
        let mode = state.inputs.drive_mode;
        let pedals = state.pedals;
        self.tick(&mut state.drivetrain, &pedals, accelerating, mode, ctx.dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simcore::VehiclePreset;

    fn long_range() -> DrivetrainSimulator {
        DrivetrainSimulator::new(
            VehiclePreset::TeslaModel3LongRange.parameters(),
            DrivetrainConfig::default(),
        )
    }

    fn cruising(speed_kmh: f64, mode: DriveMode) -> DrivetrainState {
        DrivetrainState {
            current_speed_kmh: speed_kmh,
            last_tick_speed_kmh: speed_kmh,
            last_drive_mode: Some(mode),
            ..Default::default()
        }
    }

    #[test]
    fn test_loaded_weight() {
        let sim = long_range();
        assert!((sim.loaded_weight_kg() - 2047.0).abs() < 1e-9);

        let heavy = DrivetrainSimulator::new(
            VehiclePreset::TeslaModel3LongRange.parameters(),
            DrivetrainConfig::default().with_load(500.0),
        );
        assert!((heavy.loaded_weight_kg() - 2347.0).abs() < 1e-9);
    }

    #[test]
    fn test_sport_to_eco_clamps_immediately_while_accelerating() {
        let sim = long_range();
        let mut state = cruising(200.0, DriveMode::Sport);
        let pedals = PedalState {
            accelerator_intensity: 100,
            brake_intensity: 0,
        };

        let out = sim.tick(&mut state, &pedals, true, DriveMode::Eco, 0.06);
        assert_eq!(out.speed_kmh, 190.0);
        assert_eq!(state.last_tick_speed_kmh, 190.0);
        assert_eq!(state.last_drive_mode, Some(DriveMode::Eco));
    }

    #[test]
    fn test_sport_to_eco_clamps_immediately_when_coasting() {
        let params = VehiclePreset::TeslaModel3Standard.parameters();
        let sim = DrivetrainSimulator::new(params, DrivetrainConfig::default());
        let mut state = cruising(200.0, DriveMode::Sport);

        let out = sim.tick(&mut state, &PedalState::default(), false, DriveMode::Eco, 0.06);
        assert_eq!(out.speed_kmh, 160.0);
    }

    #[test]
    fn test_mode_cap_holds_at_full_throttle() {
        let sim = long_range();
        let mut state = cruising(185.0, DriveMode::Eco);
        let pedals = PedalState {
            accelerator_intensity: 100,
            brake_intensity: 0,
        };

        for _ in 0..100 {
            let out = sim.tick(&mut state, &pedals, true, DriveMode::Eco, 0.06);
            assert!(out.speed_kmh <= 190.0);
        }
    }

    #[test]
    fn test_zero_throttle_stays_parked() {
        let sim = long_range();
        let mut state = DrivetrainState::default();

        let out = sim.tick(&mut state, &PedalState::default(), false, DriveMode::Eco, 0.0);
        assert_eq!(out.speed_kmh, 0.0);
        assert_eq!(out.acceleration_ms2, 0.0);
        assert_eq!(out.total_distance_km, 0.0);
        assert_eq!(out.power_consumption_w, 0.0);
    }

    #[test]
    fn test_braking_slows_without_going_negative() {
        let sim = long_range();
        let mut state = cruising(30.0, DriveMode::Eco);
        let pedals = PedalState {
            accelerator_intensity: 0,
            brake_intensity: 100,
        };

        let mut previous = state.current_speed_kmh;
        for _ in 0..50 {
            let out = sim.tick(&mut state, &pedals, false, DriveMode::Eco, 0.06);
            assert!(out.speed_kmh >= 0.0);
            assert!(out.speed_kmh <= previous);
            previous = out.speed_kmh;
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn test_eco_launch_is_monotonic_and_capped() {
        // 50 ticks of held accelerator at 60ms, pedal ramping one step per tick
        let sim = long_range();
        let mut state = DrivetrainState::default();
        let mut pedals = PedalState::default();

        let mut previous_speed = 0.0;
        let mut previous_distance = 0.0;
        for _ in 0..50 {
            pedals.accelerator_intensity = (pedals.accelerator_intensity + 1).min(100);
            let out = sim.tick(&mut state, &pedals, true, DriveMode::Eco, 0.06);

            assert!(out.speed_kmh >= previous_speed);
            assert!(out.speed_kmh <= 190.0);
            assert!(out.total_distance_km >= previous_distance);
            previous_speed = out.speed_kmh;
            previous_distance = out.total_distance_km;
        }
        assert!(previous_speed > 0.0);
    }

    #[test]
    fn test_damping_applies_to_increment_only() {
        let sim = long_range();
        let pedals = PedalState {
            accelerator_intensity: 20,
            brake_intensity: 0,
        };

        let mut coasting = cruising(50.0, DriveMode::Eco);
        let undamped = sim.tick(&mut coasting, &pedals, false, DriveMode::Eco, 0.06);

        let mut driving = cruising(50.0, DriveMode::Eco);
        let damped = sim.tick(&mut driving, &pedals, true, DriveMode::Eco, 0.06);

        // 72 km/h undamped, 50 + 22 * 0.6 = 63.2 truncated
        let expected = (50.0 + (undamped.speed_kmh - 50.0) * ECO_FACTOR).trunc();
        assert_eq!(undamped.speed_kmh, 72.0);
        assert_eq!(damped.speed_kmh, expected);
        assert_eq!(damped.speed_kmh, 63.0);
    }

    #[test]
    fn test_sport_damping_factor() {
        let sim = long_range();
        let pedals = PedalState {
            accelerator_intensity: 20,
            brake_intensity: 0,
        };

        let mut coasting = cruising(50.0, DriveMode::Sport);
        let undamped = sim.tick(&mut coasting, &pedals, false, DriveMode::Sport, 0.06);

        let mut driving = cruising(50.0, DriveMode::Sport);
        let damped = sim.tick(&mut driving, &pedals, true, DriveMode::Sport, 0.06);

        // 50 + 22 * 0.8 = 67.6 truncated
        let expected = (50.0 + (undamped.speed_kmh - 50.0) * SPORT_FACTOR).trunc();
        assert_eq!(undamped.speed_kmh, 72.0);
        assert_eq!(damped.speed_kmh, expected);
        assert_eq!(damped.speed_kmh, 67.0);
    }

    #[test]
    fn test_eco_to_sport_skips_monotonic_guard() {
        let sim = long_range();
        let pedals = PedalState {
            accelerator_intensity: 1,
            brake_intensity: 0,
        };
        let behind_baseline = DrivetrainState {
            current_speed_kmh: 100.0,
            last_tick_speed_kmh: 120.0,
            last_drive_mode: Some(DriveMode::Eco),
            ..Default::default()
        };

        // Same mode: speed is held at the baseline
        let mut held = behind_baseline;
        let out = sim.tick(&mut held, &pedals, true, DriveMode::Eco, 0.06);
        assert_eq!(out.speed_kmh, 120.0);

        // Mode change: the integrated speed is taken as is
        let mut switched = behind_baseline;
        let out = sim.tick(&mut switched, &pedals, true, DriveMode::Sport, 0.06);
        assert_eq!(out.speed_kmh, 101.0);
        assert_eq!(switched.last_drive_mode, Some(DriveMode::Sport));
    }

    #[test]
    fn test_eco_launch_carries_whole_kmh() {
        let sim = long_range();
        let mut state = DrivetrainState::default();
        let mut pedals = PedalState::default();

        let mut speeds = Vec::new();
        for _ in 0..50 {
            pedals.accelerator_intensity = (pedals.accelerator_intensity + 1).min(100);
            let out = sim.tick(&mut state, &pedals, true, DriveMode::Eco, 0.06);
            assert_eq!(out.speed_kmh, out.speed_kmh.trunc());
            speeds.push(out.speed_kmh);
        }

        assert_eq!(speeds[9], 31.0);
        assert_eq!(speeds[19], 124.0);
        assert_eq!(speeds[29], 190.0);
    }

    #[test]
    fn test_tick_is_bit_reproducible() {
        let sim = long_range();
        let prior = DrivetrainState {
            current_speed_kmh: 42.5,
            last_tick_speed_kmh: 41.9,
            last_drive_mode: Some(DriveMode::Sport),
            last_acceleration: 1.3,
            total_distance_km: 3.2,
            power_consumption_w: 12_000.0,
        };
        let pedals = PedalState {
            accelerator_intensity: 37,
            brake_intensity: 0,
        };

        let mut a = prior;
        let mut b = prior;
        let out_a = sim.tick(&mut a, &pedals, true, DriveMode::Sport, 0.061);
        let out_b = sim.tick(&mut b, &pedals, true, DriveMode::Sport, 0.061);

        assert_eq!(out_a.speed_kmh.to_bits(), out_b.speed_kmh.to_bits());
        assert_eq!(out_a.total_distance_km.to_bits(), out_b.total_distance_km.to_bits());
        assert_eq!(out_a.power_consumption_w.to_bits(), out_b.power_consumption_w.to_bits());
        assert_eq!(a, b);
    }
}
