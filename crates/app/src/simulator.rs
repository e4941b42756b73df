use control::{PedalArbiter, PedalRampConfig};
use electrical::{EnergyConfig, EnergyModel};
use log::info;
use mechanics::{DrivetrainConfig, DrivetrainSimulator};
use simcore::{
    clamp_elapsed, ControlModel, DrivetrainState, ElectricalModel, MechanicsModel, Model,
    PedalState, SimContext, SimState, Telemetry, TickInputs, VehicleParameters,
};

/// One vehicle: the pedal arbiter, drivetrain and energy model sharing a state bus.
///
/// Each tick runs the models strictly in order (arbiter, drivetrain, energy)
/// because the drivetrain's distance and power feed the energy model.
pub struct VehicleSimulator {
    params: VehicleParameters,
    arbiter: PedalArbiter,
    drivetrain: DrivetrainSimulator,
    energy: EnergyModel,
    state: SimState,
    t: f64,
}

impl VehicleSimulator {
    pub fn new(
        params: VehicleParameters,
        pedal_config: PedalRampConfig,
        drivetrain_config: DrivetrainConfig,
        energy_config: EnergyConfig,
    ) -> Self {
        let arbiter = PedalArbiter::new(pedal_config);
        let drivetrain = DrivetrainSimulator::new(params.clone(), drivetrain_config);
        let energy = EnergyModel::new(params.clone(), energy_config);
        let state = Self::initial_state(&energy);

        info!("Vehicle simulator ready: {}", params.summary());
        VehicleSimulator {
            params,
            arbiter,
            drivetrain,
            energy,
            state,
            t: 0.0,
        }
    }

    /// Default tunables for everything but the vehicle
    pub fn with_defaults(params: VehicleParameters) -> Self {
        Self::new(
            params,
            PedalRampConfig::default(),
            DrivetrainConfig::default(),
            EnergyConfig::default(),
        )
    }

    fn initial_state(energy: &EnergyModel) -> SimState {
        SimState {
            inputs: TickInputs::default(),
            pedals: PedalState::default(),
            safety_action: false,
            drivetrain: DrivetrainState::default(),
            energy: energy.initial_state(),
        }
    }

    /// Advance one tick with a consistent input snapshot and the
    /// caller-measured elapsed time since the previous tick.
    pub fn tick(&mut self, inputs: TickInputs, elapsed_s: f64) -> Telemetry {
        self.state.inputs = inputs;
        let ctx = SimContext {
            dt: elapsed_s,
            t: self.t,
        };

        self.arbiter.step_control(ctx, &mut self.state);
        self.drivetrain.step_physics(ctx, &mut self.state);
        self.energy.step_electrical(ctx, &mut self.state);

        self.t += clamp_elapsed(elapsed_s);
        self.telemetry()
    }

    /// Telemetry for the state after the most recent tick
    pub fn telemetry(&self) -> Telemetry {
        let s = &self.state;
        Telemetry {
            elapsed_s: self.t,
            speed_kmh: s.drivetrain.current_speed_kmh.max(0.0).floor() as u32,
            total_distance_km: s.drivetrain.total_distance_km,
            power_consumption_w: s.drivetrain.power_consumption_w,
            battery_percentage: s.energy.battery_percentage,
            remaining_range_km: s.energy.remaining_range_km,
            battery_temperature_c: s.energy.battery_temperature_c,
            energy_kwh: s.energy.current_energy_kwh,
            brake_intensity: s.pedals.brake_intensity,
            accelerator_intensity: s.pedals.accelerator_intensity,
            safety_action_triggered: s.safety_action,
            drive_mode: s.inputs.drive_mode,
            max_power_output_kw: s.inputs.drive_mode.power_output_kw(&self.params),
            ac_on: s.inputs.ac_on,
            ac_target_c: s.inputs.effective_ac_target(),
            wind_level: s.inputs.wind_level,
            turn_signal: s.inputs.turn_signal,
        }
    }

    pub fn params(&self) -> &VehicleParameters {
        &self.params
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn environment_temp_c(&self) -> f64 {
        self.energy.config.environment_temp_c
    }

    /// Simulation time (s)
    pub fn elapsed_s(&self) -> f64 {
        self.t
    }

    /// Back to a parked vehicle with a full pack
    pub fn reset(&mut self) {
        self.arbiter.reset();
        self.drivetrain.reset();
        self.energy.reset();
        self.state = Self::initial_state(&self.energy);
        self.t = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simcore::{DriveMode, VehiclePreset};

    fn long_range() -> VehicleSimulator {
        VehicleSimulator::with_defaults(VehiclePreset::TeslaModel3LongRange.parameters())
    }

    fn accelerate(mode: DriveMode) -> TickInputs {
        TickInputs {
            accelerator_pressed: true,
            drive_mode: mode,
            ..Default::default()
        }
    }

    #[test]
    fn test_eco_launch_end_to_end() {
        let mut sim = long_range();

        let mut previous = sim.telemetry();
        for _ in 0..50 {
            let t = sim.tick(accelerate(DriveMode::Eco), 0.06);
            assert!(t.speed_kmh >= previous.speed_kmh);
            assert!(t.speed_kmh <= 190);
            assert!(t.total_distance_km >= previous.total_distance_km);
            assert!(t.energy_kwh <= previous.energy_kwh);
            assert!(t.remaining_range_km >= 0.0 && t.remaining_range_km <= 560.0);
            previous = t;
        }
        assert_eq!(previous.accelerator_intensity, 50);
        assert!(previous.speed_kmh > 0);
        assert!((previous.elapsed_s - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_coincident_press_is_reported() {
        let mut sim = long_range();
        let both = TickInputs {
            accelerator_pressed: true,
            brake_pressed: true,
            ..Default::default()
        };

        let t = sim.tick(both, 0.06);
        assert!(t.safety_action_triggered);
        assert_eq!(t.brake_intensity, 10);
        assert_eq!(t.accelerator_intensity, 0);
        assert_eq!(t.speed_kmh, 0);

        let t = sim.tick(TickInputs::default(), 0.06);
        assert!(!t.safety_action_triggered);
    }

    #[test]
    fn test_sport_to_eco_clamps_on_next_tick() {
        let mut sim = long_range();
        for _ in 0..400 {
            sim.tick(accelerate(DriveMode::Sport), 0.06);
        }
        assert!(sim.telemetry().speed_kmh > 190);

        let t = sim.tick(accelerate(DriveMode::Eco), 0.06);
        assert_eq!(t.speed_kmh, 190);
        assert_eq!(t.drive_mode, DriveMode::Eco);
    }

    #[test]
    fn test_telemetry_reflects_cabin_inputs() {
        let mut sim = long_range();
        let inputs = TickInputs {
            ac_on: false,
            ac_target_c: 24,
            wind_level: 4,
            drive_mode: DriveMode::Sport,
            ..Default::default()
        };

        let t = sim.tick(inputs, 0.06);
        assert!(!t.ac_on);
        assert_eq!(t.ac_target_c, 0);
        assert_eq!(t.wind_level, 4);
        assert_eq!(t.max_power_output_kw, 324.0);
    }

    #[test]
    fn test_identical_runs_are_bit_identical() {
        let mut a = long_range();
        let mut b = long_range();

        for i in 0..120 {
            let inputs = TickInputs {
                accelerator_pressed: i % 7 != 0,
                brake_pressed: i % 11 == 0,
                drive_mode: if i < 60 { DriveMode::Sport } else { DriveMode::Eco },
                ..Default::default()
            };
            let dt = 0.05 + (i % 3) as f64 * 0.01;
            let ta = a.tick(inputs, dt);
            let tb = b.tick(inputs, dt);
            assert_eq!(ta.total_distance_km.to_bits(), tb.total_distance_km.to_bits());
            assert_eq!(ta.energy_kwh.to_bits(), tb.energy_kwh.to_bits());
        }
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut sim = long_range();
        for _ in 0..30 {
            sim.tick(accelerate(DriveMode::Eco), 0.06);
        }
        sim.reset();

        let t = sim.telemetry();
        assert_eq!(t.speed_kmh, 0);
        assert_eq!(t.total_distance_km, 0.0);
        assert_eq!(t.battery_percentage, 100.0);
        assert_eq!(t.elapsed_s, 0.0);
    }
}
