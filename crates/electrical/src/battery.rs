use log::{debug, warn};
use serde::{Deserialize, Serialize};
use simcore::{
    clamp_elapsed, ElectricalModel, EnergyState, Model, SimContext, SimState, VehicleParameters,
};

use crate::power::{ac_power, wind_power};
use crate::thermal::battery_temperature;

/// Weight of the previous smoothed drain rate in the moving average
pub const DRAIN_SMOOTHING: f64 = 0.9;
/// Distance after which the observed drain rate replaces the rated one (km)
pub const MIN_DISTANCE_FOR_DRAIN_KM: f64 = 0.1;
/// Drain rates below this are treated as degenerate (kWh/km)
pub const MIN_DRAIN_RATE: f64 = 0.001;
/// Replacement for a degenerate drain rate (kWh/km)
pub const FALLBACK_DRAIN_RATE: f64 = 0.1;
/// Battery percentage under which the pack is reported as low
pub const LOW_BATTERY_PERCENT: f64 = 10.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Ambient temperature (°C)
    pub environment_temp_c: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        EnergyConfig {
            environment_temp_c: 35.0,
        }
    }
}

impl EnergyConfig {
    pub fn with_environment_temp(mut self, temp_c: f64) -> Self {
        self.environment_temp_c = temp_c;
        self
    }
}

/// Result of one energy tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyOutput {
    pub energy_kwh: f64,
    pub battery_percentage: f64,
    pub remaining_range_km: f64,
    pub battery_temperature_c: f64,
    pub drain_rate_kwh_per_km: f64,
    /// Motor + AC + blower draw this tick (W)
    pub total_power_w: f64,
}

/// Battery energy, range estimate and pack temperature.
#[derive(Debug, Clone)]
pub struct EnergyModel {
    pub params: VehicleParameters,
    pub config: EnergyConfig,
}

fn effective_drain_rate(rate: f64) -> f64 {
    if rate.is_finite() && rate >= MIN_DRAIN_RATE {
        rate
    } else {
        FALLBACK_DRAIN_RATE
    }
}

impl EnergyModel {
    pub fn new(params: VehicleParameters, config: EnergyConfig) -> Self {
        EnergyModel { params, config }
    }

    /// Rated consumption used until enough distance has been covered (kWh/km)
    pub fn rated_drain_rate(&self) -> f64 {
        effective_drain_rate(self.params.battery_capacity_kwh / self.params.max_range_km)
    }

    /// Full pack at ambient temperature
    pub fn initial_state(&self) -> EnergyState {
        EnergyState {
            current_energy_kwh: self.params.battery_capacity_kwh,
            drain_rate_kwh_per_km: self.rated_drain_rate(),
            battery_temperature_c: self.config.environment_temp_c,
            battery_percentage: 100.0,
            remaining_range_km: self.params.max_range_km,
        }
    }

    fn percentage(&self, energy_kwh: f64) -> f64 {
        if self.params.battery_capacity_kwh > 0.0 {
            (energy_kwh / self.params.battery_capacity_kwh * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// Drain the pack for one tick and refresh the range estimate.
    ///
    /// `ac_target_c` of 0 means the AC is off. `total_distance_km` is the
    /// odometer after this tick's drivetrain step.
    pub fn tick(
        &self,
        state: &mut EnergyState,
        engine_power_w: f64,
        ac_target_c: i32,
        wind_level: u8,
        elapsed_s: f64,
        total_distance_km: f64,
    ) -> EnergyOutput {
        let dt = clamp_elapsed(elapsed_s);
        let capacity = self.params.battery_capacity_kwh;

        // Instantaneous draw
        let total_power_w = engine_power_w.max(0.0)
            + ac_power(self.config.environment_temp_c, ac_target_c, self.params.max_ac_power_w)
            + wind_power(wind_level);
        let drain_kwh_per_s = total_power_w / 1000.0 / 3600.0;

        let previous_percentage = state.battery_percentage;
        state.current_energy_kwh = (state.current_energy_kwh - drain_kwh_per_s * dt).clamp(0.0, capacity);
        state.battery_percentage = self.percentage(state.current_energy_kwh);

        // Smoothed per-km drain
        let rate = if total_distance_km > MIN_DISTANCE_FOR_DRAIN_KM {
            let used = capacity - state.current_energy_kwh;
            let observed = used / total_distance_km;
            DRAIN_SMOOTHING * state.drain_rate_kwh_per_km + (1.0 - DRAIN_SMOOTHING) * observed
        } else {
            capacity / self.params.max_range_km
        };
        let rate = effective_drain_rate(rate);
        if rate == FALLBACK_DRAIN_RATE && state.drain_rate_kwh_per_km != FALLBACK_DRAIN_RATE {
            debug!("Drain rate degenerate, using fallback {FALLBACK_DRAIN_RATE} kWh/km");
        }
        state.drain_rate_kwh_per_km = rate;

        state.remaining_range_km =
            (state.current_energy_kwh / rate).clamp(0.0, self.params.max_range_km);

        state.battery_temperature_c = battery_temperature(
            state.battery_temperature_c,
            self.config.environment_temp_c,
            engine_power_w,
        );

        if previous_percentage >= LOW_BATTERY_PERCENT && state.battery_percentage < LOW_BATTERY_PERCENT {
            warn!(
                "Battery low: {:.1}% ({:.1} km remaining)",
                state.battery_percentage, state.remaining_range_km
            );
        }

        EnergyOutput {
            energy_kwh: state.current_energy_kwh,
            battery_percentage: state.battery_percentage,
            remaining_range_km: state.remaining_range_km,
            battery_temperature_c: state.battery_temperature_c,
            drain_rate_kwh_per_km: state.drain_rate_kwh_per_km,
            total_power_w,
        }
    }
}

impl Model for EnergyModel {
    fn reset(&mut self) {
        // No internal state; see `initial_state`
    }
}

impl ElectricalModel for EnergyModel {
    fn step_electrical(&mut self, ctx: SimContext, state: &mut SimState) {
        let engine_power_w = state.drivetrain.power_consumption_w;
        let distance_km = state.drivetrain.total_distance_km;
        let ac_target = state.inputs.effective_ac_target();
        let wind = state.inputs.wind_level;

        self.tick(&mut state.energy, engine_power_w, ac_target, wind, ctx.dt, distance_km);
    }
}
