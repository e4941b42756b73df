use serde::{Deserialize, Serialize};

use crate::vehicle::VehicleParameters;

// Drive mode

/// Damping applied to speed increments while accelerating in ECO
pub const ECO_FACTOR: f64 = 0.60;
/// Damping applied to speed increments while accelerating in SPORT
pub const SPORT_FACTOR: f64 = 0.80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DriveMode {
    #[default]
    Eco,
    Sport,
}

impl DriveMode {
    /// Hard speed cap for this mode (km/h)
    pub fn max_speed_kmh(&self, params: &VehicleParameters) -> f64 {
        match self {
            DriveMode::Eco => params.max_speed_eco_kmh,
            DriveMode::Sport => params.max_speed_sport_kmh,
        }
    }

    /// Power output ceiling advertised for this mode (kW)
    ///
    /// ECO exposes the ECO share of the rated engine power, SPORT the full rating.
    pub fn power_output_kw(&self, params: &VehicleParameters) -> f64 {
        match self {
            DriveMode::Eco => ECO_FACTOR * params.max_engine_power_kw,
            DriveMode::Sport => params.max_engine_power_kw,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            DriveMode::Eco => DriveMode::Sport,
            DriveMode::Sport => DriveMode::Eco,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DriveMode::Eco => "ECO",
            DriveMode::Sport => "SPORT",
        }
    }

    /// Parse the store/wire representation. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "ECO" => Some(DriveMode::Eco),
            "SPORT" => Some(DriveMode::Sport),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TurnSignal {
    #[default]
    Off,
    Left,
    Right,
}

impl TurnSignal {
    pub fn code(&self) -> u8 {
        match self {
            TurnSignal::Off => 0,
            TurnSignal::Left => 1,
            TurnSignal::Right => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TurnSignal::Off),
            1 => Some(TurnSignal::Left),
            2 => Some(TurnSignal::Right),
            _ => None,
        }
    }
}

// Control state

/// Ramped pedal intensities, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PedalState {
    pub accelerator_intensity: u8,
    pub brake_intensity: u8,
}

/// Driver and cabin inputs sampled at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickInputs {
    pub accelerator_pressed: bool,
    pub brake_pressed: bool,
    pub drive_mode: DriveMode,
    pub ac_on: bool,
    /// AC target temperature (°C); 0 means off
    pub ac_target_c: i32,
    pub wind_level: u8,
    pub turn_signal: TurnSignal,
}

impl Default for TickInputs {
    fn default() -> Self {
        TickInputs {
            accelerator_pressed: false,
            brake_pressed: false,
            drive_mode: DriveMode::Eco,
            ac_on: true,
            ac_target_c: 22,
            wind_level: 2,
            turn_signal: TurnSignal::Off,
        }
    }
}

impl TickInputs {
    /// AC target as seen by the climate load: 0 whenever the AC is switched off
    pub fn effective_ac_target(&self) -> i32 {
        if self.ac_on { self.ac_target_c } else { 0 }
    }

    /// Accelerator pressed without the brake; a coincident press is brake-dominant
    pub fn accelerating(&self) -> bool {
        self.accelerator_pressed && !self.brake_pressed
    }
}

// Mechanical state

/// Carried drivetrain state, mutated once per tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrivetrainState {
    pub current_speed_kmh: f64,
    /// Baseline for increment damping and monotonicity
    pub last_tick_speed_kmh: f64,
    /// `None` until the first tick has run
    pub last_drive_mode: Option<DriveMode>,
    pub last_acceleration: f64,
    pub total_distance_km: f64,
    pub power_consumption_w: f64,
}

// Electrical state

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyState {
    pub current_energy_kwh: f64,
    /// Smoothed consumption per km, never below the fallback floor
    pub drain_rate_kwh_per_km: f64,
    pub battery_temperature_c: f64,
    pub battery_percentage: f64,
    pub remaining_range_km: f64,
}

// Outputs

/// Value object produced by every tick, consumed by any number of renderers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Simulation time at the end of the tick (s)
    pub elapsed_s: f64,
    pub speed_kmh: u32,
    pub total_distance_km: f64,
    pub power_consumption_w: f64,
    pub battery_percentage: f64,
    pub remaining_range_km: f64,
    pub battery_temperature_c: f64,
    pub energy_kwh: f64,
    pub brake_intensity: u8,
    pub accelerator_intensity: u8,
    pub safety_action_triggered: bool,
    pub drive_mode: DriveMode,
    pub max_power_output_kw: f64,
    pub ac_on: bool,
    pub ac_target_c: i32,
    pub wind_level: u8,
    pub turn_signal: TurnSignal,
}

// Shared bus

/// State shared between models during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimState {
    pub inputs: TickInputs,
    pub pedals: PedalState,
    /// Raised for the tick in which accelerator and brake were both pressed
    pub safety_action: bool,
    pub drivetrain: DrivetrainState,
    pub energy: EnergyState,
}
