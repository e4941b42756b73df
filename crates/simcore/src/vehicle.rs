//! Vehicle parameters and built-in presets
//!
//! Parameters are selected once at startup and held immutable for the run.
//! They can come from one of the reference presets or from a JSON file.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleBrand {
    Tesla,
    Hyundai,
    Vinfast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleOption {
    Standard,
    LongRange,
    Performance,
}

/// Keyed access to a single vehicle parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleAttribute {
    EngineCount,
    BatteryCapacity,
    BatteryVoltage,
    MaxRange,
    MaxTorque,
    MaxEnginePower,
    MaxAcPower,
    MaxSpeedSport,
    MaxSpeedEco,
    MaxRpm,
    Weight,
    WheelRadius,
    AcTempMax,
    AcTempMin,
    WindLevelMax,
}

/// Immutable per-session vehicle description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleParameters {
    pub name: String,
    /// Usable battery capacity (kWh)
    pub battery_capacity_kwh: f64,
    pub battery_voltage_v: f64,
    /// Rated range on a full battery (km)
    pub max_range_km: f64,
    pub max_torque_nm: f64,
    pub max_engine_power_kw: f64,
    pub max_ac_power_w: f64,
    pub max_speed_sport_kmh: f64,
    pub max_speed_eco_kmh: f64,
    pub max_rpm: u32,
    /// Curb weight without load (kg)
    pub weight_kg: f64,
    pub wheel_radius_cm: f64,
    pub ac_temp_min_c: i32,
    pub ac_temp_max_c: i32,
    pub max_wind_level: u8,
    pub engine_count: u8,
}

impl VehicleParameters {
    pub fn attribute(&self, attribute: VehicleAttribute) -> f64 {
        match attribute {
            VehicleAttribute::EngineCount => self.engine_count as f64,
            VehicleAttribute::BatteryCapacity => self.battery_capacity_kwh,
            VehicleAttribute::BatteryVoltage => self.battery_voltage_v,
            VehicleAttribute::MaxRange => self.max_range_km,
            VehicleAttribute::MaxTorque => self.max_torque_nm,
            VehicleAttribute::MaxEnginePower => self.max_engine_power_kw,
            VehicleAttribute::MaxAcPower => self.max_ac_power_w,
            VehicleAttribute::MaxSpeedSport => self.max_speed_sport_kmh,
            VehicleAttribute::MaxSpeedEco => self.max_speed_eco_kmh,
            VehicleAttribute::MaxRpm => self.max_rpm as f64,
            VehicleAttribute::Weight => self.weight_kg,
            VehicleAttribute::WheelRadius => self.wheel_radius_cm,
            VehicleAttribute::AcTempMax => self.ac_temp_max_c as f64,
            VehicleAttribute::AcTempMin => self.ac_temp_min_c as f64,
            VehicleAttribute::WindLevelMax => self.max_wind_level as f64,
        }
    }

    /// Select a preset by brand and option.
    pub fn select(brand: VehicleBrand, option: VehicleOption) -> Result<Self, ConfigError> {
        let preset = VehiclePreset::for_selection(brand, option)
            .ok_or(ConfigError::InvalidSelection { brand, option })?;
        info!("parameters of {} are loaded", preset.display_name());
        Ok(preset.parameters())
    }

    /// Load parameters from a JSON file and validate them.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        let params: VehicleParameters = serde_json::from_str(&text)?;
        params.validate()?;
        info!("parameters of {} loaded from {}", params.name, path.as_ref().display());
        Ok(params)
    }

    /// Reject values that would make the physics meaningless (zero mass, zero radius, ...).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("battery_capacity_kwh", self.battery_capacity_kwh),
            ("max_range_km", self.max_range_km),
            ("max_torque_nm", self.max_torque_nm),
            ("max_speed_sport_kmh", self.max_speed_sport_kmh),
            ("max_speed_eco_kmh", self.max_speed_eco_kmh),
            ("weight_kg", self.weight_kg),
            ("wheel_radius_cm", self.wheel_radius_cm),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidParameter {
                    field,
                    reason: format!("expected a positive value, got {value}"),
                });
            }
        }
        if self.max_rpm == 0 {
            return Err(ConfigError::InvalidParameter {
                field: "max_rpm",
                reason: "expected a positive value, got 0".to_string(),
            });
        }
        if self.ac_temp_min_c > self.ac_temp_max_c {
            return Err(ConfigError::InvalidParameter {
                field: "ac_temp_min_c",
                reason: format!(
                    "minimum {} exceeds maximum {}",
                    self.ac_temp_min_c, self.ac_temp_max_c
                ),
            });
        }
        Ok(())
    }

    /// Multi-line summary of the loaded vehicle
    pub fn summary(&self) -> String {
        format!(
            "----------------------------------------\n\
             {}\n \
             + capacity: {}kWh\n \
             + voltage: {}V\n \
             + torque: {}Nm\n \
             + max speed in sport mode: {}km/h\n \
             + max speed in eco mode: {}km/h\n \
             + max power: {}kW\n \
             + max ac power: {}W\n \
             + max RPM: {}\n \
             + max range: {}km\n \
             + engine total: {}\n \
             + weight: {}kg\n \
             + wheel radius: {}cm\n\
             ----------------------------------------",
            self.name,
            self.battery_capacity_kwh,
            self.battery_voltage_v,
            self.max_torque_nm,
            self.max_speed_sport_kmh,
            self.max_speed_eco_kmh,
            self.max_engine_power_kw,
            self.max_ac_power_w,
            self.max_rpm,
            self.max_range_km,
            self.engine_count,
            self.weight_kg,
            self.wheel_radius_cm,
        )
    }
}

/// Reference vehicles shipped with the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehiclePreset {
    TeslaModel3Standard,
    TeslaModel3LongRange,
    HyundaiIoniq5,
    HyundaiIoniq5Performance,
}

impl VehiclePreset {
    pub const ALL: [VehiclePreset; 4] = [
        VehiclePreset::TeslaModel3Standard,
        VehiclePreset::TeslaModel3LongRange,
        VehiclePreset::HyundaiIoniq5,
        VehiclePreset::HyundaiIoniq5Performance,
    ];

    pub fn for_selection(brand: VehicleBrand, option: VehicleOption) -> Option<Self> {
        match (brand, option) {
            (VehicleBrand::Tesla, VehicleOption::Standard) => Some(VehiclePreset::TeslaModel3Standard),
            (VehicleBrand::Tesla, VehicleOption::LongRange) => Some(VehiclePreset::TeslaModel3LongRange),
            (VehicleBrand::Hyundai, VehicleOption::Standard) => Some(VehiclePreset::HyundaiIoniq5),
            (VehicleBrand::Hyundai, VehicleOption::Performance) => {
                Some(VehiclePreset::HyundaiIoniq5Performance)
            }
            _ => None,
        }
    }

    /// Short identifier used on the command line and in config files
    pub fn key(&self) -> &'static str {
        match self {
            VehiclePreset::TeslaModel3Standard => "tesla-model3-standard",
            VehiclePreset::TeslaModel3LongRange => "tesla-model3-long-range",
            VehiclePreset::HyundaiIoniq5 => "hyundai-ioniq5",
            VehiclePreset::HyundaiIoniq5Performance => "hyundai-ioniq5-performance",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            VehiclePreset::TeslaModel3Standard => "Tesla Model 3 (Standard)",
            VehiclePreset::TeslaModel3LongRange => "Tesla Model 3 (Long Range)",
            VehiclePreset::HyundaiIoniq5 => "Hyundai Ioniq 5 (Standard)",
            VehiclePreset::HyundaiIoniq5Performance => "Hyundai Ioniq 5 (Performance)",
        }
    }

    /// Look a preset up by its key. Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.key() == key)
    }

    pub fn parameters(&self) -> VehicleParameters {
        let name = self.display_name().to_string();
        match self {
            VehiclePreset::TeslaModel3Standard => VehicleParameters {
                name,
                battery_capacity_kwh: 54.0,
                battery_voltage_v: 350.0,
                max_range_km: 409.0,
                max_torque_nm: 300.0,
                max_engine_power_kw: 211.0,
                max_ac_power_w: 2500.0,
                max_speed_sport_kmh: 225.0,
                max_speed_eco_kmh: 160.0,
                max_rpm: 16000,
                weight_kg: 1612.0,
                wheel_radius_cm: 34.0,
                ac_temp_min_c: 15,
                ac_temp_max_c: 28,
                max_wind_level: 5,
                engine_count: 1,
            },
            VehiclePreset::TeslaModel3LongRange => VehicleParameters {
                name,
                battery_capacity_kwh: 75.0,
                battery_voltage_v: 350.0,
                max_range_km: 560.0,
                max_torque_nm: 440.0,
                max_engine_power_kw: 324.0,
                max_ac_power_w: 3000.0,
                max_speed_sport_kmh: 233.0,
                max_speed_eco_kmh: 190.0,
                max_rpm: 17000,
                weight_kg: 1847.0,
                wheel_radius_cm: 35.0,
                ac_temp_min_c: 15,
                ac_temp_max_c: 28,
                max_wind_level: 5,
                engine_count: 2,
            },
            VehiclePreset::HyundaiIoniq5 => VehicleParameters {
                name,
                battery_capacity_kwh: 58.0,
                battery_voltage_v: 360.0,
                max_range_km: 400.0,
                max_torque_nm: 300.0,
                max_engine_power_kw: 211.0,
                max_ac_power_w: 2500.0,
                max_speed_sport_kmh: 225.0,
                max_speed_eco_kmh: 160.0,
                max_rpm: 16000,
                weight_kg: 1612.0,
                wheel_radius_cm: 34.0,
                ac_temp_min_c: 15,
                ac_temp_max_c: 28,
                max_wind_level: 5,
                engine_count: 1,
            },
            VehiclePreset::HyundaiIoniq5Performance => VehicleParameters {
                name,
                battery_capacity_kwh: 75.0,
                battery_voltage_v: 350.0,
                max_range_km: 530.0,
                max_torque_nm: 650.0,
                max_engine_power_kw: 393.0,
                max_ac_power_w: 3500.0,
                max_speed_sport_kmh: 261.0,
                max_speed_eco_kmh: 210.0,
                max_rpm: 18000,
                weight_kg: 1847.0,
                wheel_radius_cm: 36.0,
                ac_temp_min_c: 15,
                ac_temp_max_c: 28,
                max_wind_level: 5,
                engine_count: 2,
            },
        }
    }
}

impl Default for VehicleParameters {
    fn default() -> Self {
        VehiclePreset::TeslaModel3LongRange.parameters()
    }
}
