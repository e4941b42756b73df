use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use control::PedalRampConfig;
use electrical::EnergyConfig;
use log::LevelFilter;
use mechanics::DrivetrainConfig;
use serde::{Deserialize, Serialize};
use simcore::{ConfigError, VehicleParameters, VehiclePreset};

use crate::simulator::VehicleSimulator;

/// Runner configuration, loadable from JSON. Missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Preset key, see [`VehiclePreset::key`]
    pub preset: String,
    /// Optional JSON file with custom vehicle parameters; overrides `preset`
    pub vehicle_file: Option<PathBuf>,
    /// Payload on top of the vehicle weight (kg)
    pub load_kg: f64,
    /// Ambient temperature (°C)
    pub environment_temp_c: f64,
    /// Control-loop period for realtime runners (ms)
    pub tick_period_ms: u64,
    pub store_path: PathBuf,
    /// One of off, error, warn, info, debug, trace
    pub log_level: String,
    pub pedals: PedalRampConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            preset: VehiclePreset::TeslaModel3LongRange.key().to_string(),
            vehicle_file: None,
            load_kg: 200.0,
            environment_temp_c: 35.0,
            tick_period_ms: 60,
            store_path: PathBuf::from("vehicle_store.csv"),
            log_level: "info".to_string(),
            pedals: PedalRampConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.load_kg.is_nan() || self.load_kg < 0.0 {
            return Err(ConfigError::InvalidParameter {
                field: "load_kg",
                reason: format!("must be non-negative, got {}", self.load_kg),
            });
        }
        if !self.environment_temp_c.is_finite() {
            return Err(ConfigError::InvalidParameter {
                field: "environment_temp_c",
                reason: "must be finite".to_string(),
            });
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::InvalidParameter {
                field: "tick_period_ms",
                reason: "must be positive".to_string(),
            });
        }
        if LevelFilter::from_str(&self.log_level).is_err() {
            return Err(ConfigError::InvalidParameter {
                field: "log_level",
                reason: format!("unknown level '{}'", self.log_level),
            });
        }
        Ok(())
    }

    pub fn tick_period_s(&self) -> f64 {
        self.tick_period_ms as f64 / 1000.0
    }

    /// Parsed log level; unknown names fall back to `Info`
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    /// Vehicle parameters from `vehicle_file` if set, otherwise from `preset`
    pub fn vehicle_parameters(&self) -> Result<VehicleParameters, ConfigError> {
        if let Some(path) = &self.vehicle_file {
            return VehicleParameters::from_json_file(path);
        }
        VehiclePreset::from_key(&self.preset)
            .map(|preset| preset.parameters())
            .ok_or_else(|| ConfigError::UnknownPreset(self.preset.clone()))
    }

    pub fn drivetrain_config(&self) -> DrivetrainConfig {
        DrivetrainConfig::default().with_load(self.load_kg)
    }

    pub fn energy_config(&self) -> EnergyConfig {
        EnergyConfig::default().with_environment_temp(self.environment_temp_c)
    }

    pub fn build_simulator(&self) -> Result<VehicleSimulator, ConfigError> {
        let params = self.vehicle_parameters()?;
        Ok(VehicleSimulator::new(
            params,
            self.pedals,
            self.drivetrain_config(),
            self.energy_config(),
        ))
    }
}
