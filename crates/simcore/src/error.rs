use thiserror::Error;

use crate::vehicle::{VehicleBrand, VehicleOption};

/// Errors raised while selecting or loading vehicle configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown vehicle preset `{0}`")]
    UnknownPreset(String),

    #[error("no {option:?} option is available for {brand:?}")]
    InvalidSelection {
        brand: VehicleBrand,
        option: VehicleOption,
    },

    #[error("invalid vehicle parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
