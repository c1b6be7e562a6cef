//! Configuration loading from TOML files

mod catalog;
mod constants;

pub use catalog::{default_catalog, load_catalog, parse_catalog};
pub use constants::{
    CapacitorConstants, DefenseConstants, EngineConstants, StackingConstants, TargetingConstants,
};

use crate::error::FitError;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid reference data: {0}")]
    DataError(#[from] FitError),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load a TOML string and deserialize it
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}

/// Load engine constants from a TOML file
pub fn load_constants(path: &Path) -> Result<EngineConstants, ConfigError> {
    let constants: EngineConstants = load_toml(path)?;
    validate_constants(&constants)?;
    Ok(constants)
}

fn validate_constants(constants: &EngineConstants) -> Result<(), ConfigError> {
    let cap = &constants.capacitor;
    if cap.step_secs <= 0.0 || cap.horizon_secs <= 0.0 || cap.stability_window_secs <= 0.0 {
        return Err(ConfigError::ValidationError(
            "capacitor step, horizon and window must be positive".to_string(),
        ));
    }
    if cap.stability_window_secs * 2.0 > cap.horizon_secs {
        return Err(ConfigError::ValidationError(
            "capacitor horizon must cover two stability windows".to_string(),
        ));
    }
    if constants.stacking.penalty_denominator <= 0.0 {
        return Err(ConfigError::ValidationError(
            "stacking penalty denominator must be positive".to_string(),
        ));
    }
    if !(0.0..1.0).contains(&constants.defense.max_resistance) {
        return Err(ConfigError::ValidationError(
            "max_resistance must be in [0, 1)".to_string(),
        ));
    }
    Ok(())
}
