//! Конфигурация симуляции (JSON, все поля опциональны).

use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::logger::LogLevel;

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Частота fixed tick (Hz)
    pub tick_hz: f64,
    /// Seed for `DeterministicRng`
    pub seed: u64,
    pub log_level: LogLevel,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: 42,
            log_level: LogLevel::Info,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tick_hz must be a positive finite number, got {0}")]
    InvalidTickRate(f64),
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if !self.tick_hz.is_finite() || self.tick_hz <= 0.0 {
            return Err(ConfigError::InvalidTickRate(self.tick_hz));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimulationConfig::from_json(r#"{ "seed": 7 }"#).unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.tick_hz, 60.0);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_log_level_and_tick_rate_validation() {
        let config = SimulationConfig::from_json(r#"{ "log_level": "Debug" }"#).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);

        assert!(matches!(
            SimulationConfig::from_json(r#"{ "tick_hz": 0.0 }"#),
            Err(ConfigError::InvalidTickRate(_))
        ));
        assert!(matches!(
            SimulationConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
