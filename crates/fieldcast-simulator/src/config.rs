//! Simulator configuration.

use crate::errors::{Result, SimulatorError};
use serde::{Deserialize, Serialize};

/// How devices are ordered within one tick.
///
/// Delivery happens at the end of the tick, so the order is not observable by
/// the programs themselves; the shuffle exists to validate exactly that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleOrder {
    /// Ascending device-id order
    Sequential,
    /// Seeded shuffle, re-drawn every tick
    Shuffled,
}

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Rounds executed by [`crate::Network::run`]
    pub rounds: u32,
    /// Seed for the scheduling RNG
    pub seed: u64,
    /// Per-tick device ordering
    pub order: ScheduleOrder,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            rounds: 10,
            seed: 0xF1E1D,
            order: ScheduleOrder::Sequential,
        }
    }
}

impl SimulatorConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(SimulatorError::config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let config = SimulatorConfig::from_toml_str("rounds = 3\norder = \"shuffled\"").unwrap();
        assert_eq!(config.rounds, 3);
        assert_eq!(config.order, ScheduleOrder::Shuffled);
        assert_eq!(config.seed, SimulatorConfig::default().seed);
    }

    #[test]
    fn garbage_is_a_config_error() {
        let err = SimulatorConfig::from_toml_str("rounds = \"many\"").unwrap_err();
        assert!(matches!(err, SimulatorError::Config(_)));
    }
}
