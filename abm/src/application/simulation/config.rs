//! Simulation Configuration

use crate::application::imitation::ImitationMode;
use crate::application::market::{MarketConfig, SEED_PRICES};
use crate::application::population::PopulationConfig;
use crate::domain::Topology;
use crate::error::{ConfigurationError, Result};
use serde::{Deserialize, Serialize};

/// Everything needed to build and run one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Trader network family and its parameter
    pub topology: Topology,
    /// Population mix and heterogeneity
    pub population: PopulationConfig,
    /// Price impact and starting price
    pub market: MarketConfig,
    /// Length of the final log-price series
    pub time_steps: usize,
    /// Random seed for determinism (`None` draws one from the OS)
    pub seed: Option<u64>,
    /// Visibility of swaps within an imitation pass
    pub imitation: ImitationMode,
    /// Log progress every 100 ticks at info level
    pub verbose: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            topology: Topology::default(),
            population: PopulationConfig::default(),
            market: MarketConfig::default(),
            time_steps: 500,
            seed: Some(42),
            imitation: ImitationMode::Snapshot,
            verbose: false,
        }
    }
}

impl SimulationConfig {
    /// Check every parameter before anything is built
    pub fn validate(&self) -> Result<()> {
        if self.time_steps < SEED_PRICES {
            return Err(ConfigurationError::invalid(
                "time_steps",
                format!("must be at least {SEED_PRICES}, got {}", self.time_steps),
            ));
        }
        if !self.market.mu.is_finite() {
            return Err(ConfigurationError::invalid("market.mu", "must be finite"));
        }
        if !self.market.initial_price.is_finite() {
            return Err(ConfigurationError::invalid("market.initial_price", "must be finite"));
        }
        self.population.validate()?;
        self.topology.validate(self.population.number_of_traders)?;
        Ok(())
    }

    /// Set the seed (builder pattern)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the horizon (builder pattern)
    pub fn with_time_steps(mut self, time_steps: usize) -> Self {
        self.time_steps = time_steps;
        self
    }

    /// Set the topology (builder pattern)
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Number of ticks a full run executes
    pub fn num_ticks(&self) -> usize {
        self.time_steps.saturating_sub(SEED_PRICES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_ticks(), 497);
    }

    #[test]
    fn test_horizon_too_short() {
        let config = SimulationConfig::default().with_time_steps(2);
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidParameter { name: "time_steps", .. })
        ));
        assert!(SimulationConfig::default().with_time_steps(3).validate().is_ok());
    }

    #[test]
    fn test_topology_checked_against_population() {
        let mut config = SimulationConfig::default()
            .with_topology(Topology::PreferentialAttachment { new_node_edges: 5 });
        config.population.number_of_traders = 4;
        config.population.percent_value_investor = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "time_steps": 50, "population": { "number_of_traders": 10 } }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.time_steps, 50);
        assert_eq!(config.population.number_of_traders, 10);
        assert_eq!(config.population.high_lookback, 5);
        assert_eq!(config.market.mu, 0.01);
        assert_eq!(config.imitation, ImitationMode::Snapshot);
    }
}
