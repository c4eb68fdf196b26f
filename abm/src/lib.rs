//! Agent-Based Model (ABM) of a networked single-asset market
//!
//! Value investors and trend followers sit on the nodes of a social graph,
//! trade a single asset and copy the strategy of better-performing
//! neighbors. Aggregate demand moves the log-price each tick.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-export key types at crate root
pub use application::imitation::{ImitationMode, StrategySwap};
pub use application::market::{Market, MarketConfig};
pub use application::population::{NetworkBuilder, Population, PopulationConfig};
pub use application::simulation::{
    Simulation, SimulationConfig, SimulationMetrics, SimulationReport,
};
pub use domain::{NodeId, Strategy, StrategyKind, Topology, Trader, TraderNetwork};
pub use error::{ConfigurationError, Result};
