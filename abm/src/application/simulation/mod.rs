//! Simulation Framework
//!
//! Provides the tick loop and coordination for running the networked market.
//!
//! # Architecture
//!
//! The simulation runner coordinates:
//! - Performance and wealth settlement
//! - Strategy imitation over the trader network
//! - Demand collection
//! - Price formation
//! - Metrics collection

mod config;
mod report;
mod runner;

pub use config::SimulationConfig;
pub use report::{NodeReport, SimulationMetrics, SimulationReport, StrategyBreakdown, TickResult};
pub use runner::Simulation;
