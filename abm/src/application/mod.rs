//! Application layer: Use cases and orchestration
//!
//! Contains:
//! - **population**: NetworkBuilder that wires the graph and seeds every slot
//! - **imitation**: Per-tick strategy copying along network edges
//! - **market**: Aggregate demand and log-price formation
//! - **simulation**: Configuration, tick loop and run reports

pub mod imitation;
pub mod market;
pub mod population;
pub mod simulation;
