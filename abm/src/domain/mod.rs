//! Domain layer: Pure business logic and value objects

pub mod ledger;
pub mod network;
pub mod statistics;
pub mod strategy;
pub mod trader;

pub use ledger::{PerformanceLedger, WARM_UP_TICKS};
pub use network::{NodeId, Topology, TraderNetwork};
pub use strategy::{DemandContext, DemandRule, Strategy, StrategyKind, TrendFollower, ValueInvestor};
pub use trader::Trader;
