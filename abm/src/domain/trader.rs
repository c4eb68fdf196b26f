//! Trader Slot
//!
//! One slot per network node. The slot owns the node identity, the
//! heterogeneity parameters and the ledger for the whole run; only the
//! strategy record inside it is replaceable.

use super::ledger::PerformanceLedger;
use super::network::NodeId;
use super::strategy::{DemandContext, DemandRule, Strategy};
use rand::Rng;

#[derive(Debug, Clone)]
pub struct Trader {
    node_id: NodeId,
    strategy: Strategy,
    lookback_period: usize,
    max_risk: f64,
    ledger: PerformanceLedger,
}

impl Trader {
    pub fn new(node_id: NodeId, strategy: Strategy, lookback_period: usize, max_risk: f64) -> Self {
        Self {
            node_id,
            strategy,
            lookback_period,
            max_risk,
            ledger: PerformanceLedger::new(),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn lookback_period(&self) -> usize {
        self.lookback_period
    }

    pub fn max_risk(&self) -> f64 {
        self.max_risk
    }

    pub fn ledger(&self) -> &PerformanceLedger {
        &self.ledger
    }

    pub fn update_performance(&mut self, log_prices: &[f64], t: usize) -> f64 {
        self.ledger.update_performance(log_prices, t)
    }

    pub fn update_wealth(&mut self, t: usize) -> f64 {
        self.ledger.update_wealth(self.strategy.eta(), t)
    }

    /// Compute and record this slot's demand for tick `t`
    pub fn calculate_demand<R: Rng + ?Sized>(
        &mut self,
        log_prices: &[f64],
        t: usize,
        rng: &mut R,
    ) -> f64 {
        let ctx = DemandContext {
            prices: log_prices,
            tick: t,
            max_risk: self.max_risk,
        };
        let demand = self.strategy.demand(&ctx, rng);
        self.ledger.record_demand(t, demand);
        demand
    }

    /// Trailing mean performance over `lookback` ticks
    pub fn average_performance(&self, lookback: usize) -> f64 {
        self.ledger.average_performance(lookback)
    }

    /// Replace the strategy record, keeping identity, parameters and histories
    pub fn adopt_strategy(&mut self, strategy: Strategy) -> Strategy {
        std::mem::replace(&mut self.strategy, strategy)
    }

    #[cfg(test)]
    pub(crate) fn with_ledger(mut self, ledger: PerformanceLedger) -> Self {
        self.ledger = ledger;
        self
    }
}
