//! Performance Ledger
//!
//! Append-only per-slot histories of wealth, realized performance and
//! submitted demand. The ledger belongs to the node slot, never to the
//! strategy, so it survives any number of strategy replacements.

use crate::domain::statistics;
use serde::Serialize;

/// Number of zero entries every history starts with
///
/// Performance at tick `t` settles the position taken at `t - 2`, so the
/// first real tick is 2.
pub const WARM_UP_TICKS: usize = 2;

/// Wealth, performance and demand histories for one trader slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceLedger {
    wealth: Vec<f64>,
    performance: Vec<f64>,
    demand: Vec<f64>,
}

impl PerformanceLedger {
    pub fn new() -> Self {
        Self {
            wealth: vec![0.0; WARM_UP_TICKS],
            performance: vec![0.0; WARM_UP_TICKS],
            demand: vec![0.0; WARM_UP_TICKS],
        }
    }

    /// Record `performance[t]`: the level-price P&L of the position taken at `t - 2`
    pub fn update_performance(&mut self, log_prices: &[f64], t: usize) -> f64 {
        debug_assert!(t >= WARM_UP_TICKS, "performance undefined before tick 2");
        debug_assert_eq!(self.performance.len(), t);

        let price_change = log_prices[t].exp() - log_prices[t - 1].exp();
        let value = price_change * self.demand[t - 2];
        self.performance.push(value);
        value
    }

    /// Record `wealth[t]` as an exponential smoothing of performance
    pub fn update_wealth(&mut self, eta: f64, t: usize) -> f64 {
        debug_assert_eq!(self.wealth.len(), t);

        let value = eta * self.wealth[t - 1] + (1.0 - eta) * self.performance[t];
        self.wealth.push(value);
        value
    }

    /// Record `demand[t]`
    pub fn record_demand(&mut self, t: usize, value: f64) {
        debug_assert_eq!(self.demand.len(), t);
        self.demand.push(value);
    }

    /// Mean of the last `lookback` performance entries
    ///
    /// Falls back to the whole history while it is shorter than `lookback`.
    pub fn average_performance(&self, lookback: usize) -> f64 {
        let window = statistics::trailing(&self.performance, lookback.max(1));
        statistics::mean(window).unwrap_or(0.0)
    }

    pub fn wealth(&self) -> &[f64] {
        &self.wealth
    }

    pub fn performance(&self) -> &[f64] {
        &self.performance
    }

    pub fn demand(&self) -> &[f64] {
        &self.demand
    }

    /// Entries in each history, warm-up included (equal between ticks)
    pub fn ticks_recorded(&self) -> usize {
        self.wealth.len()
    }

    #[cfg(test)]
    pub(crate) fn from_performance(performance: Vec<f64>) -> Self {
        let len = performance.len();
        Self {
            wealth: vec![0.0; len],
            performance,
            demand: vec![0.0; len],
        }
    }
}

impl Default for PerformanceLedger {
    fn default() -> Self {
        Self::new()
    }
}
