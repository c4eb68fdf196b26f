//! Price Formation
//!
//! Single-asset market cleared by aggregate demand: the log-price moves by
//! `mu` times the mean demand of all traders each tick.

use crate::domain::Trader;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of identical log-prices the series starts with
pub const SEED_PRICES: usize = 3;

/// Static market parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Price impact of one unit of mean demand
    pub mu: f64,
    /// Starting log-price
    pub initial_price: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            mu: 0.01,
            initial_price: 0.0,
        }
    }
}

/// Log-price series and latest aggregate demand
#[derive(Debug, Clone)]
pub struct Market {
    mu: f64,
    prices: Vec<f64>,
    average_demand: f64,
}

impl Market {
    pub fn new(config: MarketConfig) -> Self {
        Self::with_capacity(config, SEED_PRICES)
    }

    pub fn with_capacity(config: MarketConfig, capacity: usize) -> Self {
        let mut prices = Vec::with_capacity(capacity.max(SEED_PRICES));
        prices.extend(std::iter::repeat_n(config.initial_price, SEED_PRICES));
        Self {
            mu: config.mu,
            prices,
            average_demand: 0.0,
        }
    }

    /// Collect every trader's demand for tick `t` and store the mean
    pub fn calculate_demands<R: Rng + ?Sized>(
        &mut self,
        traders: &mut [Trader],
        t: usize,
        rng: &mut R,
    ) -> f64 {
        let total: f64 = traders
            .iter_mut()
            .map(|trader| trader.calculate_demand(&self.prices, t, rng))
            .sum();
        self.average_demand = if traders.is_empty() {
            0.0
        } else {
            total / traders.len() as f64
        };
        self.average_demand
    }

    /// Append `prices[t + 1] = prices[t] + mu * average_demand`
    pub fn update_price(&mut self, t: usize) -> f64 {
        debug_assert_eq!(self.prices.len(), t + 1, "price update out of order");
        let next = self.prices[t] + self.mu * self.average_demand;
        self.prices.push(next);
        next
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Most recent log-price
    pub fn last_price(&self) -> f64 {
        self.prices.last().copied().unwrap_or_default()
    }

    pub fn average_demand(&self) -> f64 {
        self.average_demand
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }
}
