//! Run Reports
//!
//! Aggregate statistics and a serializable dump of the final model state.

use crate::domain::statistics;
use crate::domain::{NodeId, Strategy, StrategyKind, Trader, TraderNetwork};
use serde::Serialize;

/// Result of a single tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickResult {
    /// Tick number (the first tick is 2)
    pub tick: usize,
    /// Log-price appended by this tick, `prices[tick + 1]`
    pub price: f64,
    /// Mean demand across all traders
    pub average_demand: f64,
    /// Strategy replacements made during the imitation pass
    pub swaps: usize,
    /// Value investors after the imitation pass
    pub value_investors: usize,
    /// Trend followers after the imitation pass
    pub trend_followers: usize,
}

/// Head count and mean final wealth of one strategy type
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StrategyBreakdown {
    pub count: usize,
    /// `None` when no trader runs this strategy
    pub mean_wealth: Option<f64>,
}

/// Simulation metrics aggregated over the run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationMetrics {
    /// Ticks processed
    pub total_ticks: usize,
    /// Last log-price of the series
    pub final_price: f64,
    /// Annualized volatility of log-returns over the whole series
    pub volatility: f64,
    /// Excess kurtosis of log-returns (`None` for a flat series)
    pub excess_kurtosis: Option<f64>,
    /// Largest peak-to-trough fall of the level price
    pub max_drawdown: f64,
    /// Strategy replacements over the run
    pub total_swaps: usize,
    pub value_investors: StrategyBreakdown,
    pub trend_followers: StrategyBreakdown,
}

impl SimulationMetrics {
    /// Compute metrics from the final price series and population
    pub fn collect(
        log_prices: &[f64],
        traders: &[Trader],
        total_ticks: usize,
        total_swaps: usize,
    ) -> Self {
        let returns = statistics::diff(log_prices);
        let levels: Vec<f64> = log_prices.iter().map(|p| p.exp()).collect();

        Self {
            total_ticks,
            final_price: log_prices.last().copied().unwrap_or_default(),
            volatility: statistics::annualized_volatility(log_prices, log_prices.len()),
            excess_kurtosis: statistics::excess_kurtosis(&returns),
            max_drawdown: statistics::max_drawdown(&levels),
            total_swaps,
            value_investors: breakdown(traders, StrategyKind::ValueInvestor),
            trend_followers: breakdown(traders, StrategyKind::TrendFollower),
        }
    }
}

fn breakdown(traders: &[Trader], kind: StrategyKind) -> StrategyBreakdown {
    let final_wealth: Vec<f64> = traders
        .iter()
        .filter(|t| t.strategy().kind() == kind)
        .map(|t| t.ledger().wealth().last().copied().unwrap_or_default())
        .collect();

    StrategyBreakdown {
        count: final_wealth.len(),
        mean_wealth: statistics::mean(&final_wealth),
    }
}

/// Final state of one trader slot
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub id: NodeId,
    pub strategy: Strategy,
    pub lookback_period: usize,
    pub max_risk: f64,
    pub wealth: Vec<f64>,
    pub performance: Vec<f64>,
    pub demand: Vec<f64>,
}

impl From<&Trader> for NodeReport {
    fn from(trader: &Trader) -> Self {
        let ledger = trader.ledger();
        Self {
            id: trader.node_id(),
            strategy: *trader.strategy(),
            lookback_period: trader.lookback_period(),
            max_risk: trader.max_risk(),
            wealth: ledger.wealth().to_vec(),
            performance: ledger.performance().to_vec(),
            demand: ledger.demand().to_vec(),
        }
    }
}

/// Everything a caller needs to analyse or persist a run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub prices: Vec<f64>,
    pub nodes: Vec<NodeReport>,
    /// Undirected edges as `(lower id, higher id)`
    pub edges: Vec<(usize, usize)>,
    pub metrics: SimulationMetrics,
}

impl SimulationReport {
    pub fn new(
        log_prices: &[f64],
        traders: &[Trader],
        network: &TraderNetwork,
        metrics: SimulationMetrics,
    ) -> Self {
        Self {
            prices: log_prices.to_vec(),
            nodes: traders.iter().map(NodeReport::from).collect(),
            edges: network.edges(),
            metrics,
        }
    }
}
