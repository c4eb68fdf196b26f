//! Simulation Runner
//!
//! The discrete-time loop that drives traders, imitation and the market.
//!
//! Tick `t` runs four phases in a fixed order:
//!
//! 1. Every trader settles `performance[t]` and `wealth[t]`
//! 2. One imitation pass over the network
//! 3. Every trader submits `demand[t]`
//! 4. The market appends `prices[t + 1]`
//!
//! Ticks run from 2 through `time_steps - 2`, leaving exactly `time_steps`
//! log-prices and `time_steps - 1` entries in every ledger history. A tick at
//! `time_steps - 1` is deliberately not run, since it would append a
//! `time_steps + 1`-th price.

use super::config::SimulationConfig;
use super::report::{SimulationMetrics, SimulationReport, TickResult};
use crate::application::imitation::update_strategies;
use crate::application::market::Market;
use crate::application::population::NetworkBuilder;
use crate::domain::{StrategyKind, Trader, TraderNetwork, WARM_UP_TICKS};
use crate::error::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;

const PROGRESS_INTERVAL: usize = 100;

/// One seeded run of the networked market
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    network: TraderNetwork,
    traders: Vec<Trader>,
    market: Market,
    rng: StdRng,
    tick: usize,
    total_swaps: usize,
}

impl Simulation {
    /// Validate the configuration, build the population and seed the market
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let builder = NetworkBuilder::new(config.topology.clone(), config.population.clone());
        let population = builder.build(&mut rng)?;
        let market = Market::with_capacity(config.market, config.time_steps);

        log::info!(
            "Simulation ready: {} traders, {} ticks, seed {:?}",
            population.traders.len(),
            config.num_ticks(),
            config.seed
        );

        Ok(Self {
            config,
            network: population.network,
            traders: population.traders,
            market,
            rng,
            tick: WARM_UP_TICKS,
            total_swaps: 0,
        })
    }

    /// Whether every tick of the horizon has run
    pub fn is_finished(&self) -> bool {
        self.tick + 1 >= self.config.time_steps
    }

    /// Run a single tick, or `None` once the horizon is reached
    pub fn step(&mut self) -> Option<TickResult> {
        if self.is_finished() {
            return None;
        }
        let t = self.tick;

        for trader in &mut self.traders {
            trader.update_performance(self.market.prices(), t);
            trader.update_wealth(t);
        }

        let swaps = update_strategies(&self.network, &mut self.traders, t, self.config.imitation);
        self.total_swaps += swaps.len();

        let average_demand = self.market.calculate_demands(&mut self.traders, t, &mut self.rng);
        let price = self.market.update_price(t);

        let (value_investors, trend_followers) = self.strategy_counts();
        let result = TickResult {
            tick: t,
            price,
            average_demand,
            swaps: swaps.len(),
            value_investors,
            trend_followers,
        };
        log::trace!("{:?}", result);

        self.tick += 1;

        if self.config.verbose && self.tick % PROGRESS_INTERVAL == 0 {
            log::info!(
                "Tick {}: price={:.4}, demand={:.4}, value={}, trend={}",
                t,
                price,
                average_demand,
                value_investors,
                trend_followers
            );
        }

        Some(result)
    }

    /// Run the remaining ticks and summarise the run
    pub fn run(&mut self) -> SimulationMetrics {
        while self.step().is_some() {}

        let metrics = self.metrics();
        log::info!(
            "Simulation finished: {} ticks, final price {:.4}, {} swaps",
            metrics.total_ticks,
            metrics.final_price,
            metrics.total_swaps
        );
        metrics
    }

    /// Metrics for the ticks run so far
    pub fn metrics(&self) -> SimulationMetrics {
        SimulationMetrics::collect(
            self.market.prices(),
            &self.traders,
            self.ticks_run(),
            self.total_swaps,
        )
    }

    /// Serializable snapshot of prices, traders, edges and metrics
    pub fn report(&self) -> SimulationReport {
        SimulationReport::new(self.market.prices(), &self.traders, &self.network, self.metrics())
    }

    /// Current value investor and trend follower counts
    pub fn strategy_counts(&self) -> (usize, usize) {
        let value = self
            .traders
            .iter()
            .filter(|t| t.strategy().kind() == StrategyKind::ValueInvestor)
            .count();
        (value, self.traders.len() - value)
    }

    /// Log-price series so far
    pub fn prices(&self) -> &[f64] {
        self.market.prices()
    }

    pub fn traders(&self) -> &[Trader] {
        &self.traders
    }

    pub fn network(&self) -> &TraderNetwork {
        &self.network
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    /// Next tick to run
    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn ticks_run(&self) -> usize {
        self.tick - WARM_UP_TICKS
    }
}
