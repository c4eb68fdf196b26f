//! Population Builder
//!
//! Builds the trader network and assigns a heterogeneous trader to every
//! node:
//!
//! 1. Generate the graph for the configured [`Topology`]
//! 2. Fill a bag with `floor(n * percent)` tags per strategy type and draw
//!    one tag per node (shuffle, then pop)
//! 3. Draw the strategy's static parameters
//! 4. Give the slot a long or short lookback and a high or low risk ceiling
//!    depending on how many traders of its type were placed before it

use crate::domain::{
    NodeId, Strategy, StrategyKind, Topology, Trader, TraderNetwork, TrendFollower, ValueInvestor,
};
use crate::error::{ConfigurationError, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Parameters given to every value investor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueInvestorConfig {
    pub phi: f64,
    pub sigma_f: f64,
    pub pstar: f64,
    pub eta: f64,
}

impl Default for ValueInvestorConfig {
    fn default() -> Self {
        Self {
            phi: 1.0,
            sigma_f: 0.681,
            pstar: 0.0,
            eta: 0.991,
        }
    }
}

/// Parameters for trend followers; `chi` is drawn as `|Normal(chi_mean, chi_std)|`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendFollowerConfig {
    pub chi_mean: f64,
    pub chi_std: f64,
    pub sigma_c: f64,
    pub eta: f64,
}

impl Default for TrendFollowerConfig {
    fn default() -> Self {
        Self {
            chi_mean: 1.20,
            chi_std: 0.5,
            sigma_c: 1.724,
            eta: 0.991,
        }
    }
}

/// Population mix and heterogeneity settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub number_of_traders: usize,
    /// Share of value investors (only `floor(n * share)` is used)
    pub percent_value_investor: f64,
    /// Share of trend followers (only `floor(n * share)` is used)
    pub percent_trend_follower: f64,
    /// Share of each type given `high_lookback`
    pub percent_rational: f64,
    /// Share of each type given `high_risk`
    pub percent_risky: f64,
    pub high_lookback: usize,
    pub low_lookback: usize,
    pub high_risk: f64,
    pub low_risk: f64,
    pub value_investor: ValueInvestorConfig,
    pub trend_follower: TrendFollowerConfig,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            number_of_traders: 150,
            percent_value_investor: 0.5,
            percent_trend_follower: 0.5,
            percent_rational: 0.5,
            percent_risky: 0.5,
            high_lookback: 5,
            low_lookback: 1,
            high_risk: 0.50,
            low_risk: 0.10,
            value_investor: ValueInvestorConfig::default(),
            trend_follower: TrendFollowerConfig::default(),
        }
    }
}

impl PopulationConfig {
    /// Number of value investors and trend followers the bag will hold
    pub fn type_counts(&self) -> (usize, usize) {
        let n = self.number_of_traders as f64;
        (
            (n * self.percent_value_investor).floor() as usize,
            (n * self.percent_trend_follower).floor() as usize,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.number_of_traders == 0 {
            return Err(ConfigurationError::invalid(
                "number_of_traders",
                "population must contain at least one trader",
            ));
        }

        check_fraction("percent_value_investor", self.percent_value_investor)?;
        check_fraction("percent_trend_follower", self.percent_trend_follower)?;
        check_fraction("percent_rational", self.percent_rational)?;
        check_fraction("percent_risky", self.percent_risky)?;

        if self.high_lookback == 0 {
            return Err(ConfigurationError::invalid("high_lookback", "must be at least 1"));
        }
        if self.low_lookback == 0 {
            return Err(ConfigurationError::invalid("low_lookback", "must be at least 1"));
        }

        check_non_negative("high_risk", self.high_risk)?;
        check_non_negative("low_risk", self.low_risk)?;

        let vi = &self.value_investor;
        check_finite("value_investor.phi", vi.phi)?;
        check_finite("value_investor.pstar", vi.pstar)?;
        check_non_negative("value_investor.sigma_f", vi.sigma_f)?;
        check_eta("value_investor.eta", vi.eta)?;

        let tf = &self.trend_follower;
        check_finite("trend_follower.chi_mean", tf.chi_mean)?;
        check_non_negative("trend_follower.chi_std", tf.chi_std)?;
        check_non_negative("trend_follower.sigma_c", tf.sigma_c)?;
        check_eta("trend_follower.eta", tf.eta)?;

        let (n_value, n_trend) = self.type_counts();
        if n_value + n_trend < self.number_of_traders {
            return Err(ConfigurationError::PopulationShortfall {
                required: self.number_of_traders,
                available: n_value + n_trend,
            });
        }

        Ok(())
    }
}

fn check_finite(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ConfigurationError::invalid(name, format!("must be finite, got {value}")));
    }
    Ok(())
}

fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    check_finite(name, value)?;
    if value < 0.0 {
        return Err(ConfigurationError::invalid(name, format!("must be >= 0, got {value}")));
    }
    Ok(())
}

fn check_fraction(name: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigurationError::invalid(name, format!("must be in [0, 1], got {value}")));
    }
    Ok(())
}

fn check_eta(name: &'static str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(ConfigurationError::invalid(name, format!("must be in (0, 1), got {value}")));
    }
    Ok(())
}

/// `count / denominator`, or 1.0 when there is nothing to normalize by
///
/// A fraction of 1.0 never falls below a share threshold, so an empty
/// reference group hands out the low settings.
fn running_fraction(count: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 1.0;
    }
    count as f64 / denominator as f64
}

/// Trader network plus one slot per node, slot `i` at index `i`
#[derive(Debug, Clone)]
pub struct Population {
    pub network: TraderNetwork,
    pub traders: Vec<Trader>,
}

/// Per-type running counts used for the heterogeneity thresholds
#[derive(Debug, Default)]
struct PlacementCounter {
    placed_value: usize,
    placed_trend: usize,
}

impl PlacementCounter {
    fn placed(&self, kind: StrategyKind) -> usize {
        match kind {
            StrategyKind::ValueInvestor => self.placed_value,
            StrategyKind::TrendFollower => self.placed_trend,
        }
    }

    fn record(&mut self, kind: StrategyKind) {
        match kind {
            StrategyKind::ValueInvestor => self.placed_value += 1,
            StrategyKind::TrendFollower => self.placed_trend += 1,
        }
    }
}

/// Builds the network and the trader population
pub struct NetworkBuilder {
    topology: Topology,
    config: PopulationConfig,
}

impl NetworkBuilder {
    pub fn new(topology: Topology, config: PopulationConfig) -> Self {
        Self { topology, config }
    }

    /// Build the graph and populate every node
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Population> {
        self.config.validate()?;
        let n = self.config.number_of_traders;

        let network = self.topology.generate(n, rng)?;
        log::info!(
            "Built {} network: {} nodes, {} edges",
            self.topology.name(),
            network.node_count(),
            network.edge_count()
        );

        let traders = self.create_traders(rng)?;
        Ok(Population { network, traders })
    }

    /// Draw a strategy type for each node: shuffle the bag, pop one tag
    fn assign_types<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<StrategyKind>> {
        let n = self.config.number_of_traders;
        let (n_value, n_trend) = self.config.type_counts();

        let mut bag: Vec<StrategyKind> = Vec::with_capacity(n_value + n_trend);
        bag.extend(std::iter::repeat_n(StrategyKind::ValueInvestor, n_value));
        bag.extend(std::iter::repeat_n(StrategyKind::TrendFollower, n_trend));

        let mut kinds = Vec::with_capacity(n);
        for _ in 0..n {
            bag.shuffle(rng);
            let kind = bag.pop().ok_or(ConfigurationError::PopulationShortfall {
                required: n,
                available: n_value + n_trend,
            })?;
            kinds.push(kind);
        }
        Ok(kinds)
    }

    fn create_traders<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Trader>> {
        let cfg = &self.config;
        let (n_value, n_trend) = cfg.type_counts();
        let chi_dist = Normal::new(cfg.trend_follower.chi_mean, cfg.trend_follower.chi_std)
            .map_err(|e| ConfigurationError::invalid("trend_follower.chi_std", e.to_string()))?;

        let kinds = self.assign_types(rng)?;
        let mut counter = PlacementCounter::default();
        let mut traders = Vec::with_capacity(kinds.len());

        for (i, kind) in kinds.into_iter().enumerate() {
            // Both thresholds normalize by the same type's target count
            let target = match kind {
                StrategyKind::ValueInvestor => n_value,
                StrategyKind::TrendFollower => n_trend,
            };
            let placed = counter.placed(kind);

            let fraction = running_fraction(placed, target);

            let lookback_period = if fraction < cfg.percent_rational {
                cfg.high_lookback
            } else {
                cfg.low_lookback
            };
            let max_risk = if fraction < cfg.percent_risky {
                cfg.high_risk
            } else {
                cfg.low_risk
            };

            let strategy = match kind {
                StrategyKind::ValueInvestor => Strategy::ValueInvestor(ValueInvestor {
                    phi: cfg.value_investor.phi,
                    sigma_f: cfg.value_investor.sigma_f,
                    pstar: cfg.value_investor.pstar,
                    eta: cfg.value_investor.eta,
                }),
                StrategyKind::TrendFollower => Strategy::TrendFollower(TrendFollower {
                    chi: chi_dist.sample(rng).abs(),
                    sigma_c: cfg.trend_follower.sigma_c,
                    eta: cfg.trend_follower.eta,
                }),
            };

            counter.record(kind);
            traders.push(Trader::new(NodeId(i), strategy, lookback_period, max_risk));
        }

        log::debug!(
            "Assigned {} value investors, {} trend followers",
            counter.placed_value,
            counter.placed_trend
        );

        Ok(traders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn complete_graph() -> Topology {
        Topology::UniformRandom {
            connection_probability: 1.0,
        }
    }

    fn count_kind(traders: &[Trader], kind: StrategyKind) -> usize {
        traders.iter().filter(|t| t.strategy().kind() == kind).count()
    }

    #[test]
    fn test_population_mix_and_identity() {
        let config = PopulationConfig {
            number_of_traders: 20,
            percent_value_investor: 0.25,
            percent_trend_follower: 0.75,
            ..Default::default()
        };
        let builder = NetworkBuilder::new(complete_graph(), config);
        let population = builder.build(&mut StdRng::seed_from_u64(42)).unwrap();

        assert_eq!(population.traders.len(), 20);
        assert_eq!(population.network.node_count(), 20);
        assert_eq!(count_kind(&population.traders, StrategyKind::ValueInvestor), 5);
        assert_eq!(count_kind(&population.traders, StrategyKind::TrendFollower), 15);
        for (i, trader) in population.traders.iter().enumerate() {
            assert_eq!(trader.node_id(), NodeId(i));
        }
    }

    #[test]
    fn test_shortfall_is_configuration_error() {
        let config = PopulationConfig {
            number_of_traders: 10,
            percent_value_investor: 0.33,
            percent_trend_follower: 0.33,
            ..Default::default()
        };
        let result =
            NetworkBuilder::new(complete_graph(), config).build(&mut StdRng::seed_from_u64(1));
        assert!(matches!(
            result,
            Err(ConfigurationError::PopulationShortfall {
                required: 10,
                available: 6
            })
        ));
    }

    #[test]
    fn test_oversized_mix_leaves_tags_unused() {
        let config = PopulationConfig {
            number_of_traders: 10,
            percent_value_investor: 1.0,
            percent_trend_follower: 1.0,
            ..Default::default()
        };
        let population = NetworkBuilder::new(complete_graph(), config)
            .build(&mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(population.traders.len(), 10);
    }

    #[test]
    fn test_value_investor_parameters_fixed() {
        let config = PopulationConfig {
            number_of_traders: 8,
            percent_value_investor: 1.0,
            percent_trend_follower: 0.0,
            ..Default::default()
        };
        let population = NetworkBuilder::new(complete_graph(), config)
            .build(&mut StdRng::seed_from_u64(4))
            .unwrap();

        for trader in &population.traders {
            match trader.strategy() {
                Strategy::ValueInvestor(vi) => {
                    assert_eq!(vi.phi, 1.0);
                    assert_eq!(vi.sigma_f, 0.681);
                    assert_eq!(vi.pstar, 0.0);
                    assert_eq!(vi.eta, 0.991);
                }
                other => panic!("unexpected strategy {other:?}"),
            }
        }
    }

    #[test]
    fn test_trend_follower_chi_is_non_negative() {
        let config = PopulationConfig {
            number_of_traders: 200,
            percent_value_investor: 0.0,
            percent_trend_follower: 1.0,
            trend_follower: TrendFollowerConfig {
                chi_mean: 0.0,
                chi_std: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let population = NetworkBuilder::new(complete_graph(), config)
            .build(&mut StdRng::seed_from_u64(17))
            .unwrap();

        for trader in &population.traders {
            match trader.strategy() {
                Strategy::TrendFollower(tf) => {
                    assert!(tf.chi >= 0.0);
                    assert_eq!(tf.sigma_c, 1.724);
                }
                other => panic!("unexpected strategy {other:?}"),
            }
        }
    }

    #[test]
    fn test_lookback_and_risk_split_per_type() {
        let config = PopulationConfig {
            number_of_traders: 20,
            percent_value_investor: 0.5,
            percent_trend_follower: 0.5,
            percent_rational: 0.3,
            percent_risky: 0.6,
            high_lookback: 15,
            low_lookback: 1,
            high_risk: 0.2,
            low_risk: 0.01,
            ..Default::default()
        };
        let population = NetworkBuilder::new(complete_graph(), config)
            .build(&mut StdRng::seed_from_u64(5))
            .unwrap();

        for kind in [StrategyKind::ValueInvestor, StrategyKind::TrendFollower] {
            let of_kind: Vec<&Trader> = population
                .traders
                .iter()
                .filter(|t| t.strategy().kind() == kind)
                .collect();
            // fractions 0/10 .. 2/10 are below 0.3
            let rational = of_kind.iter().filter(|t| t.lookback_period() == 15).count();
            // fractions 0/10 .. 5/10 are below 0.6
            let risky = of_kind.iter().filter(|t| t.max_risk() == 0.2).count();
            assert_eq!(rational, 3, "{kind}");
            assert_eq!(risky, 6, "{kind}");
        }
    }

    #[test]
    fn test_risk_threshold_uses_own_type_count() {
        // 4 value investors, 16 trend followers
        let config = PopulationConfig {
            number_of_traders: 20,
            percent_value_investor: 0.2,
            percent_trend_follower: 0.8,
            percent_risky: 0.5,
            high_risk: 0.2,
            low_risk: 0.01,
            ..Default::default()
        };
        let population = NetworkBuilder::new(complete_graph(), config)
            .build(&mut StdRng::seed_from_u64(6))
            .unwrap();

        let risky = |kind| {
            population
                .traders
                .iter()
                .filter(|t| t.strategy().kind() == kind)
                .filter(|t| t.max_risk() == 0.2)
                .count()
        };
        // placed / 4 < 0.5 for placed in {0, 1}
        assert_eq!(risky(StrategyKind::ValueInvestor), 2);
        // placed / 16 < 0.5 for placed in 0..8
        assert_eq!(risky(StrategyKind::TrendFollower), 8);
    }

    #[test]
    fn test_zero_denominator_gives_low_settings() {
        assert_eq!(running_fraction(0, 0), 1.0);
        assert_eq!(running_fraction(1, 4), 0.25);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let zero_lookback = PopulationConfig {
            low_lookback: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero_lookback.validate(),
            Err(ConfigurationError::InvalidParameter { name: "low_lookback", .. })
        ));

        let bad_eta = PopulationConfig {
            value_investor: ValueInvestorConfig {
                eta: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            bad_eta.validate(),
            Err(ConfigurationError::InvalidParameter {
                name: "value_investor.eta",
                ..
            })
        ));

        let empty = PopulationConfig {
            number_of_traders: 0,
            ..Default::default()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_same_seed_same_population() {
        let build = |seed| {
            NetworkBuilder::new(Topology::default(), PopulationConfig::default())
                .build(&mut StdRng::seed_from_u64(seed))
                .unwrap()
        };
        let a = build(99);
        let b = build(99);

        assert_eq!(a.network.edges(), b.network.edges());
        for (x, y) in a.traders.iter().zip(&b.traders) {
            assert_eq!(x.strategy(), y.strategy());
            assert_eq!(x.lookback_period(), y.lookback_period());
            assert_eq!(x.max_risk(), y.max_risk());
        }
    }
}
