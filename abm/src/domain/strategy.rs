//! Trading Strategies
//!
//! The two demand models a trader slot can run:
//!
//! - **ValueInvestor**: mean-reverts toward a fundamental log-price `pstar`
//! - **TrendFollower**: bets on the last price change continuing, but stays
//!   flat while recent volatility exceeds the slot's risk ceiling
//!
//! A strategy record is a plain value. Imitation copies the whole record
//! (variant plus static parameters) from one slot to another.

use crate::domain::statistics;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Number of most recent log-prices used for the trend-follower volatility check
pub const VOLATILITY_WINDOW: usize = 30;

/// Inputs available to a demand rule at tick `t`
#[derive(Debug, Clone, Copy)]
pub struct DemandContext<'a> {
    /// Full log-price series, `prices[t]` is the latest
    pub prices: &'a [f64],
    /// Current tick
    pub tick: usize,
    /// Annualized volatility ceiling of the slot running the rule
    pub max_risk: f64,
}

impl DemandContext<'_> {
    fn price(&self) -> f64 {
        self.prices[self.tick]
    }

    fn last_change(&self) -> f64 {
        self.prices[self.tick] - self.prices[self.tick - 1]
    }
}

/// A demand model: how much a trader wants to hold this tick
pub trait DemandRule {
    /// Signed demand for tick `ctx.tick`
    fn demand<R: Rng + ?Sized>(&self, ctx: &DemandContext<'_>, rng: &mut R) -> f64;
}

/// Fundamentalist: buys below `pstar`, sells above it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueInvestor {
    /// Reaction strength to mispricing
    pub phi: f64,
    /// Noise amplitude
    pub sigma_f: f64,
    /// Fundamental log-price
    pub pstar: f64,
    /// Wealth smoothing factor
    pub eta: f64,
}

impl DemandRule for ValueInvestor {
    fn demand<R: Rng + ?Sized>(&self, ctx: &DemandContext<'_>, rng: &mut R) -> f64 {
        let noise: f64 = rng.sample(StandardNormal);
        self.phi * (self.pstar - ctx.price()) + self.sigma_f * noise
    }
}

/// Chartist: extrapolates the most recent price change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFollower {
    /// Reaction strength to the last price change
    pub chi: f64,
    /// Noise amplitude
    pub sigma_c: f64,
    /// Wealth smoothing factor
    pub eta: f64,
}

impl DemandRule for TrendFollower {
    fn demand<R: Rng + ?Sized>(&self, ctx: &DemandContext<'_>, rng: &mut R) -> f64 {
        let window = &ctx.prices[..=ctx.tick];
        let vol = statistics::annualized_volatility(window, VOLATILITY_WINDOW);
        // NaN never passes, so a broken series keeps the trader out
        if !(vol <= ctx.max_risk) {
            return 0.0;
        }
        let noise: f64 = rng.sample(StandardNormal);
        self.chi * ctx.last_change() + self.sigma_c * noise
    }
}

/// Strategy discriminant, for counting and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    ValueInvestor,
    TrendFollower,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValueInvestor => "ValueInvestor",
            Self::TrendFollower => "TrendFollower",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The replaceable strategy record held by a trader slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Strategy {
    ValueInvestor(ValueInvestor),
    TrendFollower(TrendFollower),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::ValueInvestor(_) => StrategyKind::ValueInvestor,
            Self::TrendFollower(_) => StrategyKind::TrendFollower,
        }
    }

    /// Wealth smoothing factor carried by this strategy
    pub fn eta(&self) -> f64 {
        match self {
            Self::ValueInvestor(s) => s.eta,
            Self::TrendFollower(s) => s.eta,
        }
    }
}

impl DemandRule for Strategy {
    fn demand<R: Rng + ?Sized>(&self, ctx: &DemandContext<'_>, rng: &mut R) -> f64 {
        match self {
            Self::ValueInvestor(s) => s.demand(ctx, rng),
            Self::TrendFollower(s) => s.demand(ctx, rng),
        }
    }
}

impl From<ValueInvestor> for Strategy {
    fn from(s: ValueInvestor) -> Self {
        Self::ValueInvestor(s)
    }
}

impl From<TrendFollower> for Strategy {
    fn from(s: TrendFollower) -> Self {
        Self::TrendFollower(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn value_investor(sigma_f: f64) -> ValueInvestor {
        ValueInvestor {
            phi: 1.0,
            sigma_f,
            pstar: 0.0,
            eta: 0.991,
        }
    }

    fn trend_follower(sigma_c: f64) -> TrendFollower {
        TrendFollower {
            chi: 1.2,
            sigma_c,
            eta: 0.991,
        }
    }

    #[test]
    fn test_value_investor_reverts_to_fundamental() {
        let mut rng = StdRng::seed_from_u64(1);
        let prices = [0.0, 0.0, 0.4];
        let ctx = DemandContext {
            prices: &prices,
            tick: 2,
            max_risk: 0.0,
        };

        let demand = value_investor(0.0).demand(&ctx, &mut rng);
        assert_relative_eq!(demand, -0.4);

        let below = [0.0, 0.0, -0.25];
        let ctx = DemandContext {
            prices: &below,
            ..ctx
        };
        assert_relative_eq!(value_investor(0.0).demand(&ctx, &mut rng), 0.25);
    }

    #[test]
    fn test_trend_follower_follows_last_change() {
        let mut rng = StdRng::seed_from_u64(1);
        let prices = [0.0, 0.01, 0.02];
        let ctx = DemandContext {
            prices: &prices,
            tick: 2,
            max_risk: f64::INFINITY,
        };

        let demand = trend_follower(0.0).demand(&ctx, &mut rng);
        assert_relative_eq!(demand, 1.2 * 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_trend_follower_stays_out_above_risk_ceiling() {
        let mut rng = StdRng::seed_from_u64(1);
        let prices = [0.0, 0.05, -0.05, 0.1];
        let ctx = DemandContext {
            prices: &prices,
            tick: 3,
            max_risk: 0.1,
        };

        // Noise would make a participating demand non-zero
        assert_eq!(trend_follower(1.724).demand(&ctx, &mut rng), 0.0);
    }

    #[test]
    fn test_trend_follower_only_sees_prices_up_to_tick() {
        let mut rng = StdRng::seed_from_u64(1);
        // Volatile tail beyond the current tick must be ignored
        let prices = [0.0, 0.0, 0.0, 5.0, -5.0];
        let ctx = DemandContext {
            prices: &prices,
            tick: 2,
            max_risk: 0.0,
        };
        assert_relative_eq!(trend_follower(0.0).demand(&ctx, &mut rng), 0.0);

        let strict = DemandContext { tick: 4, ..ctx };
        assert_eq!(trend_follower(1.0).demand(&strict, &mut rng), 0.0);
    }

    #[test]
    fn test_strategy_dispatch_and_eta() {
        let vi: Strategy = value_investor(0.0).into();
        let tf: Strategy = trend_follower(0.0).into();

        assert_eq!(vi.kind(), StrategyKind::ValueInvestor);
        assert_eq!(tf.kind(), StrategyKind::TrendFollower);
        assert_eq!(vi.eta(), 0.991);
        assert_eq!(StrategyKind::TrendFollower.to_string(), "TrendFollower");
    }

    #[test]
    fn test_strategy_serializes_with_type_tag() {
        let json = serde_json::to_value(Strategy::from(trend_follower(1.724))).unwrap();
        assert_eq!(json["type"], "trend_follower");
        assert_eq!(json["sigma_c"], 1.724);
    }
}
