//! Strategy Imitation
//!
//! Once per tick every trader compares its trailing performance with its
//! neighbors' and copies the strategy of the best one if that neighbor did
//! strictly better.
//!
//! # Rules
//!
//! - Performance is averaged over the *evaluating* trader's lookback, for
//!   itself and for every neighbor alike
//! - Ties between neighbors go to the lowest node id; a tie with the
//!   evaluating trader means no change
//! - Isolated traders never change
//! - Only the strategy record moves. Node id, histories, lookback period and
//!   risk ceiling stay with the slot
//!
//! # Visibility
//!
//! [`ImitationMode::Snapshot`] decides every swap from the start-of-pass
//! state and applies them afterwards, so the result does not depend on visit
//! order. [`ImitationMode::Sequential`] applies each swap as soon as it is
//! decided while visiting slots in ascending id order, so a later trader may
//! copy a strategy its neighbor adopted earlier in the same pass.

use crate::domain::{NodeId, Strategy, Trader, TraderNetwork};
use serde::{Deserialize, Serialize};

/// When a decided swap becomes visible to the rest of the pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImitationMode {
    /// Decide all swaps from one snapshot, then apply them together
    #[default]
    Snapshot,
    /// Apply each swap immediately, visiting slots in ascending id order
    Sequential,
}

/// One strategy replacement performed during an imitation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategySwap {
    /// Slot whose strategy was replaced
    pub node: NodeId,
    /// Neighbor the strategy was copied from
    pub source: NodeId,
    /// Strategy the slot ran before the swap
    pub from: Strategy,
    /// Strategy the slot runs after the swap
    pub to: Strategy,
}

/// Decide whether `trader` should copy a neighbor, reading the current state
fn best_neighbor(network: &TraderNetwork, traders: &[Trader], trader: &Trader) -> Option<NodeId> {
    let lookback = trader.lookback_period();
    let own = trader.average_performance(lookback);

    let mut best: Option<(NodeId, f64)> = None;
    // Neighbors arrive in ascending id order, so strict `>` keeps the lowest id on ties
    for neighbor in network.neighbors(trader.node_id()) {
        let perf = traders[neighbor.index()].average_performance(lookback);
        if best.is_none_or(|(_, best_perf)| perf > best_perf) {
            best = Some((neighbor, perf));
        }
    }

    match best {
        Some((neighbor, best_perf)) if own < best_perf => Some(neighbor),
        _ => None,
    }
}

/// Run one imitation pass over all slots
///
/// Returns the swaps in visit order.
pub fn update_strategies(
    network: &TraderNetwork,
    traders: &mut [Trader],
    tick: usize,
    mode: ImitationMode,
) -> Vec<StrategySwap> {
    let swaps = match mode {
        ImitationMode::Snapshot => snapshot_pass(network, traders),
        ImitationMode::Sequential => sequential_pass(network, traders),
    };

    for swap in &swaps {
        log::trace!(
            "t={}: node {} adopts {} from node {}",
            tick,
            swap.node,
            swap.to.kind(),
            swap.source
        );
    }
    if !swaps.is_empty() {
        log::debug!("t={}: {} strategy swaps", tick, swaps.len());
    }

    swaps
}

fn snapshot_pass(network: &TraderNetwork, traders: &mut [Trader]) -> Vec<StrategySwap> {
    // Decide everything against the untouched state first
    let snapshot: &[Trader] = traders;
    let planned: Vec<(NodeId, NodeId, Strategy)> = snapshot
        .iter()
        .filter_map(|trader| {
            best_neighbor(network, snapshot, trader)
                .map(|source| (trader.node_id(), source, *snapshot[source.index()].strategy()))
        })
        .collect();

    planned
        .into_iter()
        .map(|(node, source, to)| {
            let from = traders[node.index()].adopt_strategy(to);
            StrategySwap {
                node,
                source,
                from,
                to,
            }
        })
        .collect()
}

fn sequential_pass(network: &TraderNetwork, traders: &mut [Trader]) -> Vec<StrategySwap> {
    let mut swaps = Vec::new();
    for idx in 0..traders.len() {
        let Some(source) = best_neighbor(network, traders, &traders[idx]) else {
            continue;
        };
        let to = *traders[source.index()].strategy();
        let from = traders[idx].adopt_strategy(to);
        swaps.push(StrategySwap {
            node: traders[idx].node_id(),
            source,
            from,
            to,
        });
    }
    swaps
}
