//! Trader Network
//!
//! Undirected social graph over trader slots. Node `i` of the graph is slot
//! `i`, so a [`NodeId`] indexes both. Topology is fixed once built.

use crate::error::{ConfigurationError, Result};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Identifier of a graph node and of the trader slot assigned to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Graph family used to connect traders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topology {
    /// Barabási-Albert: each new node links to `new_node_edges` existing nodes
    /// chosen proportionally to degree
    PreferentialAttachment { new_node_edges: usize },
    /// Erdős-Rényi: every pair linked independently
    UniformRandom { connection_probability: f64 },
    /// Watts-Strogatz: ring lattice with random rewiring
    SmallWorld {
        nearest_neighbors: usize,
        rewire_probability: f64,
    },
}

impl Default for Topology {
    fn default() -> Self {
        Self::PreferentialAttachment { new_node_edges: 5 }
    }
}

impl Topology {
    /// Build a topology from its name and the optional parameters
    ///
    /// Small-world reuses `new_node_edges` as the lattice degree and
    /// `connection_probability` as the rewiring probability.
    pub fn from_kind(
        kind: &str,
        new_node_edges: Option<usize>,
        connection_probability: Option<f64>,
    ) -> Result<Self> {
        let edges = |topology| {
            new_node_edges.ok_or(ConfigurationError::MissingTopologyParameter {
                topology,
                parameter: "new_node_edges",
            })
        };
        let probability = |topology| {
            connection_probability.ok_or(ConfigurationError::MissingTopologyParameter {
                topology,
                parameter: "connection_probability",
            })
        };

        match kind.to_ascii_lowercase().as_str() {
            "barabasi" | "barabasi_albert" | "preferential_attachment" => {
                Ok(Self::PreferentialAttachment {
                    new_node_edges: edges("preferential_attachment")?,
                })
            }
            "random" | "erdos_renyi" | "uniform_random" => Ok(Self::UniformRandom {
                connection_probability: probability("uniform_random")?,
            }),
            "small_world" | "watts_strogatz" => Ok(Self::SmallWorld {
                nearest_neighbors: edges("small_world")?,
                rewire_probability: probability("small_world")?,
            }),
            _ => Err(ConfigurationError::UnknownTopology(kind.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PreferentialAttachment { .. } => "preferential_attachment",
            Self::UniformRandom { .. } => "uniform_random",
            Self::SmallWorld { .. } => "small_world",
        }
    }

    /// Check the topology parameters against a population of `n` nodes
    pub fn validate(&self, n: usize) -> Result<()> {
        match *self {
            Self::PreferentialAttachment { new_node_edges: m } => {
                if m < 1 || m >= n {
                    return Err(ConfigurationError::InvalidTopology(format!(
                        "preferential attachment needs 1 <= new_node_edges < {n}, got {m}"
                    )));
                }
            }
            Self::UniformRandom {
                connection_probability: p,
            } => check_probability(p)?,
            Self::SmallWorld {
                nearest_neighbors: k,
                rewire_probability: p,
            } => {
                if k < 2 || k >= n {
                    return Err(ConfigurationError::InvalidTopology(format!(
                        "small world needs 2 <= nearest_neighbors < {n}, got {k}"
                    )));
                }
                check_probability(p)?;
            }
        }
        Ok(())
    }

    /// Generate a graph over `n` nodes
    pub fn generate<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<TraderNetwork> {
        self.validate(n)?;
        let network = match *self {
            Self::PreferentialAttachment { new_node_edges } => {
                preferential_attachment(n, new_node_edges, rng)
            }
            Self::UniformRandom {
                connection_probability,
            } => uniform_random(n, connection_probability, rng),
            Self::SmallWorld {
                nearest_neighbors,
                rewire_probability,
            } => small_world(n, nearest_neighbors, rewire_probability, rng),
        };
        Ok(network)
    }
}

fn check_probability(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ConfigurationError::InvalidTopology(format!(
            "probability must be in [0, 1], got {p}"
        )));
    }
    Ok(())
}

/// Immutable undirected graph of trader slots
#[derive(Debug, Clone)]
pub struct TraderNetwork {
    graph: UnGraph<NodeId, ()>,
}

impl TraderNetwork {
    /// Graph with `n` nodes and no edges
    pub fn empty(n: usize) -> Self {
        let mut graph = UnGraph::with_capacity(n, 0);
        for i in 0..n {
            graph.add_node(NodeId(i));
        }
        Self { graph }
    }

    /// Graph with `n` nodes and the given edges
    ///
    /// Self-loops and duplicate edges are rejected.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut network = Self::empty(n);
        for &(a, b) in edges {
            if a >= n || b >= n {
                return Err(ConfigurationError::InvalidTopology(format!(
                    "edge ({a}, {b}) references a node outside 0..{n}"
                )));
            }
            if a == b || network.has_edge(a, b) {
                return Err(ConfigurationError::InvalidTopology(format!(
                    "edge ({a}, {b}) is a self-loop or duplicate"
                )));
            }
            network.add_edge(a, b);
        }
        Ok(network)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Neighbors of `node` in ascending id order
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        let mut neighbors: Vec<NodeId> = self
            .graph
            .neighbors(NodeIndex::new(node.0))
            .map(|idx| self.graph[idx])
            .collect();
        neighbors.sort_unstable();
        neighbors
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.graph.neighbors(NodeIndex::new(node.0)).count()
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.graph.find_edge(NodeIndex::new(a), NodeIndex::new(b)).is_some()
    }

    /// All edges as `(low, high)` id pairs, sorted
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = self
            .graph
            .edge_references()
            .map(|e| {
                let (a, b) = (self.graph[e.source()].0, self.graph[e.target()].0);
                (a.min(b), a.max(b))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    pub fn graph(&self) -> &UnGraph<NodeId, ()> {
        &self.graph
    }

    fn add_edge(&mut self, a: usize, b: usize) {
        self.graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
    }

    fn remove_edge(&mut self, a: usize, b: usize) {
        if let Some(edge) = self.graph.find_edge(NodeIndex::new(a), NodeIndex::new(b)) {
            self.graph.remove_edge(edge);
        }
    }
}

/// Barabási-Albert growth from a star on `m + 1` nodes
fn preferential_attachment<R: Rng + ?Sized>(n: usize, m: usize, rng: &mut R) -> TraderNetwork {
    let mut network = TraderNetwork::empty(n);

    // Star: hub 0 linked to 1..=m
    let mut repeated_nodes: Vec<usize> = Vec::with_capacity(2 * m * n);
    for leaf in 1..=m {
        network.add_edge(0, leaf);
        repeated_nodes.push(0);
        repeated_nodes.push(leaf);
    }

    for source in (m + 1)..n {
        let mut targets: Vec<usize> = Vec::with_capacity(m);
        while targets.len() < m {
            if let Some(&candidate) = repeated_nodes.choose(rng) {
                if !targets.contains(&candidate) {
                    targets.push(candidate);
                }
            }
        }
        for &target in &targets {
            network.add_edge(source, target);
        }
        repeated_nodes.extend_from_slice(&targets);
        repeated_nodes.extend(std::iter::repeat_n(source, m));
    }

    network
}

/// Erdős-Rényi `G(n, p)`
fn uniform_random<R: Rng + ?Sized>(n: usize, p: f64, rng: &mut R) -> TraderNetwork {
    let mut network = TraderNetwork::empty(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.r#gen::<f64>() < p {
                network.add_edge(i, j);
            }
        }
    }
    network
}

/// Watts-Strogatz ring lattice of degree `k`, each lattice edge rewired with probability `p`
fn small_world<R: Rng + ?Sized>(n: usize, k: usize, p: f64, rng: &mut R) -> TraderNetwork {
    let mut network = TraderNetwork::empty(n);
    let half_k = k / 2;

    for offset in 1..=half_k {
        for u in 0..n {
            network.add_edge(u, (u + offset) % n);
        }
    }

    for offset in 1..=half_k {
        for u in 0..n {
            let v = (u + offset) % n;
            if rng.r#gen::<f64>() >= p {
                continue;
            }
            // Already linked to everyone: nowhere to rewire to
            if network.degree(NodeId(u)) >= n - 1 {
                continue;
            }
            let mut w = rng.gen_range(0..n);
            while w == u || network.has_edge(u, w) {
                w = rng.gen_range(0..n);
            }
            network.remove_edge(u, v);
            network.add_edge(u, w);
        }
    }

    network
}
