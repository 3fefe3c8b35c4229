//! Graph model: tokens as vertices, fee-adjusted exchange rates as
//! directed edges carrying -ln(rate) weights.
//!
//! The log transform makes multiplicative rate products additive, so a
//! rate product > 1 (an arbitrage loop) shows up as a negative-weight
//! cycle under shortest-path search.

use petgraph::graph::{DiGraph, EdgeIndex, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::debug;

use crate::error::InvalidEdgeError;

/// Edge payload: the raw net rate (fees already applied) and its
/// log-space weight. Both are fixed at construction and must stay
/// consistent for the lifetime of the edge.
#[derive(Debug, Clone, Copy)]
pub struct EdgeData {
    /// Units of `to` obtainable per one unit of `from`, after fees.
    pub rate: f64,
    /// `-ln(rate)`. Detection device only; reported profit is always
    /// recomputed from `rate`.
    pub weight: f64,
}

/// The rate graph for one detection pass. Immutable once built.
///
/// Parallel edges between the same ordered pair are kept as-is
/// (distinct pools / fee tiers produce distinct edges); `DiGraph`
/// stores them natively and [`Network::edges_from`] is the adjacency
/// index reconstruction walks.
#[derive(Debug)]
pub struct Network {
    graph: DiGraph<String, EdgeData>,
    token_to_node: HashMap<String, NodeIndex>,
}

impl Network {
    /// Build a network from a token set and `(from, to, rate)` triples.
    ///
    /// Fails with [`InvalidEdgeError`] on a self-loop, a non-positive
    /// or non-finite rate, or an endpoint not in the declared token
    /// set. Bad edges are never silently dropped.
    pub fn new<S: AsRef<str>>(
        tokens: &[S],
        edges: &[(S, S, f64)],
    ) -> Result<Self, InvalidEdgeError> {
        let mut graph = DiGraph::new();
        let mut token_to_node: HashMap<String, NodeIndex> = HashMap::new();

        for token in tokens {
            let token = token.as_ref();
            if !token_to_node.contains_key(token) {
                let node = graph.add_node(token.to_owned());
                token_to_node.insert(token.to_owned(), node);
            }
        }

        for (from, to, rate) in edges {
            let (from, to, rate) = (from.as_ref(), to.as_ref(), *rate);

            if from == to {
                return Err(InvalidEdgeError::SelfLoop {
                    token: from.to_owned(),
                });
            }
            if rate <= 0.0 || !rate.is_finite() {
                return Err(InvalidEdgeError::InvalidRate {
                    from: from.to_owned(),
                    to: to.to_owned(),
                    rate,
                });
            }

            let source = *token_to_node.get(from).ok_or_else(|| {
                InvalidEdgeError::UnknownToken {
                    token: from.to_owned(),
                }
            })?;
            let target = *token_to_node.get(to).ok_or_else(|| {
                InvalidEdgeError::UnknownToken {
                    token: to.to_owned(),
                }
            })?;

            graph.add_edge(
                source,
                target,
                EdgeData {
                    rate,
                    weight: -rate.ln(),
                },
            );
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "network built"
        );

        Ok(Self {
            graph,
            token_to_node,
        })
    }

    pub fn token_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Stable integer index for a token identifier.
    pub fn node(&self, token: &str) -> Option<NodeIndex> {
        self.token_to_node.get(token).copied()
    }

    /// Token identifier for a node index.
    pub fn token(&self, node: NodeIndex) -> &str {
        &self.graph[node]
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    /// Full edge list in insertion order. Relaxation sweeps this in a
    /// fixed, stable order each pass.
    pub fn edge_references(
        &self,
    ) -> impl Iterator<Item = EdgeReference<'_, EdgeData>> {
        self.graph.edge_references()
    }

    /// Adjacency index: all edges originating at `node`, parallel
    /// edges included.
    pub fn edges_from(
        &self,
        node: NodeIndex,
    ) -> impl Iterator<Item = EdgeReference<'_, EdgeData>> {
        self.graph.edges(node)
    }

    pub fn edge_endpoints(&self, edge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(edge)
    }

    /// Best (maximum) rate among parallel edges `from -> to`, the
    /// optimistic-profit policy for reconstruction.
    pub fn best_rate(&self, from: NodeIndex, to: NodeIndex) -> Option<f64> {
        self.graph
            .edges(from)
            .filter(|edge| edge.target() == to)
            .map(|edge| edge.weight().rate)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_graph_with_log_weights() {
        let network = Network::new(
            &["WETH", "USDC"],
            &[("WETH", "USDC", 2600.0), ("USDC", "WETH", 0.00038)],
        )
        .unwrap();

        assert_eq!(network.token_count(), 2);
        assert_eq!(network.edge_count(), 2);

        let weth = network.node("WETH").unwrap();
        let usdc = network.node("USDC").unwrap();
        let edge = network
            .edges_from(weth)
            .find(|e| e.target() == usdc)
            .unwrap();
        assert!((edge.weight().weight - (-(2600.0_f64).ln())).abs() < 1e-12);
        assert_eq!(edge.weight().rate, 2600.0);
    }

    #[test]
    fn rejects_self_loop() {
        let err = Network::new(&["WETH", "USDC"], &[("WETH", "WETH", 1.0)]).unwrap_err();
        assert_eq!(
            err,
            InvalidEdgeError::SelfLoop {
                token: "WETH".into()
            }
        );
    }

    #[test]
    fn rejects_non_positive_and_non_finite_rates() {
        for bad in [0.0, -1.5, f64::NAN, f64::INFINITY] {
            let err = Network::new(&["A", "B"], &[("A", "B", bad)]).unwrap_err();
            assert!(matches!(err, InvalidEdgeError::InvalidRate { .. }));
        }
    }

    #[test]
    fn rejects_unknown_endpoint() {
        let err = Network::new(&["A", "B"], &[("A", "C", 1.0)]).unwrap_err();
        assert_eq!(err, InvalidEdgeError::UnknownToken { token: "C".into() });
    }

    #[test]
    fn keeps_parallel_edges_and_picks_max_rate() {
        // Two pools for the same pair, different fee tiers.
        let network = Network::new(
            &["A", "B"],
            &[("A", "B", 1.1), ("A", "B", 1.3), ("A", "B", 1.2)],
        )
        .unwrap();

        assert_eq!(network.edge_count(), 3);

        let a = network.node("A").unwrap();
        let b = network.node("B").unwrap();
        assert_eq!(network.edges_from(a).count(), 3);
        assert_eq!(network.best_rate(a, b), Some(1.3));
        assert_eq!(network.best_rate(b, a), None);
    }

    #[test]
    fn collapses_duplicate_token_declarations() {
        let network = Network::new(&["A", "B", "A"], &[("A", "B", 1.0)]).unwrap();
        assert_eq!(network.token_count(), 2);
    }
}
