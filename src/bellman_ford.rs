//! Per-source Bellman-Ford relaxation in log space.
//!
//! A full relaxation run from one source settles shortest-path weight
//! estimates under additive -ln(rate) weights. Any edge that can still
//! improve an estimate after |tokens| - 1 passes certifies a reachable
//! negative-weight cycle, i.e. an arbitrage loop.

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::graph::Network;

/// Working tables for one source token's relaxation run. Private to
/// that run; the [`Network`] itself is never touched.
pub struct RelaxationTables {
    pub source: NodeIndex,
    /// Tentative shortest-path weight per node index. `+inf` means
    /// unreached.
    pub dist: Vec<f64>,
    /// The edge that produced each node's current best estimate.
    pub pred: Vec<Option<EdgeIndex>>,
}

/// Relax all edges up to `|tokens| - 1` times from `source`, stopping
/// early once a full pass makes no update.
///
/// Edges are swept in the network's stable edge-list order each pass.
/// Comparisons are strict `<`, so exactly-break-even loops never
/// trigger an update.
pub fn relax_from(network: &Network, source: NodeIndex) -> RelaxationTables {
    let n = network.token_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut pred: Vec<Option<EdgeIndex>> = vec![None; n];
    dist[source.index()] = 0.0;

    for pass in 0..n.saturating_sub(1) {
        let mut updated = false;

        for edge in network.edge_references() {
            let u = edge.source().index();
            let v = edge.target().index();
            let candidate = dist[u] + edge.weight().weight;

            if candidate < dist[v] {
                dist[v] = candidate;
                pred[v] = Some(edge.id());
                updated = true;
            }
        }

        if !updated {
            // Fixed point: no negative cycle reachable from this
            // source under current estimates.
            debug!(source = source.index(), pass, "relaxation reached fixed point");
            break;
        }
    }

    RelaxationTables { source, dist, pred }
}

/// One additional relaxation pass over all edges. Every edge that still
/// permits an improvement lies on or downstream of a negative cycle
/// reachable from the tables' source.
pub fn certifying_edges(network: &Network, tables: &RelaxationTables) -> Vec<EdgeIndex> {
    let mut certifying = Vec::new();

    for edge in network.edge_references() {
        let u = edge.source().index();
        let v = edge.target().index();

        if tables.dist[u] + edge.weight().weight < tables.dist[v] {
            certifying.push(edge.id());
        }
    }

    if !certifying.is_empty() {
        debug!(
            source = tables.source.index(),
            count = certifying.len(),
            "edges still relaxable after full pass"
        );
    }

    certifying
}
