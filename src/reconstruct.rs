//! Cycle recovery from predecessor links, plus real-rate scoring.
//!
//! Detection happens in log space, but the reported profit never does:
//! once a loop's membership is known, its product is recomputed from
//! the raw rates so the user-facing number carries no log/exp round
//! trip error.

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bellman_ford::RelaxationTables;
use crate::graph::Network;

/// A profitable trading loop.
///
/// `path` is closed: it starts and ends at `start_token`, which is the
/// lexicographically smallest token in the loop (the canonical
/// rotation, so the same loop found from different sources compares
/// equal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageCycle {
    pub start_token: String,
    pub path: Vec<String>,
    /// Product of raw rates around the loop. Always > 1.
    pub product: f64,
    /// `(product - 1) * 100`.
    pub profit_pct: f64,
}

impl ArbitrageCycle {
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn format_path(&self) -> String {
        self.path.join(" -> ")
    }
}

/// Walk predecessor links backward from the certifying edge's tail
/// until a node repeats, then return the loop in forward trade order.
///
/// The walk is bounded by |tokens| steps. A chain that runs off the end
/// (a `None` predecessor) or exceeds the bound does not describe a
/// usable cycle; that certifying edge is skipped, never an error.
pub fn recover_cycle(
    network: &Network,
    tables: &RelaxationTables,
    certifying: EdgeIndex,
) -> Option<Vec<NodeIndex>> {
    let (tail, _) = network.edge_endpoints(certifying)?;
    let bound = network.token_count();

    let mut walked: Vec<NodeIndex> = Vec::new();
    let mut current = tail;

    loop {
        if let Some(pos) = walked.iter().position(|&node| node == current) {
            // Closed. walked[pos..] is the loop in backward order.
            let mut cycle: Vec<NodeIndex> = walked[pos..].to_vec();
            cycle.reverse();
            return Some(cycle);
        }
        if walked.len() > bound {
            debug!(
                source = tables.source.index(),
                "predecessor walk exceeded node count without closing"
            );
            return None;
        }

        walked.push(current);
        let pred_edge = tables.pred[current.index()]?;
        let (pred, _) = network.edge_endpoints(pred_edge)?;
        current = pred;
    }
}

/// Score a recovered loop against raw rates and the caller's threshold.
///
/// Each hop uses the maximum-rate edge among parallel edges for that
/// pair. Returns `None` when the loop is structurally unusable or its
/// profit does not strictly exceed `min_profit * 100` percent.
pub fn score_cycle(
    network: &Network,
    cycle: &[NodeIndex],
    min_profit: f64,
) -> Option<ArbitrageCycle> {
    // A tradeable loop needs at least two hops; self-loops were
    // rejected at construction, so a 1-node "cycle" is an anomaly.
    if cycle.len() < 2 {
        return None;
    }

    let canonical = canonical_rotation(network, cycle);
    let closed: Vec<NodeIndex> = canonical
        .iter()
        .copied()
        .chain(std::iter::once(canonical[0]))
        .collect();

    let mut product = 1.0;
    for pair in closed.windows(2) {
        match network.best_rate(pair[0], pair[1]) {
            Some(rate) => product *= rate,
            None => {
                // Predecessor chain pointed through a hop with no
                // matching edge; treat as a transient artifact.
                debug!(
                    from = network.token(pair[0]),
                    to = network.token(pair[1]),
                    "no edge for reconstructed hop, skipping candidate"
                );
                return None;
            }
        }
    }

    if !product.is_finite() || product <= 1.0 {
        return None;
    }

    let profit_pct = (product - 1.0) * 100.0;
    if profit_pct <= min_profit * 100.0 {
        return None;
    }

    let path: Vec<String> = closed
        .iter()
        .map(|&node| network.token(node).to_owned())
        .collect();

    Some(ArbitrageCycle {
        start_token: path[0].clone(),
        path,
        product,
        profit_pct,
    })
}

/// Rotate the loop so the lexicographically smallest token leads.
fn canonical_rotation(network: &Network, cycle: &[NodeIndex]) -> Vec<NodeIndex> {
    let start = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, &node)| network.token(node))
        .map(|(i, _)| i)
        .unwrap_or(0);

    cycle[start..]
        .iter()
        .chain(cycle[..start].iter())
        .copied()
        .collect()
}
