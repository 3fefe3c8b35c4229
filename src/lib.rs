//! Arbitrage cycle detection engine.
//!
//! Given a set of tokens and directed, fee-adjusted exchange-rate edges
//! between them, find every profitable multi-hop trading loop. Rates
//! are transformed to `-ln(rate)` edge weights so that a rate product
//! greater than 1 becomes a negative-weight cycle, detectable with
//! Bellman-Ford relaxation; the reported profit is then recomputed from
//! the raw rates.
//!
//! The engine holds no state of its own: build a [`Network`] per
//! detection pass and hand it to [`find_arbitrage`]. An empty result
//! means no arbitrage, not an error.

pub mod bellman_ford;
pub mod error;
pub mod graph;
pub mod reconstruct;

pub use error::InvalidEdgeError;
pub use graph::{EdgeData, Network};
pub use reconstruct::ArbitrageCycle;

use petgraph::graph::NodeIndex;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info};

/// Scan the network from every source token and return each distinct
/// profitable loop whose profit percentage strictly exceeds
/// `min_profit * 100` (`min_profit` is a fraction, e.g. `0.01` for 1%).
///
/// Source passes are independent over the immutable network and run in
/// parallel; deduplication and the final descending-profit sort happen
/// afterwards in stable source order, so output is deterministic for a
/// fixed input.
pub fn find_arbitrage(network: &Network, min_profit: f64) -> Vec<ArbitrageCycle> {
    let sources: Vec<NodeIndex> = network.node_indices().collect();

    let per_source: Vec<Vec<ArbitrageCycle>> = sources
        .par_iter()
        .map(|&source| scan_source(network, source, min_profit))
        .collect();

    // The same loop surfaces once per member token; keep the first
    // canonical occurrence.
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut cycles: Vec<ArbitrageCycle> = Vec::new();
    for found in per_source {
        for cycle in found {
            if seen.insert(cycle.path.clone()) {
                cycles.push(cycle);
            }
        }
    }

    cycles.sort_by(|a, b| {
        b.profit_pct
            .partial_cmp(&a.profit_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    info!(
        tokens = network.token_count(),
        edges = network.edge_count(),
        cycles = cycles.len(),
        "arbitrage scan complete"
    );

    cycles
}

/// One source token's full pass: relax, certify, reconstruct, score.
fn scan_source(network: &Network, source: NodeIndex, min_profit: f64) -> Vec<ArbitrageCycle> {
    let tables = bellman_ford::relax_from(network, source);
    let certifying = bellman_ford::certifying_edges(network, &tables);

    let mut found = Vec::new();
    for edge in certifying {
        // A certifying edge that fails to close is a transient artifact
        // of relaxation order; skip it and keep scanning.
        let Some(nodes) = reconstruct::recover_cycle(network, &tables, edge) else {
            continue;
        };
        if let Some(cycle) = reconstruct::score_cycle(network, &nodes, min_profit) {
            debug!(
                source = network.token(source),
                path = %cycle.format_path(),
                profit_pct = cycle.profit_pct,
                "cycle found"
            );
            found.push(cycle);
        }
    }

    found
}
