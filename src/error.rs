//! Error types for graph construction.

use thiserror::Error;

/// A malformed input edge, rejected at graph-construction time.
///
/// Fatal for that construction call; the caller can drop the offending
/// edge and rebuild. "No arbitrage found" is never an error - it is an
/// empty result list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidEdgeError {
    /// Rate must be strictly positive and finite, otherwise -ln(rate)
    /// is meaningless as an edge weight.
    #[error("edge {from} -> {to} has non-positive or non-finite rate {rate}")]
    InvalidRate { from: String, to: String, rate: f64 },

    /// An exchange from a token to itself is never a valid edge.
    #[error("self-loop edge on token {token}")]
    SelfLoop { token: String },

    /// Edge endpoint missing from the declared token set.
    #[error("edge references unknown token {token}")]
    UnknownToken { token: String },
}
