//! Growth rule definitions.
//!
//! Topologies are modelled by composition rather than subtyping: a builder
//! constructs the initial shape and attaches a `GrowthRule` to the network,
//! and `Network::add_agent` dispatches on that rule to wire newcomers.

use serde::{Deserialize, Serialize};

/// Generative rule applied when an agent is added to a network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GrowthRule {
    /// Newcomers stay unconnected (base network behavior)
    Unconnected,
    /// Newcomer is appended to the chain: previous last agent links to it
    Chain,
    /// Newcomer is connected reciprocally to every existing agent
    FullyConnected,
    /// Newcomer connects to `m` distinct existing agents picked by
    /// preferential attachment, with a reciprocal link pair per pick
    ScaleFree { m: usize },
}

impl GrowthRule {
    /// Topology label used in the network's rendered representation
    pub fn label(&self) -> &'static str {
        match self {
            GrowthRule::Unconnected => "Network",
            GrowthRule::Chain => "Chain",
            GrowthRule::FullyConnected => "FullyConnected",
            GrowthRule::ScaleFree { .. } => "ScaleFree",
        }
    }
}
