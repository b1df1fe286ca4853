//! Directed edge type scoped to one network.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// Identifier of a link within its owning network (creation order index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkId(pub usize);

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "link{}", self.0)
    }
}

/// A directed edge from an origin node to a destination node.
///
/// Links are immutable once created. Parallel links and reciprocal pairs are
/// allowed; self-loops and links targeting a source are rejected by the
/// network at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub origin: NodeId,
    pub destination: NodeId,
    pub created_at: DateTime<Utc>,
}
