//! Network container and structural queries.
//!
//! The network owns an arena of nodes and the set of directed links between
//! them. All mutation goes through the container's own operations so the
//! structural invariants (no self-loops, sources never receive, membership)
//! are enforced at the point of creation.

use chrono::Utc;
use rand::Rng;

use super::link::{Link, LinkId};
use super::node::{AgentState, Emission, Node, NodeId, NodeKind, NodeRole, SourceState};
use crate::topology::growth;
use crate::topology::GrowthRule;

/// Errors raised by network mutation and queries
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    #[error("invalid edge {origin} -> {destination}: {reason}")]
    InvalidEdge {
        origin: NodeId,
        destination: NodeId,
        reason: String,
    },
    #[error("cannot attach {requested} connections: only {available} candidate agents exist")]
    InsufficientPopulation { requested: usize, available: usize },
    #[error("{id} does not belong to this network")]
    UnknownNode { id: NodeId },
    #[error("{id} is not a {expected}")]
    WrongRole { id: NodeId, expected: NodeRole },
}

/// Snapshot of the container's extents, used to undo a partially applied
/// compound operation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NetworkMark {
    nodes: usize,
    agents: usize,
    sources: usize,
    links: usize,
}

/// A directed graph of participant nodes.
///
/// Agents and sources are kept in separate insertion-ordered sequences
/// ("network order"); links are kept in creation order. The growth rule
/// attached at construction time decides how `add_agent` wires newcomers.
#[derive(Debug, Clone)]
pub struct Network {
    growth: GrowthRule,
    nodes: Vec<Node>,
    agents: Vec<NodeId>,
    sources: Vec<NodeId>,
    links: Vec<Link>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    /// Create an empty network with no generative rule
    pub fn new() -> Self {
        Self::with_rule(GrowthRule::Unconnected)
    }

    /// Create an empty network governed by the given growth rule
    pub(crate) fn with_rule(growth: GrowthRule) -> Self {
        Self {
            growth,
            nodes: Vec::new(),
            agents: Vec::new(),
            sources: Vec::new(),
            links: Vec::new(),
        }
    }

    /// The growth rule governing `add_agent`
    pub fn growth_rule(&self) -> &GrowthRule {
        &self.growth
    }

    /// Create a new agent and wire it according to the growth rule.
    ///
    /// The base rule leaves the newcomer unconnected. A failed growth step
    /// discards the newcomer and every link staged for it.
    pub fn add_agent<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<NodeId, NetworkError> {
        match self.growth.clone() {
            GrowthRule::Unconnected => Ok(self.push_agent()),
            GrowthRule::Chain => {
                let previous = self.last_agent();
                let newcomer = self.push_agent();
                if let Some(previous) = previous {
                    self.connect(previous, newcomer)?;
                }
                Ok(newcomer)
            }
            GrowthRule::FullyConnected => {
                let existing = self.agents.clone();
                let newcomer = self.push_agent();
                for agent in existing {
                    self.connect(newcomer, agent)?;
                    self.connect(agent, newcomer)?;
                }
                Ok(newcomer)
            }
            GrowthRule::ScaleFree { m } => growth::preferential_step(self, m, rng),
        }
    }

    /// Create one directed link from `origin` to `destination`.
    ///
    /// Self-loops and links targeting a source are rejected; both endpoints
    /// must belong to this network.
    pub fn connect(
        &mut self,
        origin: NodeId,
        destination: NodeId,
    ) -> Result<LinkId, NetworkError> {
        self.node(origin)?;
        let target = self.node(destination)?;
        if origin == destination {
            return Err(NetworkError::InvalidEdge {
                origin,
                destination,
                reason: "self-loops are not allowed".to_string(),
            });
        }
        if target.is_source() {
            return Err(NetworkError::InvalidEdge {
                origin,
                destination,
                reason: "a source can never be a destination".to_string(),
            });
        }

        let id = LinkId(self.links.len());
        self.links.push(Link {
            id,
            origin,
            destination,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    /// Register a new source and link it to a single agent
    pub fn add_local_source(
        &mut self,
        emissions: Vec<Emission>,
        agent: NodeId,
    ) -> Result<NodeId, NetworkError> {
        // Target is validated before the source node exists.
        if !self.node(agent)?.is_agent() {
            return Err(NetworkError::WrongRole {
                id: agent,
                expected: NodeRole::Agent,
            });
        }
        let source = self.push_source(emissions);
        self.connect(source, agent)?;
        log::debug!("Attached local source {} to {}", source, agent);
        Ok(source)
    }

    /// Register a new source and link it to every agent currently present.
    ///
    /// Agents added later are not retroactively connected.
    pub fn add_global_source(&mut self, emissions: Vec<Emission>) -> Result<NodeId, NetworkError> {
        let source = self.push_source(emissions);
        let agents = self.agents.clone();
        for agent in &agents {
            self.connect(source, *agent)?;
        }
        log::debug!("Attached global source {} to {} agents", source, agents.len());
        Ok(source)
    }

    /// Outdegrees over agent-to-agent links, in agent insertion order
    pub fn get_degrees(&self) -> Vec<usize> {
        self.agents
            .iter()
            .map(|agent| self.count_outgoing(*agent))
            .collect()
    }

    /// Number of outgoing links of a node.
    ///
    /// Destinations are always agents, so an agent's outdegree is exactly
    /// its agent-to-agent count; a source's outdegree counts its fan-out.
    pub fn outdegree(&self, id: NodeId) -> Result<usize, NetworkError> {
        self.node(id)?;
        Ok(self.count_outgoing(id))
    }

    /// Number of incoming agent-to-agent links of a node.
    ///
    /// Source-originated links are excluded from degree accounting.
    pub fn indegree(&self, id: NodeId) -> Result<usize, NetworkError> {
        self.node(id)?;
        Ok(self
            .links
            .iter()
            .filter(|link| {
                link.destination == id
                    && self
                        .nodes
                        .get(link.origin.0)
                        .map(Node::is_agent)
                        .unwrap_or(false)
            })
            .count())
    }

    /// First agent in network order, or `None` on an empty network
    pub fn first_agent(&self) -> Option<NodeId> {
        self.agents.first().copied()
    }

    /// Last agent in network order, or `None` on an empty network
    pub fn last_agent(&self) -> Option<NodeId> {
        self.agents.last().copied()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Agent ids in insertion order
    pub fn agents(&self) -> &[NodeId] {
        &self.agents
    }

    /// Source ids in insertion order
    pub fn sources(&self) -> &[NodeId] {
        &self.sources
    }

    /// Links in creation order
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Node lookup; `UnknownNode` for ids this network never issued
    pub fn node(&self, id: NodeId) -> Result<&Node, NetworkError> {
        self.nodes.get(id.0).ok_or(NetworkError::UnknownNode { id })
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, NetworkError> {
        self.nodes
            .get_mut(id.0)
            .ok_or(NetworkError::UnknownNode { id })
    }

    /// Mutable source state; `WrongRole` when the node is an agent
    pub(crate) fn source_state_mut(
        &mut self,
        id: NodeId,
    ) -> Result<&mut SourceState, NetworkError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Source(state) => Ok(state),
            NodeKind::Agent(_) => Err(NetworkError::WrongRole {
                id,
                expected: NodeRole::Source,
            }),
        }
    }

    /// Mutable agent state; `WrongRole` when the node is a source
    pub(crate) fn agent_state_mut(&mut self, id: NodeId) -> Result<&mut AgentState, NetworkError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Agent(state) => Ok(state),
            NodeKind::Source(_) => Err(NetworkError::WrongRole {
                id,
                expected: NodeRole::Agent,
            }),
        }
    }

    /// Outgoing links of a node, in creation order
    pub fn outgoing_links(&self, id: NodeId) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |link| link.origin == id)
    }

    /// Current value of an agent's content slot
    pub fn content(&self, agent: NodeId, content_type: &str) -> Result<Option<&str>, NetworkError> {
        let node = self.node(agent)?;
        Ok(node.as_agent().and_then(|state| state.content(content_type)))
    }

    pub(crate) fn mark(&self) -> NetworkMark {
        NetworkMark {
            nodes: self.nodes.len(),
            agents: self.agents.len(),
            sources: self.sources.len(),
            links: self.links.len(),
        }
    }

    /// Discard everything created after `mark` (compound-operation undo)
    pub(crate) fn rollback_to(&mut self, mark: NetworkMark) {
        self.nodes.truncate(mark.nodes);
        self.agents.truncate(mark.agents);
        self.sources.truncate(mark.sources);
        self.links.truncate(mark.links);
    }

    pub(crate) fn push_agent(&mut self) -> NodeId {
        let id = self.push_node(NodeKind::Agent(AgentState::default()));
        self.agents.push(id);
        id
    }

    pub(crate) fn push_source(&mut self, emissions: Vec<Emission>) -> NodeId {
        let id = self.push_node(NodeKind::Source(SourceState::new(emissions)));
        self.sources.push(id);
        id
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            creation_index: id.0 as u64,
            created_at: Utc::now(),
            kind,
        });
        id
    }

    fn count_outgoing(&self, id: NodeId) -> usize {
        self.links.iter().filter(|link| link.origin == id).count()
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<{} with {} agents, {} sources, {} links>",
            self.growth.label(),
            self.agents.len(),
            self.sources.len(),
            self.links.len()
        )
    }
}
