//! Node type definitions and related data structures for Evosim.
//!
//! This module contains the core node types used by the network container:
//! the participant variants (agents and sources), their content payloads,
//! and the transmission records produced by the diffusion engine.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stable identifier of a node within its owning network.
///
/// Ids are arena indices: they are assigned on creation, never reused, and
/// are only meaningful relative to the network that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node{}", self.0)
    }
}

/// Represents the two participant variants in a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// Participant that can receive and hold content
    Agent,
    /// Origin that emits content but never receives
    Source,
}

impl NodeRole {
    /// Returns a string representation of the node role
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Agent => "agent",
            NodeRole::Source => "source",
        }
    }
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload generator for one content type a source can emit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    /// Emits the same string on every delivery
    Fixed { value: String },
    /// Emits a fresh random binary string of `bits` characters per delivery
    RandomBinary { bits: usize },
}

impl Payload {
    /// Generate one payload value.
    ///
    /// Random payloads are drawn fresh per delivery, so repeated deliveries
    /// (and deliveries to different agents) may carry different values.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self {
            Payload::Fixed { value } => value.clone(),
            Payload::RandomBinary { bits } => {
                (0..*bits).map(|_| if rng.gen::<bool>() { '1' } else { '0' }).collect()
            }
        }
    }
}

/// One content type a source emits, paired with its payload generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emission {
    pub content_type: String,
    pub payload: Payload,
}

impl Emission {
    pub fn new(content_type: impl Into<String>, payload: Payload) -> Self {
        Self {
            content_type: content_type.into(),
            payload,
        }
    }
}

/// Immutable record of one content delivery from a source to an agent.
///
/// Sequence numbers are per-source, starting at 1, and keep increasing
/// across repeated triggers of the same source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transmission {
    pub source: NodeId,
    pub destination: NodeId,
    pub content_type: String,
    pub value: String,
    pub seq: u64,
    pub sent_at: DateTime<Utc>,
}

/// State held by an agent node: one slot per content type.
///
/// A slot is unset until a transmission delivers into it; redelivery
/// overwrites the previous value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    slots: HashMap<String, String>,
}

impl AgentState {
    /// Deliver a value into the slot for `content_type` (last value wins)
    pub fn update(&mut self, content_type: &str, value: String) {
        self.slots.insert(content_type.to_string(), value);
    }

    /// Current value of a content slot, if any delivery has reached it
    pub fn content(&self, content_type: &str) -> Option<&str> {
        self.slots.get(content_type).map(String::as_str)
    }

    /// Content types that have received at least one delivery
    pub fn filled_slots(&self) -> usize {
        self.slots.len()
    }
}

/// State held by a source node: what it emits and what it has sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceState {
    pub emissions: Vec<Emission>,
    pub outgoing_transmissions: Vec<Transmission>,
    next_seq: u64,
}

impl SourceState {
    pub fn new(emissions: Vec<Emission>) -> Self {
        Self {
            emissions,
            outgoing_transmissions: Vec::new(),
            next_seq: 1,
        }
    }

    /// Allocate the next per-source sequence number
    pub fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

/// Variant-specific node state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Agent(AgentState),
    Source(SourceState),
}

impl NodeKind {
    pub fn role(&self) -> NodeRole {
        match self {
            NodeKind::Agent(_) => NodeRole::Agent,
            NodeKind::Source(_) => NodeRole::Source,
        }
    }
}

/// A participant unit in the network arena.
///
/// The creation index is the ordering authority ("network order"); the
/// timestamp is informational and serialized into registries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub creation_index: u64,
    pub created_at: DateTime<Utc>,
    pub kind: NodeKind,
}

impl Node {
    pub fn role(&self) -> NodeRole {
        self.kind.role()
    }

    pub fn is_agent(&self) -> bool {
        matches!(self.kind, NodeKind::Agent(_))
    }

    pub fn is_source(&self) -> bool {
        matches!(self.kind, NodeKind::Source(_))
    }

    /// Agent state accessor; `None` for sources
    pub fn as_agent(&self) -> Option<&AgentState> {
        match &self.kind {
            NodeKind::Agent(state) => Some(state),
            NodeKind::Source(_) => None,
        }
    }

    /// Source state accessor; `None` for agents
    pub fn as_source(&self) -> Option<&SourceState> {
        match &self.kind {
            NodeKind::Source(state) => Some(state),
            NodeKind::Agent(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fixed_payload_is_stable() {
        let mut rng = StdRng::seed_from_u64(7);
        let payload = Payload::Fixed {
            value: "0101".to_string(),
        };
        assert_eq!(payload.generate(&mut rng), "0101");
        assert_eq!(payload.generate(&mut rng), "0101");
    }

    #[test]
    fn test_random_binary_payload_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let payload = Payload::RandomBinary { bits: 16 };
        let value = payload.generate(&mut rng);
        assert_eq!(value.len(), 16);
        assert!(value.chars().all(|c| c == '0' || c == '1'));
    }

    #[test]
    fn test_agent_slot_overwrite() {
        let mut state = AgentState::default();
        assert!(state.content("genome").is_none());

        state.update("genome", "0000".to_string());
        state.update("genome", "1111".to_string());

        assert_eq!(state.content("genome"), Some("1111"));
        assert_eq!(state.filled_slots(), 1);
    }

    #[test]
    fn test_source_sequence_numbers() {
        let mut state = SourceState::new(vec![Emission::new(
            "genome",
            Payload::RandomBinary { bits: 8 },
        )]);
        assert_eq!(state.take_seq(), 1);
        assert_eq!(state.take_seq(), 2);
        assert_eq!(state.take_seq(), 3);
    }
}
