//! Record store contract and reference implementation.
//!
//! The engine's durable collaborator is abstracted behind the `RecordStore`
//! trait: nodes, links, and transmissions are mirrored into the store as
//! snapshot records, and `commit` is the atomicity boundary invoked after
//! each compound operation. `MemoryStore` is the in-process reference
//! implementation; committed records are what registry files are written
//! from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::network::{LinkId, Network, NetworkError, NodeId};

/// Errors raised at the persistence boundary
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate record id '{id}'")]
    DuplicateId { id: String },
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Kinds of records the store holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Agent,
    Source,
    Link,
    Transmission,
}

/// Snapshot payload of one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordBody {
    Agent {
        node: NodeId,
        creation_index: u64,
        created_at: DateTime<Utc>,
    },
    Source {
        node: NodeId,
        creation_index: u64,
        created_at: DateTime<Utc>,
        content_types: Vec<String>,
    },
    Link {
        link: LinkId,
        origin: NodeId,
        destination: NodeId,
        created_at: DateTime<Utc>,
    },
    Transmission {
        source: NodeId,
        destination: NodeId,
        content_type: String,
        value: String,
        seq: u64,
        sent_at: DateTime<Utc>,
    },
}

impl RecordBody {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordBody::Agent { .. } => RecordKind::Agent,
            RecordBody::Source { .. } => RecordKind::Source,
            RecordBody::Link { .. } => RecordKind::Link,
            RecordBody::Transmission { .. } => RecordKind::Transmission,
        }
    }
}

/// One store record: globally unique id, owning network, snapshot body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub network_id: u64,
    #[serde(flatten)]
    pub body: RecordBody,
}

/// Minimal contract of the external persistent-record collaborator
pub trait RecordStore {
    /// Register a newly created record; a duplicate id is an error
    fn add(&mut self, record: Record) -> Result<(), StoreError>;

    /// Committed records of one kind for a network, in creation order
    fn query_by_network(&self, network_id: u64, kind: RecordKind) -> Vec<&Record>;

    /// Durably persist pending additions
    fn commit(&mut self) -> Result<(), StoreError>;
}

/// In-memory reference store.
///
/// Additions are staged until `commit`; queries only see committed records.
#[derive(Debug, Default)]
pub struct MemoryStore {
    staged: Vec<Record>,
    committed: Vec<Record>,
    ids: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All committed records, in insertion order
    pub fn committed(&self) -> &[Record] {
        &self.committed
    }

    pub fn pending(&self) -> usize {
        self.staged.len()
    }
}

impl RecordStore for MemoryStore {
    fn add(&mut self, record: Record) -> Result<(), StoreError> {
        if !self.ids.insert(record.id.clone()) {
            return Err(StoreError::DuplicateId { id: record.id });
        }
        self.staged.push(record);
        Ok(())
    }

    fn query_by_network(&self, network_id: u64, kind: RecordKind) -> Vec<&Record> {
        self.committed
            .iter()
            .filter(|record| record.network_id == network_id && record.body.kind() == kind)
            .collect()
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.committed.append(&mut self.staged);
        Ok(())
    }
}

/// Incremental mirror of a network into a record store.
///
/// Tracks what has already been recorded so each `sync` call adds only the
/// records created since the previous one, then commits. The orchestrator
/// calls this after every compound operation.
#[derive(Debug)]
pub struct StoreSync {
    network_id: u64,
    agents_seen: usize,
    sources_seen: usize,
    links_seen: usize,
    transmissions_seen: HashMap<NodeId, usize>,
}

impl StoreSync {
    pub fn new(network_id: u64) -> Self {
        Self {
            network_id,
            agents_seen: 0,
            sources_seen: 0,
            links_seen: 0,
            transmissions_seen: HashMap::new(),
        }
    }

    /// Mirror everything created since the last sync, then commit.
    ///
    /// Returns the number of records added.
    pub fn sync(
        &mut self,
        net: &Network,
        store: &mut dyn RecordStore,
    ) -> Result<usize, StoreError> {
        let mut added = 0;

        for id in &net.agents()[self.agents_seen..] {
            let node = net.node(*id)?;
            store.add(Record {
                id: format!("net{}/agent/{}", self.network_id, id.0),
                network_id: self.network_id,
                body: RecordBody::Agent {
                    node: *id,
                    creation_index: node.creation_index,
                    created_at: node.created_at,
                },
            })?;
            added += 1;
        }
        self.agents_seen = net.agent_count();

        for id in &net.sources()[self.sources_seen..] {
            let node = net.node(*id)?;
            let content_types = node
                .as_source()
                .map(|state| {
                    state
                        .emissions
                        .iter()
                        .map(|emission| emission.content_type.clone())
                        .collect()
                })
                .unwrap_or_default();
            store.add(Record {
                id: format!("net{}/source/{}", self.network_id, id.0),
                network_id: self.network_id,
                body: RecordBody::Source {
                    node: *id,
                    creation_index: node.creation_index,
                    created_at: node.created_at,
                    content_types,
                },
            })?;
            added += 1;
        }
        self.sources_seen = net.source_count();

        for link in &net.links()[self.links_seen..] {
            store.add(Record {
                id: format!("net{}/link/{}", self.network_id, link.id.0),
                network_id: self.network_id,
                body: RecordBody::Link {
                    link: link.id,
                    origin: link.origin,
                    destination: link.destination,
                    created_at: link.created_at,
                },
            })?;
            added += 1;
        }
        self.links_seen = net.link_count();

        for id in net.sources().to_vec() {
            let seen = self.transmissions_seen.entry(id).or_insert(0);
            let state = match net.node(id)?.as_source() {
                Some(state) => state,
                None => continue,
            };
            for tx in &state.outgoing_transmissions[*seen..] {
                store.add(Record {
                    id: format!("net{}/tx/{}/{}", self.network_id, id.0, tx.seq),
                    network_id: self.network_id,
                    body: RecordBody::Transmission {
                        source: tx.source,
                        destination: tx.destination,
                        content_type: tx.content_type.clone(),
                        value: tx.value.clone(),
                        seq: tx.seq,
                        sent_at: tx.sent_at,
                    },
                })?;
                added += 1;
            }
            *seen = state.outgoing_transmissions.len();
        }

        store.commit()?;
        log::debug!("Synced {} records to the store", added);
        Ok(added)
    }
}
