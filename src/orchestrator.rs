//! Experiment orchestrator.
//!
//! This module coordinates one experiment run: building the configured
//! topology, attaching sources, triggering diffusion rounds, mirroring
//! every compound operation into the record store, and writing the JSON
//! registry files.

use color_eyre::eyre::{eyre, Result, WrapErr};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::config::{Config, SourceMode, Topology};
use crate::diffusion;
use crate::network::{Network, NodeId};
use crate::store::{MemoryStore, RecordKind, RecordStore, StoreSync};
use crate::topology::{build_chain, build_fully_connected, build_scale_free};

/// Identifier of the run's network within the record store
const NETWORK_ID: u64 = 1;

/// Counts and rendering of a finished run
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub network: String,
    pub agents: usize,
    pub sources: usize,
    pub links: usize,
    pub transmissions: usize,
    pub rounds: u32,
}

/// Run one experiment and write its registries under `output_dir`.
///
/// The store is committed after each compound operation (construction,
/// every growth step, every source attach, every trigger), so a failure
/// never leaves a partially recorded operation behind.
pub fn run_experiment(config: &Config, output_dir: &Path) -> Result<RunSummary> {
    let mut rng = match config.general.seed {
        Some(seed) => {
            log::info!("Using deterministic seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let mut store = MemoryStore::new();
    let mut sync = StoreSync::new(NETWORK_ID);

    let mut net = build_topology(config)?;
    sync.sync(&net, &mut store)?;

    grow_to_size(&mut net, config.network.size, &mut rng, &mut sync, &mut store)?;

    let sources = attach_sources(&mut net, config, &mut sync, &mut store)?;

    let rounds = config.general.rounds.unwrap_or(1);
    let mut transmissions = 0;
    for round in 1..=rounds {
        for source in &sources {
            transmissions += diffusion::trigger_source(&mut net, *source, &mut rng)?;
            sync.sync(&net, &mut store)?;
        }
        log::info!(
            "Round {}/{} complete: {} transmissions so far",
            round,
            rounds,
            transmissions
        );
    }

    write_registries(&store, output_dir)?;

    let summary = RunSummary {
        network: net.to_string(),
        agents: net.agent_count(),
        sources: net.source_count(),
        links: net.link_count(),
        transmissions,
        rounds,
    };
    log::info!("Experiment finished: {}", summary.network);
    Ok(summary)
}

/// Build the configured topology's initial shape
fn build_topology(config: &Config) -> Result<Network> {
    let net = match config.network.topology {
        Topology::Chain => build_chain(config.network.size)?,
        Topology::FullyConnected => build_fully_connected(config.network.size)?,
        Topology::ScaleFree => {
            let m0 = config
                .network
                .m0
                .ok_or_else(|| eyre!("ScaleFree topology requires m0"))?;
            let m = config
                .network
                .m
                .ok_or_else(|| eyre!("ScaleFree topology requires m"))?;
            build_scale_free(m0, m)?
        }
    };
    Ok(net)
}

/// Grow the network one agent at a time up to `size`, committing each step
fn grow_to_size(
    net: &mut Network,
    size: usize,
    rng: &mut StdRng,
    sync: &mut StoreSync,
    store: &mut MemoryStore,
) -> Result<()> {
    while net.agent_count() < size {
        net.add_agent(rng)?;
        sync.sync(net, store)?;
    }
    Ok(())
}

/// Attach every configured source, committing each attachment
fn attach_sources(
    net: &mut Network,
    config: &Config,
    sync: &mut StoreSync,
    store: &mut MemoryStore,
) -> Result<Vec<NodeId>> {
    let mut sources = Vec::new();
    for source_config in &config.sources {
        let emissions = source_config.contents.clone();
        let source = match source_config.mode {
            SourceMode::Global => net.add_global_source(emissions)?,
            SourceMode::Local => {
                let index = source_config
                    .target
                    .ok_or_else(|| eyre!("Local source requires a target agent index"))?;
                let agent = *net
                    .agents()
                    .get(index)
                    .ok_or_else(|| eyre!("No agent at index {}", index))?;
                net.add_local_source(emissions, agent)?
            }
        };
        sync.sync(net, store)?;
        sources.push(source);
    }
    log::info!("Attached {} sources", sources.len());
    Ok(sources)
}

/// Write committed records as JSON registry files
fn write_registries(store: &MemoryStore, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", output_dir.display()))?;

    let registry = json!({
        "agents": store.query_by_network(NETWORK_ID, RecordKind::Agent),
        "sources": store.query_by_network(NETWORK_ID, RecordKind::Source),
        "links": store.query_by_network(NETWORK_ID, RecordKind::Link),
    });
    let registry_path = output_dir.join("network_registry.json");
    fs::write(&registry_path, serde_json::to_string_pretty(&registry)?)
        .wrap_err_with(|| format!("Failed to write '{}'", registry_path.display()))?;

    let transmissions = store.query_by_network(NETWORK_ID, RecordKind::Transmission);
    let transmissions_path = output_dir.join("transmissions.json");
    fs::write(
        &transmissions_path,
        serde_json::to_string_pretty(&transmissions)?,
    )
    .wrap_err_with(|| format!("Failed to write '{}'", transmissions_path.display()))?;

    log::info!(
        "Wrote registries to {} and {}",
        registry_path.display(),
        transmissions_path.display()
    );
    Ok(())
}
