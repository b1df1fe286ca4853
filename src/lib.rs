//! # Evosim - Network topology and diffusion engine for simulated evolution experiments
//!
//! This library provides the graph core of a simulated-evolution platform:
//! populations of participant nodes are arranged into a directed network and
//! content is propagated along that network, one transmission record per
//! delivery.
//!
//! ## Overview
//!
//! Experiments arrange agents into one of the canonical topologies and feed
//! them from source nodes. Agents can receive and hold content; sources only
//! emit. Every propagation is recorded, so a finished run is a complete,
//! replayable account of who received what, from whom, and in which order.
//!
//! ## Key Features
//!
//! - **Canonical Topologies**: linear chain, fully connected, and growing
//!   scale-free networks via preferential attachment
//! - **Structural Invariants**: directed edges only, no self-loops, sources
//!   never receive
//! - **Diffusion Engine**: per-delivery transmission records with per-source
//!   sequence numbers and overwrite semantics on agent content slots
//! - **Record Store Contract**: compound operations are mirrored into a
//!   pluggable store and committed as atomic units
//! - **Reproducible**: deterministic runs from a configured RNG seed
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `config`: Type-safe configuration structures and YAML parsing
//! - `network`: Node arena, directed links, and the network container
//! - `topology`: Topology builders and growth rules
//! - `diffusion`: Content propagation and transmission bookkeeping
//! - `store`: Record store contract and in-memory reference implementation
//! - `orchestrator`: High-level coordination of one experiment run
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use evosim::{config, orchestrator};
//! use std::path::Path;
//!
//! // Load configuration from YAML file
//! let config = config::load_config(Path::new("experiment.yaml"))?;
//!
//! // Run the experiment
//! let summary = orchestrator::run_experiment(&config, Path::new("experiment_output"))?;
//!
//! // The output directory now contains:
//! // - network_registry.json: agents, sources, and links
//! // - transmissions.json: every content delivery in order
//! println!("{}", summary.network);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Configuration Format
//!
//! Configurations use YAML format:
//!
//! ```yaml
//! general:
//!   seed: 42
//!   rounds: 1
//!
//! network:
//!   topology: ScaleFree   # Chain / FullyConnected / ScaleFree
//!   size: 6
//!   m0: 4
//!   m: 4
//!
//! sources:
//!   - mode: Global
//!     contents:
//!       - content_type: genome
//!         payload:
//!           random_binary:
//!             bits: 16
//! ```
//!
//! ## Error Handling
//!
//! Structural violations are rejected at the point of creation with typed
//! `thiserror` enums; the orchestration layer uses `color_eyre` for error
//! reports with context.

pub mod config;
pub mod diffusion;
pub mod network;
pub mod orchestrator;
pub mod store;
pub mod topology;
