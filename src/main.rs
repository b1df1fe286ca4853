use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use evosim::config;
use evosim::orchestrator;

/// Network topology and diffusion engine for simulated evolution experiments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the experiment configuration YAML file
    #[arg(short, long)]
    config: PathBuf,

    /// Output directory for registry files
    #[arg(short, long, default_value = "experiment_output")]
    output: PathBuf,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration before logger setup so its log level can act as
    // the default filter.
    let config = config::load_config(&args.config)?;
    let default_level = config
        .general
        .log_level
        .clone()
        .unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("Starting Evosim experiment runner");
    info!("Configuration file: {:?}", args.config);
    info!("Output directory: {:?}", args.output);

    let summary = orchestrator::run_experiment(&config, &args.output)?;

    info!(
        "Built {} and delivered {} transmissions over {} rounds",
        summary.network, summary.transmissions, summary.rounds
    );
    info!("Experiment run completed successfully");
    Ok(())
}
