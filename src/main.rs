mod config;
mod engine;
mod manager;
mod model;
mod state;
mod stats;
mod stepper;
mod sweep;

use crate::manager::Manager;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    sim_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one simulation to the configured end time and print its report.
    Simulate {
        /// Use the three-species pesticide variant.
        #[arg(long)]
        pesticide: bool,
    },

    /// Run the full-factorial parameter sweep and write sweep.csv.
    Sweep,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.sim_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Simulate { pesticide } => mgr.run_simulation(pesticide)?,
        Command::Sweep => mgr.run_sweep()?,
    }

    Ok(())
}
