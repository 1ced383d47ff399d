use std::path::PathBuf;

use bevy_ecs::prelude::Resource;
use clap::Parser;

#[derive(Parser, Debug, Resource, Clone)]
#[command(name = "spider-sim")]
#[command(about = "Headless runner for procedurally animated creatures", long_about = None)]
pub struct Args {
    /// Path to a TOML config; built-in defaults when the file is missing
    #[arg(long, default_value = "sim.toml")]
    pub config: PathBuf,
    /// Override the configured number of ticks
    #[arg(long)]
    pub ticks: Option<u64>,
    /// Write length-prefixed render frames and events to this file
    #[arg(long)]
    pub frames_out: Option<PathBuf>,
}
