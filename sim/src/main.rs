use anyhow::Result;
use clap::Parser;
use tracing::info;

use sim::{build_sim_app, load_config, Args, FrameSink};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut cfg = load_config(&args.config)?;
    if let Some(ticks) = args.ticks {
        cfg.ticks = ticks;
    }
    info!(?cfg, "Sim config loaded");

    let mut app = build_sim_app(cfg)?;
    if let Some(path) = &args.frames_out {
        app.insert_resource(FrameSink::create(path)?);
    }
    app.insert_resource(args);
    let exit = app.run();
    info!(?exit, "Sim exited");
    Ok(())
}
