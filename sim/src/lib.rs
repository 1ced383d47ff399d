//! Headless runner: steps spiders over a block terrain inside a bevy `App` and
//! optionally streams render frames to a file.

use anyhow::Result;
use bevy_app::{App, AppExit, PluginsState, Startup, Update};
use bevy_ecs::prelude::*;

pub mod args;
pub mod config;
pub mod context;
pub mod frames;
pub mod systems;
pub mod terrain;

pub use args::Args;
pub use config::{load_config, parse_config, ActionKind, Config, ScheduledAction, SpiderConfig};
pub use context::{EventInbox, Roster, Simulation, SpiderId};
pub use frames::{FrameSink, SharedBuffer};
pub use systems::{PublishSet, SimStats, StepSet};
pub use terrain::{HeightField, TerrainConfig};

use systems::{publish_events, publish_frames, report_progress, step_simulation, stop_when_done, write_hello};

pub fn build_sim_app(cfg: Config) -> Result<App> {
    let inbox = EventInbox::default();
    let sim = Simulation::from_config(&cfg, &inbox)?;

    let mut app = App::new();
    app.insert_resource(cfg)
        .insert_resource(sim)
        .insert_resource(inbox)
        .init_resource::<SimStats>()
        .configure_sets(Update, (StepSet, PublishSet).chain())
        .add_systems(Startup, write_hello)
        .add_systems(Update, step_simulation.in_set(StepSet))
        .add_systems(
            Update,
            (publish_events, publish_frames, report_progress, stop_when_done)
                .chain()
                .in_set(PublishSet),
        )
        .set_runner(run_until_exit);
    Ok(app)
}

fn run_until_exit(mut app: App) -> AppExit {
    if app.plugins_state() == PluginsState::Ready {
        app.finish();
        app.cleanup();
    }
    loop {
        app.update();
        if let Some(exit) = app.should_exit() {
            return exit;
        }
    }
}
