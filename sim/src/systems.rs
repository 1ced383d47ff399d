use bevy_app::AppExit;
use bevy_ecs::prelude::*;
use protocol::{EventFrame, EventKind, SimMessage, PROTOCOL_VERSION};
use tracing::{debug, info};

use crate::config::Config;
use crate::context::{EventInbox, Simulation};
use crate::frames::{spider_frame, FrameSink};

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepSet;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublishSet;

#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SimStats {
    pub steps: u64,
    pub ground_hits: u64,
    pub knockbacks: u64,
}

pub fn write_hello(sim: Res<Simulation>, sink: Option<ResMut<FrameSink>>) {
    let Some(mut sink) = sink else { return };
    sink.send(&SimMessage::Hello { version: PROTOCOL_VERSION, spider_count: sim.roster.len() as u32 });
}

pub fn step_simulation(mut sim: ResMut<Simulation>) {
    sim.step();
}

pub fn publish_events(
    sim: Res<Simulation>,
    inbox: Res<EventInbox>,
    mut stats: ResMut<SimStats>,
    mut sink: Option<ResMut<FrameSink>>,
) {
    let tick = sim.tick();
    for (spider, kind) in inbox.drain() {
        match kind {
            EventKind::Step { .. } => stats.steps += 1,
            EventKind::HitGround { impact_speed, .. } => {
                stats.ground_hits += 1;
                debug!(%spider, tick, impact_speed, "hit ground");
            }
            EventKind::Knockback { .. } => stats.knockbacks += 1,
        }
        if let Some(sink) = sink.as_mut() {
            sink.send(&SimMessage::Event(EventFrame { spider: spider.0, tick, kind }));
        }
    }
}

pub fn publish_frames(cfg: Res<Config>, sim: Res<Simulation>, sink: Option<ResMut<FrameSink>>) {
    let Some(mut sink) = sink else { return };
    let tick = sim.tick();
    if cfg.frame_every == 0 || tick % cfg.frame_every != 0 {
        return;
    }
    for (id, spider) in sim.roster.iter() {
        sink.send(&SimMessage::Frame(spider_frame(id, tick, &spider.pose())));
    }
}

pub fn report_progress(cfg: Res<Config>, sim: Res<Simulation>, stats: Res<SimStats>) {
    let tick = sim.tick();
    if cfg.log_every == 0 || tick % cfg.log_every != 0 {
        return;
    }
    for (id, spider) in sim.roster.iter() {
        let state = spider.state();
        let grounded = spider.body().legs().iter().filter(|leg| leg.is_grounded()).count();
        info!(
            tick,
            spider = %id,
            position = ?state.position,
            speed = state.velocity.length(),
            grounded,
            "progress"
        );
    }
    debug!(tick, ?stats, "event totals");
}

pub fn stop_when_done(
    cfg: Res<Config>,
    sim: Res<Simulation>,
    stats: Res<SimStats>,
    sink: Option<ResMut<FrameSink>>,
    mut exit: EventWriter<AppExit>,
) {
    if sim.tick() < cfg.ticks {
        return;
    }
    let written = sink.map(|mut sink| {
        sink.flush();
        sink.written()
    });
    info!(ticks = sim.tick(), ?stats, ?written, "simulation finished");
    exit.write(AppExit::Success);
}
