//! Everything one simulation owns: terrain, spiders by id, and the tick scheduler.

use std::fmt;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bevy_ecs::prelude::Resource;
use parking_lot::Mutex;
use protocol::EventKind;
use spider::{HitGroundEvent, KnockbackEvent, Quatd, Scheduler, Spider, StepEvent};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{ActionKind, Config, SpiderConfig};
use crate::frames::vec3;
use crate::terrain::HeightField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpiderId(pub Uuid);

impl SpiderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SpiderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SpiderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Events raised by spider handlers during a tick, drained by the publish systems.
#[derive(Resource, Clone, Default)]
pub struct EventInbox(Arc<Mutex<Vec<(SpiderId, EventKind)>>>);

impl EventInbox {
    pub fn push(&self, spider: SpiderId, kind: EventKind) {
        self.0.lock().push((spider, kind));
    }

    pub fn drain(&self) -> Vec<(SpiderId, EventKind)> {
        std::mem::take(&mut *self.0.lock())
    }
}

/// Spiders in spawn order.
#[derive(Debug, Default)]
pub struct Roster {
    spiders: Vec<(SpiderId, Spider)>,
}

impl Roster {
    pub fn len(&self) -> usize {
        self.spiders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spiders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpiderId, &Spider)> {
        self.spiders.iter().map(|(id, spider)| (*id, spider))
    }

    pub fn get(&self, id: SpiderId) -> Option<&Spider> {
        self.spiders.iter().find(|(sid, _)| *sid == id).map(|(_, s)| s)
    }

    pub fn get_mut(&mut self, id: SpiderId) -> Option<&mut Spider> {
        self.spiders.iter_mut().find(|(sid, _)| *sid == id).map(|(_, s)| s)
    }

    pub fn insert(&mut self, id: SpiderId, spider: Spider) {
        self.spiders.push((id, spider));
    }

    /// Drops the spider and its event handlers.
    pub fn remove(&mut self, id: SpiderId) -> Option<Spider> {
        let index = self.spiders.iter().position(|(sid, _)| *sid == id)?;
        Some(self.spiders.remove(index).1)
    }

    pub fn apply(&mut self, id: SpiderId, action: ActionKind) {
        let Some(spider) = self.get_mut(id) else {
            warn!(spider = %id, ?action, "action for a spider that is gone");
            return;
        };
        match action {
            ActionKind::Knockback { direction, hit_from } => spider.apply_knockback(direction, hit_from),
            ActionKind::DisableLeg { leg, disabled } => {
                if !spider.set_leg_disabled(leg, disabled) {
                    warn!(spider = %id, leg, "no such leg");
                    return;
                }
            }
            ActionKind::Behaviour { behaviour } => spider.set_behaviour(behaviour),
            ActionKind::Gallop { enabled } => spider.set_gallop(enabled),
            ActionKind::Teleport { position } => spider.teleport(position),
        }
        info!(spider = %id, ?action, "scheduled action applied");
    }

    fn update(&mut self, terrain: &HeightField) {
        for (_, spider) in &mut self.spiders {
            spider.update(terrain);
        }
    }
}

#[derive(Resource)]
pub struct Simulation {
    pub terrain: HeightField,
    pub roster: Roster,
    pub scheduler: Scheduler<Roster>,
}

impl Simulation {
    pub fn new(terrain: HeightField) -> Self {
        Self { terrain, roster: Roster::default(), scheduler: Scheduler::new() }
    }

    /// Spawns the configured spiders, wires their events into `inbox` and queues the
    /// configured actions.
    pub fn from_config(cfg: &Config, inbox: &EventInbox) -> Result<Self> {
        let mut sim = Self::new(HeightField::new(cfg.terrain));
        let mut ids = Vec::with_capacity(cfg.spiders.len());
        for (index, spider_cfg) in cfg.spiders.iter().enumerate() {
            let id = sim.spawn(spider_cfg, inbox).with_context(|| format!("spawning spider {index}"))?;
            ids.push(id);
        }
        for action in &cfg.actions {
            let Some(&id) = ids.get(action.spider) else {
                bail!("action at tick {} targets spider {} but only {} are configured", action.at_tick, action.spider, ids.len());
            };
            let kind = action.kind;
            sim.scheduler.run_later(action.at_tick, move |roster: &mut Roster| roster.apply(id, kind));
        }
        Ok(sim)
    }

    pub fn spawn(&mut self, cfg: &SpiderConfig, inbox: &EventInbox) -> Result<SpiderId> {
        let mut options = cfg.preset.options(cfg.segment_count, cfg.segment_length);
        options.scale(cfg.scale);
        let mut spider = Spider::new(cfg.spawn, Quatd::from_rotation_y(cfg.heading), options, &self.terrain)?;
        spider.set_gallop(cfg.gallop);
        spider.set_behaviour(cfg.behaviour);

        let id = SpiderId::new();
        {
            let inbox = inbox.clone();
            spider.subscribe_steps(move |e: &StepEvent| {
                inbox.push(id, EventKind::Step { leg: e.leg as u32, position: vec3(e.position) })
            });
        }
        {
            let inbox = inbox.clone();
            spider.body_mut().on_hit_ground.subscribe(move |e: &HitGroundEvent| {
                inbox.push(id, EventKind::HitGround { position: vec3(e.position), impact_speed: e.impact_speed })
            });
        }
        {
            let inbox = inbox.clone();
            spider.on_knockback.subscribe(move |e: &KnockbackEvent| {
                inbox.push(id, EventKind::Knockback { direction: vec3(e.direction), strength: e.strength })
            });
        }
        info!(spider = %id, preset = ?cfg.preset, "spawned");
        self.roster.insert(id, spider);
        Ok(id)
    }

    pub fn tick(&self) -> u64 {
        self.scheduler.tick()
    }

    /// One fixed tick: due scheduled work first, then every spider in spawn order.
    pub fn step(&mut self) {
        self.scheduler.advance(&mut self.roster);
        self.roster.update(&self.terrain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScheduledAction;

    #[test]
    fn actions_for_unknown_spiders_are_rejected() {
        let cfg = Config {
            actions: vec![ScheduledAction {
                at_tick: 3,
                spider: 5,
                kind: ActionKind::Gallop { enabled: true },
            }],
            ..Config::default()
        };
        let err = Simulation::from_config(&cfg, &EventInbox::default()).err().expect("should fail");
        assert!(err.to_string().contains("spider 5"), "err={err}");
    }

    #[test]
    fn scheduled_action_fires_on_its_tick() {
        let cfg = Config {
            actions: vec![ScheduledAction { at_tick: 3, spider: 0, kind: ActionKind::Gallop { enabled: true } }],
            ..Config::default()
        };
        let mut sim = Simulation::from_config(&cfg, &EventInbox::default()).unwrap();
        let (id, _) = sim.roster.iter().next().unwrap();
        for _ in 0..2 {
            sim.step();
        }
        assert!(!sim.roster.get(id).unwrap().is_gallop());
        sim.step();
        assert_eq!(sim.tick(), 3);
        assert!(sim.roster.get(id).unwrap().is_gallop(), "gallop should switch on at tick 3");
    }

    #[test]
    fn removed_spider_stops_reporting() {
        let inbox = EventInbox::default();
        let mut sim = Simulation::from_config(&Config::default(), &inbox).unwrap();
        let (id, _) = sim.roster.iter().next().unwrap();
        assert!(sim.roster.remove(id).is_some());
        sim.roster.apply(id, ActionKind::Gallop { enabled: true });
        for _ in 0..30 {
            sim.step();
        }
        assert!(inbox.drain().is_empty());
        assert!(sim.roster.is_empty());
    }
}
