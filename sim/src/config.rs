use std::path::Path;

use anyhow::{Context, Result};
use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};
use spider::{Behaviour, Preset, Vec3d};
use tracing::warn;

use crate::terrain::TerrainConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct Config {
    /// Ticks to simulate before the app exits.
    pub ticks: u64,
    /// Progress log period in ticks; 0 disables it.
    pub log_every: u64,
    /// Render frame period in ticks; 0 disables frames.
    pub frame_every: u64,
    pub terrain: TerrainConfig,
    pub spiders: Vec<SpiderConfig>,
    pub actions: Vec<ScheduledAction>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ticks: 600,
            log_every: 100,
            frame_every: 1,
            terrain: TerrainConfig::default(),
            spiders: vec![SpiderConfig::default()],
            actions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiderConfig {
    pub preset: Preset,
    pub segment_count: usize,
    pub segment_length: f64,
    pub scale: f64,
    pub gallop: bool,
    pub spawn: Vec3d,
    /// Yaw in radians.
    pub heading: f64,
    pub behaviour: Behaviour,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            preset: Preset::Hexapod,
            segment_count: 3,
            segment_length: 1.0,
            scale: 1.0,
            gallop: false,
            spawn: Vec3d::new(0.0, 1.5, 0.0),
            heading: 0.0,
            behaviour: Behaviour::StayStill,
        }
    }
}

/// Something that happens to one spider at a fixed tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledAction {
    pub at_tick: u64,
    /// Index into `spiders`.
    pub spider: usize,
    #[serde(flatten)]
    pub kind: ActionKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    Knockback { direction: Vec3d, hit_from: Vec3d },
    DisableLeg { leg: usize, disabled: bool },
    Behaviour { behaviour: Behaviour },
    Gallop { enabled: bool },
    Teleport { position: Vec3d },
}

/// Reads `path` as TOML. A missing file falls back to defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        warn!(path = %path.display(), "config not found, using defaults");
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_config(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_config(text: &str) -> Result<Config> {
    Ok(toml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let cfg = parse_config(
            r#"
            ticks = 50

            [terrain]
            kind = "steps"
            step_height = 0.25
            step_length = 2.0

            [[spiders]]
            preset = "quad_bot"
            spawn = [1.0, 2.0, 3.0]
            behaviour = { kind = "target", target = [10.0, 0.0, 0.0], distance = 1.0 }

            [[actions]]
            at_tick = 20
            spider = 0
            kind = "disable_leg"
            leg = 1
            disabled = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.ticks, 50);
        assert_eq!(cfg.log_every, 100, "unset keys keep defaults");
        assert!(matches!(cfg.terrain, TerrainConfig::Steps { step_length, .. } if step_length == 2.0));
        let spider = &cfg.spiders[0];
        assert_eq!(spider.preset, Preset::QuadBot);
        assert_eq!(spider.segment_count, 3);
        assert_eq!(spider.spawn, Vec3d::new(1.0, 2.0, 3.0));
        assert!(matches!(spider.behaviour, Behaviour::Target { distance, .. } if distance == 1.0));
        assert!(matches!(cfg.actions[0].kind, ActionKind::DisableLeg { leg: 1, disabled: true }));
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let err = parse_config("[[spiders]]\npreset = \"centipede\"\n").unwrap_err();
        assert!(err.to_string().contains("centipede"), "err={err}");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = load_config(Path::new("/nonexistent/spider-sim.toml")).unwrap();
        assert_eq!(cfg.spiders.len(), 1);
        assert_eq!(cfg.ticks, Config::default().ticks);
    }
}
