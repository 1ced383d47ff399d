//! Ready-made body plans. `segment_count` segments per leg, lengths scaled by `segment_length`.

use serde::{Deserialize, Serialize};

use crate::math::{Quatd, Vec3d, FORWARD};
use crate::options::SpiderOptions;
use crate::plan::{BodyPlan, SegmentPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Biped,
    Quadruped,
    Hexapod,
    Octopod,
    QuadBot,
    HexBot,
    OctoBot,
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Preset::Biped,
        Preset::Quadruped,
        Preset::Hexapod,
        Preset::Octopod,
        Preset::QuadBot,
        Preset::HexBot,
        Preset::OctoBot,
    ];

    pub fn options(self, segment_count: usize, segment_length: f64) -> SpiderOptions {
        let build = match self {
            Preset::Biped => biped,
            Preset::Quadruped => quadruped,
            Preset::Hexapod => hexapod,
            Preset::Octopod => octopod,
            Preset::QuadBot => quad_bot,
            Preset::HexBot => hex_bot,
            Preset::OctoBot => octo_bot,
        };
        build(segment_count, segment_length)
    }
}

fn equal_length(segment_count: usize, length: f64) -> Vec<SegmentPlan> {
    vec![SegmentPlan::new(length, FORWARD); segment_count]
}

/// First segment half length and pitched down 60 degrees, second at 0.8.
fn robot_segments(segment_count: usize, length: f64) -> Vec<SegmentPlan> {
    (0..segment_count)
        .map(|index| match index {
            0 => SegmentPlan::new(length * 0.5, Quatd::from_rotation_x(std::f64::consts::FRAC_PI_3) * FORWARD),
            1 => SegmentPlan::new(length * 0.8, FORWARD),
            _ => SegmentPlan::new(length, FORWARD),
        })
        .collect()
}

fn with_pairs(pairs: &[(Vec3d, Vec3d, Vec<SegmentPlan>)]) -> SpiderOptions {
    let mut plan = BodyPlan::new();
    for (root, rest, segments) in pairs {
        plan.add_leg_pair(*root, *rest, segments.clone());
    }
    SpiderOptions::with_body_plan(plan)
}

fn v(x: f64, y: f64, z: f64) -> Vec3d {
    Vec3d::new(x, y, z)
}

pub fn biped(segment_count: usize, segment_length: f64) -> SpiderOptions {
    with_pairs(&[(Vec3d::ZERO, v(1.0, 0.0, 0.0), equal_length(segment_count, segment_length))])
}

pub fn quadruped(segment_count: usize, segment_length: f64) -> SpiderOptions {
    with_pairs(&[
        (Vec3d::ZERO, v(0.9, 0.0, 0.9), equal_length(segment_count, 0.9 * segment_length)),
        (Vec3d::ZERO, v(1.0, 0.0, -1.1), equal_length(segment_count, 1.2 * segment_length)),
    ])
}

pub fn hexapod(segment_count: usize, segment_length: f64) -> SpiderOptions {
    with_pairs(&[
        (v(0.0, 0.0, 0.1), v(1.0, 0.0, 1.1), equal_length(segment_count, 1.1 * segment_length)),
        (v(0.0, 0.0, 0.0), v(1.3, 0.0, -0.3), equal_length(segment_count, 1.1 * segment_length)),
        (v(0.0, 0.0, -0.1), v(1.2, 0.0, -2.0), equal_length(segment_count, 1.6 * segment_length)),
    ])
}

pub fn octopod(segment_count: usize, segment_length: f64) -> SpiderOptions {
    with_pairs(&[
        (v(0.0, 0.0, 0.1), v(1.0, 0.0, 1.6), equal_length(segment_count, 1.1 * segment_length)),
        (v(0.0, 0.0, 0.0), v(1.3, 0.0, 0.4), equal_length(segment_count, 1.0 * segment_length)),
        (v(0.0, 0.0, -0.1), v(1.3, 0.0, -0.9), equal_length(segment_count, 1.1 * segment_length)),
        (v(0.0, 0.0, -0.2), v(1.1, 0.0, -2.5), equal_length(segment_count, 1.6 * segment_length)),
    ])
}

const BOT_ROOT_Y: f64 = -0.35;
const BOT_SPREAD: f64 = 1.3;
const BOT_SEGMENT: f64 = 0.7;

pub fn quad_bot(segment_count: usize, segment_length: f64) -> SpiderOptions {
    let len = |k: f64| robot_segments(segment_count, k * BOT_SEGMENT * segment_length);
    with_pairs(&[
        (v(0.2, BOT_ROOT_Y, 0.2), v(BOT_SPREAD * 1.0, 0.0, 1.0), len(0.9)),
        (v(0.2, BOT_ROOT_Y, -0.2), v(BOT_SPREAD * 1.1, 0.0, -1.2), len(1.2)),
    ])
}

pub fn hex_bot(segment_count: usize, segment_length: f64) -> SpiderOptions {
    let len = |k: f64| robot_segments(segment_count, k * BOT_SEGMENT * segment_length);
    with_pairs(&[
        (v(0.2, BOT_ROOT_Y, 0.2), v(BOT_SPREAD * 1.0, 0.0, 1.3), len(1.1)),
        (v(0.2, BOT_ROOT_Y, 0.0), v(BOT_SPREAD * 1.2, 0.0, -0.1), len(1.1)),
        (v(0.2, BOT_ROOT_Y, -0.2), v(BOT_SPREAD * 1.1, 0.0, -1.6), len(1.3)),
    ])
}

pub fn octo_bot(segment_count: usize, segment_length: f64) -> SpiderOptions {
    let len = |k: f64| robot_segments(segment_count, k * BOT_SEGMENT * segment_length);
    with_pairs(&[
        (v(0.2, BOT_ROOT_Y, 0.3), v(BOT_SPREAD * 1.0, 0.0, 1.3), len(1.1)),
        (v(0.2, BOT_ROOT_Y, 0.1), v(BOT_SPREAD * 1.2, 0.0, 0.5), len(1.0)),
        (v(0.2, BOT_ROOT_Y, 0.1), v(BOT_SPREAD * 1.2, 0.0, -0.7), len(1.1)),
        (v(0.2, BOT_ROOT_Y, -0.3), v(BOT_SPREAD * 1.1, 0.0, -1.6), len(1.3)),
    ])
}
