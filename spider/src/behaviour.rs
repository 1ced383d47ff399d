use serde::{Deserialize, Serialize};

use crate::math::Vec3d;

/// What the creature is trying to do; evaluated once per tick before the body moves.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Behaviour {
    /// Brake to a halt and stop turning.
    #[default]
    StayStill,
    /// Walk toward `target`, stopping once horizontally within `distance`.
    Target { target: Vec3d, distance: f64 },
    /// Face `target_direction` while walking along `walk_direction` at full speed.
    /// A zero walk direction turns in place.
    Direction { target_direction: Vec3d, walk_direction: Vec3d },
}
