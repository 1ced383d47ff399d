use serde::{Deserialize, Serialize};

use crate::gait::{Gait, LerpGait};
use crate::math::{euler_yxz, Quatd, Vec3d, DOWN, FORWARD, UP};
use crate::options::DebugOptions;
use crate::terrain::GroundQuery;

/// Kinematic state of the body root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub position: Vec3d,
    pub orientation: Quatd,
    pub velocity: Vec3d,
    /// Euler rates in radians per tick: x = pitch, y = yaw, z = roll.
    pub rotational_velocity: Vec3d,
    pub is_walking: bool,
    pub is_rotating_yaw: bool,
    pub preferred_orientation: Quatd,
}

impl BodyState {
    pub fn new(position: Vec3d, orientation: Quatd) -> Self {
        Self {
            position,
            orientation,
            velocity: Vec3d::ZERO,
            rotational_velocity: Vec3d::ZERO,
            is_walking: false,
            is_rotating_yaw: false,
            preferred_orientation: orientation,
        }
    }

    pub fn forward(&self) -> Vec3d { self.orientation * FORWARD }
    pub fn up(&self) -> Vec3d { self.orientation * UP }
    pub fn down(&self) -> Vec3d { self.orientation * DOWN }

    pub fn yaw(&self) -> f64 {
        euler_yxz(self.orientation).0
    }

    pub fn yaw_rate(&self) -> f64 {
        self.rotational_velocity.y
    }
}

/// Read-only view handed to every leg call during a tick.
#[derive(Clone, Copy)]
pub struct LegContext<'a> {
    pub body: &'a BodyState,
    pub gait: &'a Gait,
    pub lerped: LerpGait,
    pub debug: &'a DebugOptions,
    pub terrain: &'a dyn GroundQuery,
}
