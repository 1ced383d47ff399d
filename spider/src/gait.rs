//! Locomotion tunables. Lengths are in world units, speeds in units per tick and
//! angles in radians.

use serde::{Deserialize, Serialize};

use crate::body::BodyState;
use crate::math::{euler_yxz, lerp, yxz, Quatd};
use crate::zone::SplitDistance;

/// The part of a gait that blends between standing and moving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LerpGait {
    pub body_height: f64,
    pub trigger_zone: SplitDistance,
}

impl LerpGait {
    pub const fn new(body_height: f64, trigger_zone: SplitDistance) -> Self {
        Self { body_height, trigger_zone }
    }

    pub fn lerp(self, target: LerpGait, t: f64) -> Self {
        Self {
            body_height: lerp(self.body_height, target.body_height, t),
            trigger_zone: self.trigger_zone.lerp(target.trigger_zone, t),
        }
    }

    pub fn scale(self, factor: f64) -> Self {
        Self { body_height: self.body_height * factor, trigger_zone: self.trigger_zone.scale(factor) }
    }
}

/// Which frame the legs measure against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotMode {
    /// Body heading only; pitch and roll ignored.
    YawOnly,
    Orientation,
    PreferredOrientation,
}

impl PivotMode {
    pub fn resolve(self, body: &BodyState) -> Quatd {
        match self {
            PivotMode::YawOnly => {
                let (yaw, _, _) = euler_yxz(body.orientation);
                yxz(yaw, 0.0, 0.0)
            }
            PivotMode::Orientation => body.orientation,
            PivotMode::PreferredOrientation => body.preferred_orientation,
        }
    }
}

/// Leg coordination policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaitType {
    #[default]
    Walk,
    Gallop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gait {
    pub stationary: LerpGait,
    pub moving: LerpGait,

    pub max_speed: f64,
    pub walk_acceleration: f64,
    pub rotate_speed: f64,
    pub rotate_acceleration: f64,
    pub rotational_drag_coefficient: f64,

    pub leg_move_speed: f64,
    pub leg_lift_height: f64,
    pub leg_drop_distance: f64,
    pub leg_look_ahead_fraction: f64,
    pub leg_scan_alternative_ground: bool,
    pub leg_scan_height_bias: f64,
    /// Added to the pitch of a straightened leg before FABRIK refines it.
    pub leg_straighten_rotation: f64,
    pub straighten_legs: bool,
    pub comfort_zone: SplitDistance,

    pub ground_drag_coefficient: f64,
    pub air_drag_coefficient: f64,
    pub bounce_factor: f64,
    pub gravity_acceleration: f64,
    pub body_height_correction_acceleration: f64,
    pub body_height_correction_factor: f64,
    pub max_body_distance_from_ground: f64,
    pub uncomfortable_speed_multiplier: f64,
    pub knock_back: f64,
    pub rotational_knock_back: f64,

    pub use_legacy_normal_force: bool,
    pub polygon_leeway: f64,
    pub stabilization_factor: f64,

    pub scan_pivot_mode: PivotMode,
    pub leg_chain_pivot_mode: PivotMode,
    pub preferred_rotation_lerp_fraction: f64,
    pub prefer_level_breakpoint: f64,
    pub prefer_level_bias: f64,
    pub disable_advanced_rotation: bool,

    pub gait_type: GaitType,
}

impl Default for Gait {
    fn default() -> Self {
        Self::default_walk()
    }
}

impl Gait {
    pub fn default_walk() -> Self {
        let max_speed = 0.15;
        let gravity_acceleration = 0.08;
        let leg_lift_height = 0.35;
        Self {
            stationary: LerpGait::new(1.1, SplitDistance::new(0.25, 1.5)),
            moving: LerpGait::new(1.1, SplitDistance::new(0.8, 1.5)),
            max_speed,
            walk_acceleration: max_speed / 4.0,
            rotate_speed: 0.15,
            rotate_acceleration: 0.15 / 4.0,
            rotational_drag_coefficient: 0.2,
            leg_move_speed: max_speed * 3.0,
            leg_lift_height,
            leg_drop_distance: leg_lift_height,
            leg_look_ahead_fraction: 0.6,
            leg_scan_alternative_ground: true,
            leg_scan_height_bias: 0.5,
            leg_straighten_rotation: (-80.0f64).to_radians(),
            straighten_legs: true,
            comfort_zone: SplitDistance::new(1.2, 1.6),
            ground_drag_coefficient: 0.2,
            air_drag_coefficient: 0.02,
            bounce_factor: 0.5,
            gravity_acceleration,
            body_height_correction_acceleration: gravity_acceleration * 4.0,
            body_height_correction_factor: 0.25,
            max_body_distance_from_ground: 0.55,
            uncomfortable_speed_multiplier: 0.6,
            knock_back: 0.3,
            rotational_knock_back: 0.3,
            use_legacy_normal_force: false,
            polygon_leeway: 0.0,
            stabilization_factor: 0.7,
            scan_pivot_mode: PivotMode::YawOnly,
            leg_chain_pivot_mode: PivotMode::Orientation,
            preferred_rotation_lerp_fraction: 0.3,
            prefer_level_breakpoint: 10.0f64.to_radians(),
            prefer_level_bias: 0.5,
            disable_advanced_rotation: false,
            gait_type: GaitType::Walk,
        }
    }

    pub fn default_gallop() -> Self {
        let max_speed = 0.4;
        Self {
            moving: LerpGait::new(1.1, SplitDistance::new(1.4, 1.5)),
            max_speed,
            walk_acceleration: 0.1,
            leg_move_speed: 1.0,
            leg_lift_height: 0.6,
            leg_drop_distance: 0.6,
            rotate_speed: 0.25,
            uncomfortable_speed_multiplier: 0.8,
            gait_type: GaitType::Gallop,
            ..Self::default_walk()
        }
    }

    /// Rescales every length, speed and acceleration in place.
    pub fn scale(&mut self, factor: f64) {
        self.stationary = self.stationary.scale(factor);
        self.moving = self.moving.scale(factor);
        self.max_speed *= factor;
        self.walk_acceleration *= factor;
        self.leg_move_speed *= factor;
        self.leg_lift_height *= factor;
        self.leg_drop_distance *= factor;
        self.leg_scan_height_bias *= factor;
        self.comfort_zone = self.comfort_zone.scale(factor);
        self.gravity_acceleration *= factor;
        self.body_height_correction_acceleration *= factor;
        self.max_body_distance_from_ground *= factor;
        self.knock_back *= factor;
    }

    /// Profile for this tick: fully moving while turning, otherwise blended by speed.
    pub fn lerped(&self, speed: f64, is_rotating_yaw: bool) -> LerpGait {
        if is_rotating_yaw {
            return self.moving;
        }
        let fraction = if self.max_speed > 0.0 { (speed / self.max_speed).min(1.0) } else { 1.0 };
        self.stationary.lerp(self.moving, fraction)
    }
}
