//! The creature as a whole: behaviour, steering and the per-tick cycle.

use tracing::{debug, info};

use crate::behaviour::Behaviour;
use crate::body::{BodyEnv, BodyState, SpiderBody};
use crate::error::PlanError;
use crate::events::{EventEmitter, KnockbackEvent, StepEvent, Subscription};
use crate::gait::{Gait, LerpGait};
use crate::math::{
    average, euler_yxz, horizontal_length, lerp, move_towards, move_towards_vec, pitch_of, with_y, wrap_angle,
    yaw_of, yxz, Quatd, Vec3d, UP,
};
use crate::options::SpiderOptions;
use crate::pose::{LegPose, SpiderPose};
use crate::terrain::GroundQuery;

/// Yaw error below which the creature counts as facing its goal.
const YAW_TOLERANCE: f64 = 0.01;

#[derive(Debug)]
pub struct Spider {
    state: BodyState,
    options: SpiderOptions,
    gallop: bool,
    lerped_gait: LerpGait,
    preferred_pitch: f64,
    preferred_roll: f64,
    body: SpiderBody,
    behaviour: Behaviour,
    pub on_knockback: EventEmitter<KnockbackEvent>,
}

impl Spider {
    /// Fails if the body plan cannot be animated. Each foot starts on the ground found
    /// under it in `terrain`, or hangs at its rest position when there is none in reach.
    pub fn new(
        position: Vec3d,
        orientation: Quatd,
        options: SpiderOptions,
        terrain: &dyn GroundQuery,
    ) -> Result<Self, PlanError> {
        options.body_plan.validate()?;
        let state = BodyState::new(position, orientation);
        let lerped_gait = options.walk_gait.stationary;
        let body = {
            let env = BodyEnv {
                gait: &options.walk_gait,
                lerped: lerped_gait,
                debug: &options.debug,
                plan: &options.body_plan,
                terrain,
            };
            SpiderBody::new(&state, &env)
        };
        let (_, pitch, roll) = euler_yxz(orientation);
        info!(legs = options.body_plan.legs.len(), ?position, "spider created");
        Ok(Self {
            state,
            options,
            gallop: false,
            lerped_gait,
            preferred_pitch: pitch,
            preferred_roll: roll,
            body,
            behaviour: Behaviour::StayStill,
            on_knockback: EventEmitter::new(),
        })
    }

    pub fn state(&self) -> &BodyState { &self.state }
    pub fn body(&self) -> &SpiderBody { &self.body }
    pub fn body_mut(&mut self) -> &mut SpiderBody { &mut self.body }
    pub fn options(&self) -> &SpiderOptions { &self.options }
    pub fn lerped_gait(&self) -> LerpGait { self.lerped_gait }
    pub fn behaviour(&self) -> Behaviour { self.behaviour }
    pub fn is_gallop(&self) -> bool { self.gallop }
    pub fn preferred_pitch(&self) -> f64 { self.preferred_pitch }
    pub fn preferred_roll(&self) -> f64 { self.preferred_roll }

    /// Body plan edits take effect on the next update; a changed segment count rebuilds
    /// that leg's chain.
    pub fn options_mut(&mut self) -> &mut SpiderOptions {
        &mut self.options
    }

    /// Active gait: gallop or walk.
    pub fn gait(&self) -> &Gait {
        self.options.gait(self.gallop)
    }

    pub fn set_gallop(&mut self, gallop: bool) {
        self.gallop = gallop;
    }

    pub fn set_behaviour(&mut self, behaviour: Behaviour) {
        debug!(?behaviour, "behaviour changed");
        self.behaviour = behaviour;
    }

    /// Returns false when `index` is not a leg.
    pub fn set_leg_disabled(&mut self, index: usize, disabled: bool) -> bool {
        match self.body.legs_mut().get_mut(index) {
            Some(leg) => {
                leg.set_disabled(disabled);
                true
            }
            None => false,
        }
    }

    /// Subscribes a copy of `handler` to every leg's step event.
    pub fn subscribe_steps(
        &mut self,
        handler: impl FnMut(&StepEvent) + Clone + Send + Sync + 'static,
    ) -> Vec<Subscription> {
        self.body.legs_mut().iter_mut().map(|leg| leg.on_step.subscribe(handler.clone())).collect()
    }

    pub fn update(&mut self, terrain: &dyn GroundQuery) {
        self.update_preferred_angles();
        self.lerped_gait = self.gait().lerped(self.state.velocity.length(), self.state.is_rotating_yaw);
        self.apply_behaviour();

        let gait = self.options.gait(self.gallop);
        let env = BodyEnv {
            gait,
            lerped: self.lerped_gait,
            debug: &self.options.debug,
            plan: &self.options.body_plan,
            terrain,
        };
        self.body.update(&mut self.state, &env, &gait.gait_type);
    }

    fn apply_behaviour(&mut self) {
        let max_speed = self.gait().max_speed;
        match self.behaviour {
            Behaviour::StayStill => {
                self.walk_at(Vec3d::ZERO);
                self.rotate_towards(self.state.forward());
            }
            Behaviour::Target { target, distance } => {
                let offset = with_y(target - self.state.position, 0.0);
                let heading = offset.try_normalize().filter(|_| horizontal_length(offset) > distance);
                if let Some(heading) = heading {
                    self.rotate_towards(heading);
                    self.walk_at(heading * max_speed);
                } else {
                    self.walk_at(Vec3d::ZERO);
                    self.rotate_towards(self.state.forward());
                }
            }
            Behaviour::Direction { target_direction, walk_direction } => {
                self.rotate_towards(target_direction);
                self.walk_at(walk_direction.clamp_length_max(1.0) * max_speed);
            }
        }
    }

    /// Accelerates horizontal velocity toward `target_velocity`. Slower while any planted
    /// foot is outside its comfort zone.
    pub fn walk_at(&mut self, target_velocity: Vec3d) {
        let gait = self.options.gait(self.gallop);
        let mut target = with_y(target_velocity, 0.0);
        let uncomfortable = self
            .body
            .legs()
            .iter()
            .any(|leg| !leg.is_moving() && !leg.is_disabled() && leg.is_uncomfortable());
        if uncomfortable {
            target *= gait.uncomfortable_speed_multiplier;
        }
        let current = with_y(self.state.velocity, 0.0);
        let next = move_towards_vec(current, target, gait.walk_acceleration);
        self.state.velocity.x = next.x;
        self.state.velocity.z = next.z;
        self.state.is_walking = next.x != 0.0 || next.z != 0.0;
    }

    /// Steers the yaw rate toward facing `direction` (only its horizontal part counts).
    pub fn rotate_towards(&mut self, direction: Vec3d) {
        let Some(direction) = with_y(direction, 0.0).try_normalize() else {
            self.state.is_rotating_yaw = false;
            return;
        };
        let gait = self.options.gait(self.gallop);
        let error = wrap_angle(yaw_of(direction) - self.state.yaw());
        let desired = error.clamp(-gait.rotate_speed, gait.rotate_speed);
        let rate = &mut self.state.rotational_velocity.y;
        *rate = move_towards(*rate, desired, gait.rotate_acceleration);
        self.state.is_rotating_yaw = error.abs() > YAW_TOLERANCE;
    }

    /// Adds a rotation of `angle` about `axis` to the current rotational velocity.
    pub fn accelerate_rotation(&mut self, axis: Vec3d, angle: f64) {
        let Some(axis) = axis.try_normalize() else { return };
        let rv = self.state.rotational_velocity;
        let combined = Quatd::from_axis_angle(axis, angle) * yxz(rv.y, rv.x, rv.z);
        let (yaw, pitch, roll) = euler_yxz(combined);
        self.state.rotational_velocity = Vec3d::new(pitch, yaw, roll);
    }

    /// Shoves the body along `direction` and spins it depending on where the blow landed.
    pub fn apply_knockback(&mut self, direction: Vec3d, hit_from: Vec3d) {
        let Some(direction) = direction.try_normalize() else { return };
        let gait = self.options.gait(self.gallop);
        let (strength, rotational) = (gait.knock_back, gait.rotational_knock_back);

        self.state.velocity += direction * strength;

        let hit_direction = (self.state.position - hit_from).try_normalize().unwrap_or(UP);
        let angle = hit_direction.angle_between(UP);
        self.accelerate_rotation(UP.cross(direction), angle * rotational);

        debug!(?direction, strength, "knockback");
        self.on_knockback.emit(&KnockbackEvent { direction, strength });
    }

    /// Moves the creature without simulating the trip; feet and chains keep their shape.
    pub fn teleport(&mut self, position: Vec3d) {
        let offset = position - self.state.position;
        self.state.position = position;
        self.body.translate(offset);
    }

    fn update_preferred_angles(&mut self) {
        let gait = self.options.gait(self.gallop);
        let (yaw, _, _) = euler_yxz(self.state.orientation);

        if gait.disable_advanced_rotation {
            self.preferred_pitch = 0.0;
            self.preferred_roll = 0.0;
            self.state.preferred_orientation = yxz(yaw, 0.0, 0.0);
            return;
        }

        let legs = self.body.legs();
        if legs.len() < 2 {
            return;
        }
        let foothold = |i: usize| legs[i].ground_position().unwrap_or_else(|| legs[i].rest_position());
        let n = legs.len();

        let forward = average(&[foothold(0) - foothold(n - 2), foothold(1) - foothold(n - 1)]);
        let sideways: Vec3d = (0..n / 2).map(|pair| foothold(pair * 2 + 1) - foothold(pair * 2)).sum();

        let (fraction, breakpoint, bias) =
            (gait.preferred_rotation_lerp_fraction, gait.prefer_level_breakpoint, gait.prefer_level_bias);
        let mut pitch = lerp(pitch_of(forward), self.preferred_pitch, fraction);
        let mut roll = lerp(pitch_of(sideways), self.preferred_roll, fraction);
        if pitch.abs() < breakpoint {
            pitch *= 1.0 - bias;
        }
        if roll.abs() < breakpoint {
            roll *= 1.0 - bias;
        }

        self.preferred_pitch = pitch;
        self.preferred_roll = roll;
        self.state.preferred_orientation = yxz(yaw, pitch, roll);
    }

    pub fn pose(&self) -> SpiderPose {
        let pivot = self.gait().leg_chain_pivot_mode.resolve(&self.state);
        SpiderPose {
            position: self.state.position,
            orientation: self.state.orientation,
            velocity: self.state.velocity,
            preferred_orientation: self.state.preferred_orientation,
            on_ground: self.body.on_ground(),
            normal: self.body.normal().map(|n| n.normal),
            legs: self.body.legs().iter().map(|leg| LegPose::from_leg(leg, pivot)).collect(),
        }
    }
}
