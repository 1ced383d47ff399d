use tracing::debug;

use super::leg::Leg;
use super::normal::{legacy_normal, polygon_normal, NormalInfo};
use super::types::{BodyState, LegContext};
use crate::coordination::LegCoordination;
use crate::events::{EventEmitter, HitGroundEvent};
use crate::gait::{Gait, LerpGait};
use crate::math::{horizontal_length, lerp, yxz, Vec3d, UP};
use crate::options::DebugOptions;
use crate::plan::BodyPlan;
use crate::terrain::GroundQuery;

/// Drag multiplier applied while the torso itself rests on the ground.
const BODY_GROUND_DRAG: f64 = 0.5;

/// Per-tick inputs the body reads but does not own.
#[derive(Clone, Copy)]
pub struct BodyEnv<'a> {
    pub gait: &'a Gait,
    pub lerped: LerpGait,
    pub debug: &'a DebugOptions,
    pub plan: &'a BodyPlan,
    pub terrain: &'a dyn GroundQuery,
}

impl<'a> BodyEnv<'a> {
    pub fn leg_context<'b>(&self, body: &'b BodyState) -> LegContext<'b>
    where
        'a: 'b,
    {
        LegContext { body, gait: self.gait, lerped: self.lerped, debug: self.debug, terrain: self.terrain }
    }
}

/// The torso plus its legs: integrates motion and keeps the support normal current.
#[derive(Debug)]
pub struct SpiderBody {
    legs: Vec<Leg>,
    normal: Option<NormalInfo>,
    normal_acceleration: Vec3d,
    on_ground: bool,
    pub on_hit_ground: EventEmitter<HitGroundEvent>,
}

impl SpiderBody {
    pub fn new(state: &BodyState, env: &BodyEnv<'_>) -> Self {
        let ctx = env.leg_context(state);
        let legs = env.plan.legs.iter().enumerate().map(|(i, plan)| Leg::new(i, plan.clone(), &ctx)).collect();
        Self {
            legs,
            normal: None,
            normal_acceleration: Vec3d::ZERO,
            on_ground: false,
            on_hit_ground: EventEmitter::new(),
        }
    }

    pub fn legs(&self) -> &[Leg] { &self.legs }
    pub fn legs_mut(&mut self) -> &mut [Leg] { &mut self.legs }
    pub fn normal(&self) -> Option<&NormalInfo> { self.normal.as_ref() }
    pub fn normal_acceleration(&self) -> Vec3d { self.normal_acceleration }
    pub fn on_ground(&self) -> bool { self.on_ground }

    pub fn grounded_fraction(&self) -> f64 {
        if self.legs.is_empty() {
            return 0.0;
        }
        self.legs.iter().filter(|l| l.is_grounded()).count() as f64 / self.legs.len() as f64
    }

    pub fn update(&mut self, state: &mut BodyState, env: &BodyEnv<'_>, coordination: &impl LegCoordination) {
        let gait = env.gait;
        let grounded = self.grounded_fraction();

        state.velocity.y -= gait.gravity_acceleration;
        state.velocity.y *= 1.0 - gait.air_drag_coefficient;

        let rv = state.rotational_velocity;
        state.orientation = (yxz(rv.y, rv.x, rv.z) * state.orientation).normalize();

        if !state.is_walking {
            let drag = 1.0 - gait.ground_drag_coefficient * grounded;
            state.velocity.x *= drag;
            state.velocity.z *= drag;
        }
        state.rotational_velocity *= 1.0 - gait.rotational_drag_coefficient * grounded;

        if self.on_ground {
            state.velocity.x *= BODY_GROUND_DRAG;
            state.velocity.z *= BODY_GROUND_DRAG;
            state.rotational_velocity *= BODY_GROUND_DRAG;
        }

        self.normal = if gait.use_legacy_normal_force {
            legacy_normal(&self.legs)
        } else {
            polygon_normal(&self.legs, state.position, gait)
        };

        self.normal_acceleration = Vec3d::ZERO;
        if let Some(normal) = &self.normal {
            let preferred_y = self.preferred_y(state, env);
            let wanted = (preferred_y - state.position.y - state.velocity.y).max(0.0);
            let capable = gait.body_height_correction_acceleration * grounded;
            let mut acceleration = normal.normal * wanted.min(capable);
            // past this lean the body falls over regardless
            if horizontal_length(acceleration) > acceleration.y {
                acceleration = Vec3d::ZERO;
            }
            self.normal_acceleration = acceleration;
            state.velocity += acceleration;
        }

        state.position += state.velocity;

        let probe = Vec3d::new(0.0, (-state.velocity.y.abs()).min(-1.0), 0.0);
        if let Some(collision) = env.terrain.resolve_collision(state.position, probe) {
            self.on_ground = true;
            let threshold = gait.gravity_acceleration * 2.0 * (1.0 - gait.air_drag_coefficient);
            if collision.offset.length() > threshold {
                let event = HitGroundEvent { position: collision.position, impact_speed: -state.velocity.y.min(0.0) };
                debug!(impact = event.impact_speed, y = collision.position.y, "body hit ground");
                self.on_hit_ground.emit(&event);
            }
            state.position.y = collision.position.y;
            if state.velocity.y < 0.0 {
                state.velocity.y *= -gait.bounce_factor;
            }
            if state.velocity.y < gait.gravity_acceleration {
                state.velocity.y = 0.0;
            }
        } else {
            self.on_ground = env.terrain.is_on_ground(state.position, state.down());
        }

        let state: &BodyState = state;
        let ctx = env.leg_context(state);
        let order = coordination.update_order(self.legs.len(), state);
        for &i in &order {
            self.legs[i].update_memo(env.plan.legs.get(i), &ctx);
        }
        for &i in &order {
            let wants_to_move = self.legs[i].begin_update(&ctx);
            let allowed = wants_to_move && coordination.can_move_leg(i, &self.legs, state);
            self.legs[i].finish_update(allowed, &ctx);
        }
    }

    fn preferred_y(&self, state: &BodyState, env: &BodyEnv<'_>) -> f64 {
        let gait = env.gait;
        let body_height = env.lerped.body_height;
        let look_ahead = state.position + state.velocity;
        let down = state.preferred_orientation * -UP;
        let ground_y = env
            .terrain
            .raycast_ground(look_ahead, down, body_height)
            .map_or(f64::MIN, |hit| hit.y);

        let average_y = if self.legs.is_empty() {
            state.position.y
        } else {
            self.legs.iter().map(|l| l.target().position.y).sum::<f64>() / self.legs.len() as f64 + body_height
        };

        let pivot = gait.leg_chain_pivot_mode.resolve(state);
        let clearance = (pivot * UP * gait.max_body_distance_from_ground).y;
        let target_y = average_y.max(ground_y + clearance);
        lerp(state.position.y, target_y, gait.body_height_correction_factor)
    }

    pub fn translate(&mut self, offset: Vec3d) {
        for leg in &mut self.legs {
            leg.translate(offset);
        }
    }
}
