use tracing::trace;

use super::types::LegContext;
use crate::chain::{ChainSegment, KinematicChain};
use crate::events::{EventEmitter, StepEvent};
use crate::math::{
    horizontal_distance, lerp, move_towards, move_towards_vec, rotate_around_y, with_y, yaw_pitch_in_frame,
    yxz, Vec3d, DOWN, FORWARD, UP,
};
use crate::plan::LegPlan;
use crate::zone::{SplitDistance, SplitDistanceZone};

/// Distance under which a swinging foot counts as arrived.
const ARRIVAL_EPSILON: f64 = 0.0001;
/// Grid margin around terrain cell boundaries when scanning for alternative footholds.
const SCAN_MARGIN: f64 = 2.0 / 16.0;

/// Where a foot wants to be this tick. `id` is the 1-based scan candidate, or -1 when
/// the target was not found on the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegTarget {
    pub position: Vec3d,
    pub is_grounded: bool,
    pub id: i32,
}

impl LegTarget {
    fn stranded(position: Vec3d) -> Self {
        Self { position, is_grounded: false, id: -1 }
    }
}

#[derive(Debug)]
pub struct Leg {
    index: usize,
    plan: LegPlan,

    trigger_zone: SplitDistanceZone,
    comfort_zone: SplitDistanceZone,
    ground_position: Option<Vec3d>,
    rest_position: Vec3d,
    look_ahead_position: Vec3d,
    scan_start_position: Vec3d,
    scan_vector: Vec3d,
    attachment_position: Vec3d,

    target: LegTarget,
    end_effector: Vec3d,
    previous_end_effector: Vec3d,
    chain: KinematicChain,

    touching_ground: bool,
    is_moving: bool,
    is_disabled: bool,
    time_since_begin_move: u64,
    time_since_stop_move: u64,
    pending_step: bool,

    pub on_step: EventEmitter<StepEvent>,
}

impl Leg {
    /// Plants the foot on the ground found under its rest position. Without ground in
    /// reach the foot hangs at the rest position and falls with the body until it lands.
    pub fn new(index: usize, plan: LegPlan, ctx: &LegContext<'_>) -> Self {
        let zero_zone = SplitDistanceZone::new(Vec3d::ZERO, SplitDistance::new(0.0, 0.0));
        let mut leg = Self {
            index,
            plan,
            trigger_zone: zero_zone,
            comfort_zone: zero_zone,
            ground_position: None,
            rest_position: Vec3d::ZERO,
            look_ahead_position: Vec3d::ZERO,
            scan_start_position: Vec3d::ZERO,
            scan_vector: Vec3d::ZERO,
            attachment_position: Vec3d::ZERO,
            target: LegTarget::stranded(Vec3d::ZERO),
            end_effector: Vec3d::ZERO,
            previous_end_effector: Vec3d::ZERO,
            chain: KinematicChain::default(),
            touching_ground: true,
            is_moving: false,
            is_disabled: false,
            time_since_begin_move: 0,
            time_since_stop_move: 0,
            pending_step: false,
            on_step: EventEmitter::new(),
        };
        leg.update_memo(None, ctx);
        leg.target = leg.locate_ground(ctx).unwrap_or_else(|| leg.stranded_target());
        leg.end_effector = leg.target.position;
        leg.previous_end_effector = leg.end_effector;
        leg.touching_ground = leg.target.is_grounded;
        leg.bind_chain(ctx);
        leg
    }

    pub fn index(&self) -> usize { self.index }
    pub fn plan(&self) -> &LegPlan { &self.plan }
    pub fn trigger_zone(&self) -> &SplitDistanceZone { &self.trigger_zone }
    pub fn comfort_zone(&self) -> &SplitDistanceZone { &self.comfort_zone }
    pub fn ground_position(&self) -> Option<Vec3d> { self.ground_position }
    pub fn rest_position(&self) -> Vec3d { self.rest_position }
    pub fn look_ahead_position(&self) -> Vec3d { self.look_ahead_position }
    pub fn scan_start_position(&self) -> Vec3d { self.scan_start_position }
    pub fn scan_vector(&self) -> Vec3d { self.scan_vector }
    pub fn attachment_position(&self) -> Vec3d { self.attachment_position }
    pub fn target(&self) -> &LegTarget { &self.target }
    pub fn end_effector(&self) -> Vec3d { self.end_effector }
    pub fn previous_end_effector(&self) -> Vec3d { self.previous_end_effector }
    pub fn chain(&self) -> &KinematicChain { &self.chain }
    pub fn touching_ground(&self) -> bool { self.touching_ground }
    pub fn is_moving(&self) -> bool { self.is_moving }
    pub fn is_disabled(&self) -> bool { self.is_disabled }
    pub fn time_since_begin_move(&self) -> u64 { self.time_since_begin_move }
    pub fn time_since_stop_move(&self) -> u64 { self.time_since_stop_move }

    /// Disabling mid-swing is fine: the next update retargets the foot.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.is_disabled = disabled;
    }

    /// Planted and bearing weight.
    pub fn is_grounded(&self) -> bool {
        self.touching_ground && !self.is_moving && !self.is_disabled
    }

    pub fn is_outside_trigger_zone(&self) -> bool {
        !self.trigger_zone.contains(self.end_effector)
    }

    pub fn is_uncomfortable(&self) -> bool {
        !self.comfort_zone.contains(self.end_effector)
    }

    /// Recomputes the per-tick reference points from the body pose.
    pub fn update_memo(&mut self, plan: Option<&LegPlan>, ctx: &LegContext<'_>) {
        if let Some(plan) = plan {
            if *plan != self.plan {
                self.plan = plan.clone();
            }
        }
        let body = ctx.body;
        let gait = ctx.gait;
        let body_height = ctx.lerped.body_height;
        let pivot = gait.scan_pivot_mode.resolve(body);
        let up = pivot * UP;

        self.rest_position = pivot * (self.plan.rest_position - UP * body_height) + body.position;
        self.trigger_zone = SplitDistanceZone::new(self.rest_position, ctx.lerped.trigger_zone);

        let comfort_center = with_y(self.rest_position, lerp(self.rest_position.y, body.position.y, 0.5));
        let comfort_size = SplitDistance::new(
            gait.comfort_zone.horizontal,
            gait.comfort_zone.vertical + (body.position.y - self.rest_position.y).max(0.0),
        );
        self.comfort_zone = SplitDistanceZone::new(comfort_center, comfort_size);

        self.look_ahead_position = self.look_ahead(ctx);
        self.scan_start_position = self.look_ahead_position + up * (body_height * 1.6);
        self.scan_vector = up * (-body_height * 3.5);
        self.attachment_position = body.orientation * self.plan.attachment_position + body.position;
    }

    fn look_ahead(&self, ctx: &LegContext<'_>) -> Vec3d {
        let body = ctx.body;
        if !body.is_walking {
            return self.rest_position;
        }
        let direction = body.velocity.try_normalize().unwrap_or_else(|| body.forward());
        let ahead = self.rest_position
            + direction * (self.trigger_zone.horizontal() * ctx.gait.leg_look_ahead_fraction);
        rotate_around_y(ahead, body.yaw_rate(), body.position)
    }

    fn cast(&self, ctx: &LegContext<'_>, x: f64, z: f64, id: i32) -> Option<LegTarget> {
        let start = Vec3d::new(x, self.scan_start_position.y, z);
        let length = self.scan_vector.length();
        ctx.terrain
            .raycast_ground(start, self.scan_vector, length)
            .map(|position| LegTarget { position, is_grounded: true, id })
    }

    fn locate_ground(&self, ctx: &LegContext<'_>) -> Option<LegTarget> {
        let look_ahead = self.look_ahead_position;
        let (x, z) = (self.scan_start_position.x, self.scan_start_position.z);
        let main = self.cast(ctx, x, z, 1);

        if !ctx.gait.leg_scan_alternative_ground {
            return main;
        }

        if let Some(candidate) = main {
            let y = candidate.position.y;
            let in_band = y >= look_ahead.y - 0.24 && y <= look_ahead.y + 1.5;
            if in_band && self.comfort_zone.contains(candidate.position) {
                return Some(candidate);
            }
        }

        let xs = [x.floor() - SCAN_MARGIN, x, x.ceil() + SCAN_MARGIN];
        let zs = [z.floor() - SCAN_MARGIN, z, z.ceil() + SCAN_MARGIN];
        let mut id = 1;
        let mut candidates = Vec::with_capacity(9);
        for (ix, cx) in xs.iter().enumerate() {
            for (iz, cz) in zs.iter().enumerate() {
                if ix == 1 && iz == 1 {
                    candidates.extend(main);
                    continue;
                }
                id += 1;
                candidates.extend(self.cast(ctx, *cx, *cz, id));
            }
        }

        let mut preferred = look_ahead;
        if ctx.terrain.is_solid(look_ahead + ctx.body.forward()) {
            preferred.y += ctx.gait.leg_scan_height_bias;
        }

        let best = candidates
            .into_iter()
            .min_by(|a, b| {
                a.position.distance_squared(preferred).total_cmp(&b.position.distance_squared(preferred))
            })?;
        self.comfort_zone.contains(best.position).then_some(best)
    }

    fn stranded_target(&self) -> LegTarget {
        LegTarget::stranded(self.look_ahead_position)
    }

    fn disabled_target(&self, ctx: &LegContext<'_>) -> LegTarget {
        let body_height = ctx.lerped.body_height;
        let mut position = self.look_ahead_position + ctx.body.up() * (body_height * 0.5);
        let min_y = self.ground_position.map_or(f64::MIN, |g| g.y) + body_height * 0.1;
        position.y = position.y.max(min_y);
        LegTarget::stranded(position)
    }

    /// First half of the movement update: retarget, follow the body, advance any swing.
    /// Returns true when the leg is idle and wants to start a step, so the caller
    /// should consult the coordination policy before [`Leg::finish_update`].
    pub fn begin_update(&mut self, ctx: &LegContext<'_>) -> bool {
        self.previous_end_effector = self.end_effector;
        self.pending_step = false;
        self.time_since_begin_move += 1;
        self.time_since_stop_move += 1;

        let ground = self.locate_ground(ctx);
        self.ground_position = ground.map(|g| g.position);

        if self.is_disabled {
            self.target = self.disabled_target(ctx);
        } else {
            if let Some(ground) = ground {
                self.target = ground;
            }
            if !self.target.is_grounded || !self.comfort_zone.contains(self.target.position) {
                self.target = self.stranded_target();
            }
        }

        let body = ctx.body;
        if !self.is_grounded() {
            self.end_effector += body.velocity;
            self.end_effector = rotate_around_y(self.end_effector, body.yaw_rate(), body.position);
        }

        if !self.touching_ground {
            // cast at least as far as the foot travelled this tick
            let reach = DOWN * body.velocity.length().max(1.0);
            if let Some(collision) = ctx.terrain.resolve_collision(self.end_effector, reach) {
                self.pending_step = true;
                self.touching_ground = true;
                self.end_effector.y = collision.position.y;
            }
        }

        if self.is_moving {
            let gait = ctx.gait;
            let target = self.target.position;
            self.end_effector = move_towards_vec(self.end_effector, target, gait.leg_move_speed);

            if horizontal_distance(self.end_effector, target) > gait.leg_drop_distance {
                let lifted = target.y + gait.leg_lift_height;
                self.end_effector.y = move_towards(self.end_effector.y, lifted, gait.leg_move_speed);
            }

            if self.end_effector.distance(target) < ARRIVAL_EPSILON {
                self.is_moving = false;
                self.touching_ground = ctx.terrain.is_on_ground(self.end_effector, body.down());
                self.pending_step = self.touching_ground;
            }
            return false;
        }

        if self.is_disabled {
            return false;
        }
        self.is_outside_trigger_zone()
    }

    /// Second half: start a step if allowed, publish it, then pose the chain.
    pub fn finish_update(&mut self, allowed: bool, ctx: &LegContext<'_>) {
        if !self.is_moving {
            let start = if self.is_disabled {
                self.end_effector.distance(self.target.position) >= ARRIVAL_EPSILON
            } else {
                allowed && self.is_outside_trigger_zone()
            };
            if start {
                self.is_moving = true;
                self.time_since_begin_move = 0;
                trace!(leg = self.index, target = ?self.target.position, "leg lifting");
            }
        }

        if self.pending_step {
            self.pending_step = false;
            self.time_since_stop_move = 0;
            self.on_step.emit(&StepEvent { leg: self.index, position: self.end_effector });
        }

        self.bind_chain(ctx);
    }

    fn bind_chain(&mut self, ctx: &LegContext<'_>) {
        if self.chain.segments.len() != self.plan.segments.len() {
            let direction = self.plan.rest_position.try_normalize().unwrap_or(FORWARD);
            let mut stride = 0.0;
            let segments = self
                .plan
                .segments
                .iter()
                .map(|s| {
                    stride += s.length;
                    ChainSegment::new(ctx.body.position + direction * stride, s.length, s.init_direction)
                })
                .collect();
            self.chain = KinematicChain::new(self.attachment_position, segments);
        } else {
            for (segment, plan) in self.chain.segments.iter_mut().zip(&self.plan.segments) {
                segment.length = plan.length;
                segment.init_direction = plan.init_direction;
            }
        }

        self.chain.root = self.attachment_position;

        if ctx.gait.straighten_legs {
            let pivot = ctx.gait.leg_chain_pivot_mode.resolve(ctx.body);
            let (yaw, pitch) = yaw_pitch_in_frame(self.end_effector - self.attachment_position, pivot);
            let orientation = pivot * yxz(yaw, pitch + ctx.gait.leg_straighten_rotation, 0.0);
            self.chain.straighten_direction(orientation);
        }

        if !ctx.debug.disable_fabrik {
            self.chain.fabrik(self.end_effector);
        }
    }

    /// Shifts every stored position by `offset`.
    pub fn translate(&mut self, offset: Vec3d) {
        self.ground_position = self.ground_position.map(|g| g + offset);
        self.rest_position += offset;
        self.look_ahead_position += offset;
        self.scan_start_position += offset;
        self.attachment_position += offset;
        self.trigger_zone = self.trigger_zone.translated(offset);
        self.comfort_zone = self.comfort_zone.translated(offset);
        self.target.position += offset;
        self.end_effector += offset;
        self.previous_end_effector += offset;
        self.chain.root += offset;
        for segment in &mut self.chain.segments {
            segment.position += offset;
        }
    }
}
