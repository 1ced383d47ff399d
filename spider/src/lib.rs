//! Procedural animation for many-legged creatures.
//!
//! This crate is pure simulation: no I/O and no engine types. A host supplies a
//! [`GroundQuery`] and calls [`Spider::update`] once per tick; the creature places
//! its feet, solves its leg chains with FABRIK and keeps its body balanced over
//! the support polygon. Render consumers read [`Spider::pose`].
//!
//! Conventions: +Y up, +Z forward, +X left; legs come in front-to-back pairs with
//! even indices on the left (+X) side.

pub mod math;
pub use math::{Quatd, Vec2d, Vec3d, DOWN, FORWARD, LEFT, RIGHT, UP};
pub mod zone;
pub use zone::{SplitDistance, SplitDistanceZone};
pub mod polygon;

pub mod chain;
pub use chain::{ChainSegment, FabrikStage, FabrikStepper, KinematicChain};

pub mod gait;
pub use gait::{Gait, GaitType, LerpGait, PivotMode};
pub mod coordination;
pub use coordination::LegCoordination;

mod error;
pub use error::PlanError;
pub mod plan;
pub use plan::{BodyPlan, LegPlan, SegmentPlan};
mod options;
pub use options::{DebugOptions, SpiderOptions};
pub mod presets;
pub use presets::Preset;

pub mod terrain;
pub use terrain::{CollisionResult, FlatGround, GroundQuery};
pub mod events;
pub use events::{EventEmitter, HitGroundEvent, KnockbackEvent, StepEvent, Subscription};
pub mod schedule;
pub use schedule::{Scheduler, Series, TaskContext, TaskFlow, TaskHandle};

pub mod body;
pub use body::{BodyState, Leg, LegTarget, NormalInfo, SpiderBody};
mod behaviour;
pub use behaviour::Behaviour;
mod pose;
pub use pose::{LegPose, SegmentPose, SpiderPose};
mod spider;
pub use spider::Spider;
