//! Render data: everything a consumer needs to draw the creature for one tick.

use serde::{Deserialize, Serialize};

use crate::body::Leg;
use crate::math::{Quatd, Vec3d};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPose {
    pub start: Vec3d,
    pub end: Vec3d,
    /// +Z of this rotation points from `start` to `end`.
    pub orientation: Quatd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegPose {
    pub index: usize,
    pub end_effector: Vec3d,
    pub target: Vec3d,
    pub is_moving: bool,
    pub is_grounded: bool,
    pub is_disabled: bool,
    pub segments: Vec<SegmentPose>,
}

impl LegPose {
    pub fn from_leg(leg: &Leg, pivot: Quatd) -> Self {
        let chain = leg.chain();
        let rotations = chain.rotations(pivot);
        let mut start = chain.root;
        let segments = chain
            .segments
            .iter()
            .zip(rotations)
            .map(|(segment, orientation)| {
                let pose = SegmentPose { start, end: segment.position, orientation };
                start = segment.position;
                pose
            })
            .collect();
        Self {
            index: leg.index(),
            end_effector: leg.end_effector(),
            target: leg.target().position,
            is_moving: leg.is_moving(),
            is_grounded: leg.is_grounded(),
            is_disabled: leg.is_disabled(),
            segments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiderPose {
    pub position: Vec3d,
    pub orientation: Quatd,
    pub velocity: Vec3d,
    pub preferred_orientation: Quatd,
    pub on_ground: bool,
    pub normal: Option<Vec3d>,
    pub legs: Vec<LegPose>,
}

impl SpiderPose {
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.orientation.is_finite()
            && self.legs.iter().all(|leg| {
                leg.end_effector.is_finite()
                    && leg.segments.iter().all(|s| s.start.is_finite() && s.end.is_finite() && s.orientation.is_finite())
            })
    }
}
