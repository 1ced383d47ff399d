//! Body layout: where legs attach, where they rest and how their segments are built.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::math::{Vec3d, FORWARD};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlan {
    pub length: f64,
    #[serde(default = "default_init_direction")]
    pub init_direction: Vec3d,
}

fn default_init_direction() -> Vec3d {
    FORWARD
}

impl SegmentPlan {
    pub fn new(length: f64, init_direction: Vec3d) -> Self {
        Self { length, init_direction }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegPlan {
    /// Body-local point the chain hangs from.
    pub attachment_position: Vec3d,
    /// Body-local resting foot position, measured from the body at standing height.
    pub rest_position: Vec3d,
    pub segments: Vec<SegmentPlan>,
}

impl LegPlan {
    pub fn new(attachment_position: Vec3d, rest_position: Vec3d, segments: Vec<SegmentPlan>) -> Self {
        Self { attachment_position, rest_position, segments }
    }

    pub fn reach(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }

    /// Same leg reflected across the body's sagittal plane.
    pub fn mirrored(&self) -> Self {
        let flip = |v: Vec3d| Vec3d::new(-v.x, v.y, v.z);
        Self::new(flip(self.attachment_position), flip(self.rest_position), self.segments.clone())
    }
}

/// Legs are ordered front to back in left/right pairs: even indices on the left,
/// odd on the right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyPlan {
    pub scale: f64,
    pub legs: Vec<LegPlan>,
}

impl Default for BodyPlan {
    fn default() -> Self {
        Self { scale: 1.0, legs: Vec::new() }
    }
}

impl BodyPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `root`/`rest` as the left leg and their mirror image as the right leg.
    pub fn add_leg_pair(&mut self, root: Vec3d, rest: Vec3d, segments: Vec<SegmentPlan>) {
        let left = LegPlan::new(root, rest, segments);
        let right = left.mirrored();
        self.legs.push(left);
        self.legs.push(right);
    }

    pub fn scale(&mut self, factor: f64) {
        self.scale *= factor;
        for leg in &mut self.legs {
            leg.attachment_position *= factor;
            leg.rest_position *= factor;
            for segment in &mut leg.segments {
                segment.length *= factor;
            }
        }
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(PlanError::InvalidScale(self.scale));
        }
        if self.legs.is_empty() {
            return Err(PlanError::NoLegs);
        }
        for (leg_index, leg) in self.legs.iter().enumerate() {
            if !(leg.attachment_position.is_finite() && leg.rest_position.is_finite()) {
                return Err(PlanError::NonFinitePosition { leg: leg_index });
            }
            if leg.segments.is_empty() {
                return Err(PlanError::EmptyLeg { leg: leg_index });
            }
            for (segment, s) in leg.segments.iter().enumerate() {
                if !(s.length.is_finite() && s.length > 0.0) {
                    return Err(PlanError::InvalidSegmentLength { leg: leg_index, segment, length: s.length });
                }
                if !s.init_direction.is_finite() || s.init_direction.length_squared() <= f64::EPSILON {
                    return Err(PlanError::InvalidDirection { leg: leg_index, segment });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_pair() -> BodyPlan {
        let mut plan = BodyPlan::new();
        plan.add_leg_pair(
            Vec3d::new(0.2, 0.0, 0.1),
            Vec3d::new(1.0, 0.0, 0.5),
            vec![SegmentPlan::new(0.5, FORWARD), SegmentPlan::new(0.7, FORWARD)],
        );
        plan
    }

    #[test]
    fn leg_pairs_are_mirrored_across_x() {
        let plan = one_pair();
        assert_eq!(plan.legs.len(), 2);
        assert_eq!(plan.legs[1].rest_position, Vec3d::new(-1.0, 0.0, 0.5));
        assert_eq!(plan.legs[1].attachment_position, Vec3d::new(-0.2, 0.0, 0.1));
    }

    #[test]
    fn scale_multiplies_positions_and_lengths() {
        let mut plan = one_pair();
        plan.scale(2.0);
        assert_eq!(plan.scale, 2.0);
        assert_eq!(plan.legs[0].rest_position, Vec3d::new(2.0, 0.0, 1.0));
        assert_eq!(plan.legs[0].attachment_position, Vec3d::new(0.4, 0.0, 0.2));
        assert!((plan.legs[1].reach() - 2.4).abs() < 1e-12);
    }

    #[test]
    fn validation_rejects_broken_plans() {
        assert_eq!(BodyPlan::new().validate(), Err(PlanError::NoLegs));
        assert!(one_pair().validate().is_ok());

        let mut plan = one_pair();
        plan.legs[1].segments.clear();
        assert_eq!(plan.validate(), Err(PlanError::EmptyLeg { leg: 1 }));

        let mut plan = one_pair();
        plan.legs[0].segments[1].length = 0.0;
        assert!(matches!(plan.validate(), Err(PlanError::InvalidSegmentLength { leg: 0, segment: 1, .. })));

        let mut plan = one_pair();
        plan.legs[0].segments[0].init_direction = Vec3d::ZERO;
        assert_eq!(plan.validate(), Err(PlanError::InvalidDirection { leg: 0, segment: 0 }));
    }
}
