use serde::{Deserialize, Serialize};

use crate::math::{horizontal_distance, lerp, vertical_distance, Vec3d};

/// A pair of radii measured independently in the horizontal (XZ) plane and along Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitDistance {
    pub horizontal: f64,
    pub vertical: f64,
}

impl SplitDistance {
    pub const fn new(horizontal: f64, vertical: f64) -> Self {
        Self { horizontal, vertical }
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.horizontal * factor, self.vertical * factor)
    }

    pub fn lerp(self, target: SplitDistance, t: f64) -> Self {
        Self::new(lerp(self.horizontal, target.horizontal, t), lerp(self.vertical, target.vertical, t))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitDistanceZone {
    pub center: Vec3d,
    pub size: SplitDistance,
}

impl SplitDistanceZone {
    pub const fn new(center: Vec3d, size: SplitDistance) -> Self {
        Self { center, size }
    }

    /// Inclusive on both axes.
    pub fn contains(&self, point: Vec3d) -> bool {
        horizontal_distance(self.center, point) <= self.size.horizontal
            && vertical_distance(self.center, point) <= self.size.vertical
    }

    pub fn translated(&self, offset: Vec3d) -> Self {
        Self::new(self.center + offset, self.size)
    }

    pub fn horizontal(&self) -> f64 { self.size.horizontal }
    pub fn vertical(&self) -> f64 { self.size.vertical }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_checks_axes_independently() {
        let zone = SplitDistanceZone::new(Vec3d::ZERO, SplitDistance::new(1.0, 0.5));
        assert!(zone.contains(Vec3d::new(1.0, 0.5, 0.0)), "boundary is inside");
        assert!(!zone.contains(Vec3d::new(0.0, 0.6, 0.0)), "too high");
        assert!(!zone.contains(Vec3d::new(0.8, 0.0, 0.8)), "too far horizontally");
        let moved = zone.translated(Vec3d::new(0.0, 1.0, 0.0));
        assert!(moved.contains(Vec3d::new(0.0, 1.2, 0.0)));
    }

    #[test]
    fn split_distance_lerps_each_axis() {
        let d = SplitDistance::new(0.5, 1.0).lerp(SplitDistance::new(1.5, 2.0), 0.5);
        assert!((d.horizontal - 1.0).abs() < 1e-12 && (d.vertical - 1.5).abs() < 1e-12, "d={d:?}");
    }
}
