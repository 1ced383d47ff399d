//! The world as the creature sees it: ground raycasts and collision probes.

use crate::math::Vec3d;

/// Distance used to decide whether a point rests on the ground.
pub const ON_GROUND_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Where the probe came to rest.
    pub position: Vec3d,
    /// Displacement from the probed position to `position`.
    pub offset: Vec3d,
}

/// Ground queries injected by the host world.
pub trait GroundQuery {
    /// First solid surface along `direction` (any length) within `max_distance` of `origin`.
    /// An origin already inside solid ground hits immediately.
    fn raycast_ground(&self, origin: Vec3d, direction: Vec3d, max_distance: f64) -> Option<Vec3d>;

    fn is_solid(&self, position: Vec3d) -> bool;

    fn is_on_ground(&self, position: Vec3d, down: Vec3d) -> bool {
        self.raycast_ground(position, down, ON_GROUND_EPSILON).is_some()
    }

    /// Pushes `position` out of the ground along `direction`. The probe starts one
    /// `direction` back, so penetration up to `|direction|` is recovered.
    fn resolve_collision(&self, position: Vec3d, direction: Vec3d) -> Option<CollisionResult> {
        let length = direction.length();
        if length <= 0.0 {
            return None;
        }
        let hit = self.raycast_ground(position - direction, direction, length)?;
        Some(CollisionResult { position: hit, offset: hit - position })
    }
}

/// An infinite horizontal plane at `height`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlatGround {
    pub height: f64,
}

impl FlatGround {
    pub fn new(height: f64) -> Self {
        Self { height }
    }
}

impl GroundQuery for FlatGround {
    fn raycast_ground(&self, origin: Vec3d, direction: Vec3d, max_distance: f64) -> Option<Vec3d> {
        if origin.y <= self.height {
            return Some(origin);
        }
        let dir = direction.try_normalize()?;
        if dir.y >= 0.0 {
            return None;
        }
        let t = (origin.y - self.height) / -dir.y;
        (t <= max_distance).then(|| {
            let hit = origin + dir * t;
            Vec3d::new(hit.x, self.height, hit.z)
        })
    }

    fn is_solid(&self, position: Vec3d) -> bool {
        position.y < self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::DOWN;

    #[test]
    fn flat_ground_raycast_hits_plane() {
        let ground = FlatGround::new(1.0);
        let hit = ground.raycast_ground(Vec3d::new(2.0, 3.0, -1.0), DOWN * 5.0, 5.0).unwrap();
        assert!((hit - Vec3d::new(2.0, 1.0, -1.0)).length() < 1e-12, "hit={hit:?}");
        assert!(ground.raycast_ground(Vec3d::new(0.0, 3.0, 0.0), DOWN, 1.5).is_none(), "out of range");
        assert!(ground.raycast_ground(Vec3d::new(0.0, 3.0, 0.0), Vec3d::Y, 10.0).is_none(), "pointing away");
    }

    #[test]
    fn collision_lifts_penetrating_point() {
        let ground = FlatGround::new(0.0);
        let c = ground.resolve_collision(Vec3d::new(0.0, -0.3, 0.0), DOWN).unwrap();
        assert!((c.position.y).abs() < 1e-12 && (c.offset.y - 0.3).abs() < 1e-12, "c={c:?}");
        assert!(ground.resolve_collision(Vec3d::new(0.0, 0.5, 0.0), DOWN).is_none());
        assert!(ground.is_on_ground(Vec3d::new(0.0, 0.0005, 0.0), DOWN));
        assert!(!ground.is_on_ground(Vec3d::new(0.0, 0.01, 0.0), DOWN));
    }
}
