use bevy_math::{DQuat, DVec2, DVec3, EulerRot};

pub type Vec3d = DVec3;
pub type Vec2d = DVec2;
pub type Quatd = DQuat;

// Right-handed basis: +Y up, +Z forward, so +X is the creature's left
pub const UP: Vec3d = DVec3::Y;
pub const DOWN: Vec3d = DVec3::NEG_Y;
pub const FORWARD: Vec3d = DVec3::Z;
pub const LEFT: Vec3d = DVec3::X;
pub const RIGHT: Vec3d = DVec3::NEG_X;

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Steps `current` toward `target` by at most `speed`, landing exactly on it when close.
#[inline]
pub fn move_towards(current: f64, target: f64, speed: f64) -> f64 {
    let distance = target - current;
    if distance.abs() < speed { target } else { current + speed * distance.signum() }
}

pub fn move_towards_vec(current: Vec3d, target: Vec3d, step: f64) -> Vec3d {
    let diff = target - current;
    let distance = diff.length();
    if distance <= step || distance <= 0.0 {
        target
    } else {
        current + diff * (step / distance)
    }
}

#[inline]
pub fn horizontal_distance(a: Vec3d, b: Vec3d) -> f64 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

#[inline]
pub fn vertical_distance(a: Vec3d, b: Vec3d) -> f64 {
    (a.y - b.y).abs()
}

#[inline]
pub fn horizontal_length(v: Vec3d) -> f64 {
    (v.x * v.x + v.z * v.z).sqrt()
}

#[inline]
pub fn horizontal(v: Vec3d) -> Vec2d {
    Vec2d::new(v.x, v.z)
}

#[inline]
pub fn with_y(v: Vec3d, y: f64) -> Vec3d {
    Vec3d::new(v.x, y, v.z)
}

/// Mean of the points; zero for an empty slice.
pub fn average(points: &[Vec3d]) -> Vec3d {
    if points.is_empty() {
        return Vec3d::ZERO;
    }
    points.iter().copied().sum::<Vec3d>() / points.len() as f64
}

/// Rotates `point` about the vertical axis through `origin`, same handedness as
/// `Quatd::from_rotation_y`.
pub fn rotate_around_y(point: Vec3d, angle: f64, origin: Vec3d) -> Vec3d {
    if angle == 0.0 {
        return point;
    }
    origin + Quatd::from_rotation_y(angle) * (point - origin)
}

/// Yaw that turns `FORWARD` toward `direction` (atan2 of x over z). Zero for a zero vector.
#[inline]
pub fn yaw_of(direction: Vec3d) -> f64 {
    direction.x.atan2(direction.z)
}

/// Pitch of `direction` in the YXZ convention: positive pitches the nose down.
#[inline]
pub fn pitch_of(direction: Vec3d) -> f64 {
    (-direction.y).atan2(horizontal_length(direction))
}

#[inline]
pub fn yxz(yaw: f64, pitch: f64, roll: f64) -> Quatd {
    Quatd::from_euler(EulerRot::YXZ, yaw, pitch, roll)
}

/// Returns `(yaw, pitch, roll)`.
#[inline]
pub fn euler_yxz(q: Quatd) -> (f64, f64, f64) {
    q.to_euler(EulerRot::YXZ)
}

/// Yaw and pitch of `direction` measured in the frame of `pivot`.
pub fn yaw_pitch_in_frame(direction: Vec3d, pivot: Quatd) -> (f64, f64) {
    let local = pivot.inverse() * direction;
    (yaw_of(local), pitch_of(local))
}

/// Shortest-arc rotation from `from` to `to`; identity when either vector is degenerate.
pub fn rotation_between(from: Vec3d, to: Vec3d) -> Quatd {
    match (from.try_normalize(), to.try_normalize()) {
        (Some(a), Some(b)) => {
            let q = Quatd::from_rotation_arc(a, b);
            if q.is_finite() { q.normalize() } else { Quatd::IDENTITY }
        }
        _ => Quatd::IDENTITY,
    }
}

/// Wraps an angle into `[-PI, PI]`.
pub fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    }
    if a < -PI {
        a += TAU;
    }
    a
}
