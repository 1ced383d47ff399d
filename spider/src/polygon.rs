//! Planar helpers for the support polygon. Points are (x, z) pairs in world space.

use crate::math::Vec2d;

/// Even-odd ray test. Degenerate polygons (fewer than three vertices) contain nothing.
pub fn point_in_polygon(point: Vec2d, polygon: &[Vec2d]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

pub fn nearest_point_on_segment(point: Vec2d, a: Vec2d, b: Vec2d) -> Vec2d {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f64::EPSILON {
        return a;
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest point on the polygon outline (closed loop). A single vertex is its own nearest point.
pub fn nearest_point_in_polygon(point: Vec2d, polygon: &[Vec2d]) -> Option<Vec2d> {
    match polygon.len() {
        0 => None,
        1 => Some(polygon[0]),
        n => (0..n)
            .map(|i| nearest_point_on_segment(point, polygon[i], polygon[(i + 1) % n]))
            .min_by(|p, q| p.distance_squared(point).total_cmp(&q.distance_squared(point))),
    }
}
