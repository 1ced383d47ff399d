//! Support normal: the direction the legs can push the body in.

use super::leg::Leg;
use crate::coordination::lookup;
use crate::gait::Gait;
use crate::math::{average, horizontal, horizontal_distance, lerp, with_y, Vec3d, UP};
use crate::polygon::{nearest_point_in_polygon, point_in_polygon};

/// Most fields other than `normal` exist for debug rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalInfo {
    pub normal: Vec3d,
    pub origin: Option<Vec3d>,
    pub centre_of_mass: Option<Vec3d>,
    pub contact_polygon: Option<Vec<Vec3d>>,
}

impl NormalInfo {
    pub fn up() -> Self {
        Self { normal: UP, origin: None, centre_of_mass: None, contact_polygon: None }
    }
}

fn direction_or_up(v: Vec3d) -> Vec3d {
    v.try_normalize().unwrap_or(UP)
}

/// Up whenever some diagonal pair of legs is fully planted.
pub fn legacy_normal(legs: &[Leg]) -> Option<NormalInfo> {
    lookup::diagonal_pairs(legs.len())
        .into_iter()
        .any(|(a, b)| legs[a].is_grounded() && legs[b].is_grounded())
        .then(NormalInfo::up)
}

pub fn polygon_normal(legs: &[Leg], body_position: Vec3d, gait: &Gait) -> Option<NormalInfo> {
    let feet: Vec<Vec3d> = legs.iter().map(Leg::end_effector).collect();
    let mut centre_of_mass = average(&feet).lerp(body_position, 0.5);
    centre_of_mass.y += 0.01;

    let polygon: Vec<Vec3d> = lookup::polygon_order(legs.len())
        .into_iter()
        .map(|i| &legs[i])
        .filter(|leg| leg.is_grounded())
        .map(Leg::end_effector)
        .collect();
    if polygon.is_empty() {
        return None;
    }
    let polygon_y = polygon.iter().map(|p| p.y).sum::<f64>() / polygon.len() as f64;

    if polygon.len() == 1 {
        let origin = polygon[0];
        let mut info = NormalInfo {
            normal: direction_or_up(centre_of_mass - origin),
            origin: Some(origin),
            centre_of_mass: Some(centre_of_mass),
            contact_polygon: Some(polygon),
        };
        stabilize(&mut info, gait);
        return Some(info);
    }

    let flat: Vec<_> = polygon.iter().copied().map(horizontal).collect();
    let com_flat = horizontal(centre_of_mass);

    if point_in_polygon(com_flat, &flat) {
        return Some(NormalInfo {
            normal: UP,
            origin: Some(Vec3d::new(centre_of_mass.x, polygon_y, centre_of_mass.z)),
            centre_of_mass: Some(centre_of_mass),
            contact_polygon: Some(polygon),
        });
    }

    let nearest = nearest_point_in_polygon(com_flat, &flat)?;
    let origin = Vec3d::new(nearest.x, polygon_y, nearest.y);
    let mut info = NormalInfo {
        normal: direction_or_up(centre_of_mass - origin),
        origin: Some(origin),
        centre_of_mass: Some(centre_of_mass),
        contact_polygon: Some(polygon),
    };
    stabilize(&mut info, gait);
    Some(info)
}

/// Pulls the centre of mass over the origin so the push leans less.
fn stabilize(info: &mut NormalInfo, gait: &Gait) {
    let (Some(origin), Some(centre)) = (info.origin, info.centre_of_mass) else { return };

    if horizontal_distance(origin, centre) < gait.polygon_leeway {
        info.origin = Some(Vec3d::new(centre.x, origin.y, centre.z));
    }

    let target = with_y(origin, centre.y);
    let stabilized = Vec3d::new(
        lerp(centre.x, target.x, gait.stabilization_factor),
        lerp(centre.y, target.y, gait.stabilization_factor),
        lerp(centre.z, target.z, gait.stabilization_factor),
    );
    info.centre_of_mass = Some(stabilized);
    let new_origin = info.origin.unwrap_or(origin);
    info.normal = direction_or_up(stabilized - new_origin);
}
