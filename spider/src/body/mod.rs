mod dynamics;
mod leg;
mod normal;
mod types;

pub use dynamics::{BodyEnv, SpiderBody};
pub use leg::{Leg, LegTarget};
pub use normal::{legacy_normal, polygon_normal, NormalInfo};
pub use types::{BodyState, LegContext};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gait::{Gait, GaitType};
    use crate::math::{Quatd, Vec3d, UP};
    use crate::options::DebugOptions;
    use crate::plan::{BodyPlan, SegmentPlan};
    use crate::terrain::FlatGround;

    fn quad_plan() -> BodyPlan {
        let segments = || vec![SegmentPlan::new(1.0, crate::math::FORWARD); 2];
        let mut plan = BodyPlan::new();
        plan.add_leg_pair(Vec3d::ZERO, Vec3d::new(1.0, 0.0, 1.0), segments());
        plan.add_leg_pair(Vec3d::ZERO, Vec3d::new(1.0, 0.0, -1.0), segments());
        plan
    }

    fn env<'a>(gait: &'a Gait, debug: &'a DebugOptions, plan: &'a BodyPlan, ground: &'a FlatGround) -> BodyEnv<'a> {
        BodyEnv { gait, lerped: gait.stationary, debug, plan, terrain: ground }
    }

    #[test]
    fn single_grounded_leg_pushes_toward_centre_of_mass() {
        let gait = Gait { stabilization_factor: 0.0, ..Gait::default_walk() };
        let debug = DebugOptions::default();
        let plan = quad_plan();
        let ground = FlatGround::new(0.0);
        let state = BodyState::new(Vec3d::new(0.0, 1.1, 0.0), Quatd::IDENTITY);
        let mut body = SpiderBody::new(&state, &env(&gait, &debug, &plan, &ground));
        for leg in body.legs_mut().iter_mut().skip(1) {
            leg.set_disabled(true);
        }
        let info = polygon_normal(body.legs(), state.position, &gait).expect("one planted leg gives a normal");
        let origin = info.origin.unwrap();
        let com = info.centre_of_mass.unwrap();
        assert!((info.normal.length() - 1.0).abs() < 1e-9);
        assert!((info.normal - (com - origin).normalize()).length() < 1e-9, "info={info:?}");
        assert_eq!(info.contact_polygon.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn centred_body_gets_straight_up_normal() {
        let gait = Gait::default_walk();
        let debug = DebugOptions::default();
        let plan = quad_plan();
        let ground = FlatGround::new(0.0);
        let state = BodyState::new(Vec3d::new(0.0, 1.1, 0.0), Quatd::IDENTITY);
        let body = SpiderBody::new(&state, &env(&gait, &debug, &plan, &ground));
        let info = polygon_normal(body.legs(), state.position, &gait).unwrap();
        assert_eq!(info.normal, UP);
        assert!(legacy_normal(body.legs()).is_some(), "all four feet down satisfies a diagonal");
    }

    #[test]
    fn no_grounded_legs_means_no_normal() {
        let gait = Gait::default_walk();
        let debug = DebugOptions::default();
        let plan = quad_plan();
        let ground = FlatGround::new(0.0);
        let state = BodyState::new(Vec3d::new(0.0, 1.1, 0.0), Quatd::IDENTITY);
        let mut body = SpiderBody::new(&state, &env(&gait, &debug, &plan, &ground));
        for leg in body.legs_mut() {
            leg.set_disabled(true);
        }
        assert!(polygon_normal(body.legs(), state.position, &gait).is_none());
        assert!(legacy_normal(body.legs()).is_none());
    }

    /// Only the front pair planted: the support polygon is the segment z = 1 and the
    /// centre of mass (0, 0.56, 0) sits behind it.
    fn front_pair_normal(gait: &Gait) -> NormalInfo {
        let debug = DebugOptions::default();
        let plan = quad_plan();
        let ground = FlatGround::new(0.0);
        let state = BodyState::new(Vec3d::new(0.0, 1.1, 0.0), Quatd::IDENTITY);
        let mut body = SpiderBody::new(&state, &env(gait, &debug, &plan, &ground));
        for leg in body.legs_mut().iter_mut().skip(2) {
            leg.set_disabled(true);
        }
        polygon_normal(body.legs(), state.position, gait).expect("two planted legs give a normal")
    }

    #[test]
    fn centre_of_mass_outside_polygon_leans_toward_nearest_edge_point() {
        let gait = Gait { stabilization_factor: 0.0, polygon_leeway: 0.0, ..Gait::default_walk() };
        let info = front_pair_normal(&gait);
        let origin = info.origin.unwrap();
        assert!((origin - Vec3d::new(0.0, 0.0, 1.0)).length() < 1e-9, "origin={origin:?}");
        let expected = Vec3d::new(0.0, 0.56, -1.0).normalize();
        assert!((info.normal - expected).length() < 1e-9, "normal={:?}", info.normal);
        assert_eq!(info.contact_polygon.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn leeway_snaps_origin_under_centre_of_mass() {
        let gait = Gait { stabilization_factor: 0.0, polygon_leeway: 1.5, ..Gait::default_walk() };
        let info = front_pair_normal(&gait);
        let origin = info.origin.unwrap();
        assert!((origin - Vec3d::ZERO).length() < 1e-9, "origin={origin:?}");
        assert!((info.normal - UP).length() < 1e-9, "normal={:?}", info.normal);

        let tight = Gait { polygon_leeway: 0.5, ..gait };
        let origin = front_pair_normal(&tight).origin.unwrap();
        assert!((origin.z - 1.0).abs() < 1e-9, "edge farther than the leeway keeps its origin, origin={origin:?}");
    }

    #[test]
    fn stabilization_pulls_centre_of_mass_over_the_origin() {
        let loose = front_pair_normal(&Gait { stabilization_factor: 0.0, polygon_leeway: 0.0, ..Gait::default_walk() });
        let gait = Gait { stabilization_factor: 0.5, polygon_leeway: 0.0, ..Gait::default_walk() };
        let info = front_pair_normal(&gait);
        let com = info.centre_of_mass.unwrap();
        assert!((com - Vec3d::new(0.0, 0.56, 0.5)).length() < 1e-9, "com={com:?}");
        let expected = Vec3d::new(0.0, 0.56, -0.5).normalize();
        assert!((info.normal - expected).length() < 1e-9, "normal={:?}", info.normal);
        assert!(info.normal.y > loose.normal.y, "stabilized push should lean less");
    }

    #[test]
    fn falling_body_lands_and_settles_above_ground() {
        let gait = Gait::default_walk();
        let debug = DebugOptions::default();
        let plan = quad_plan();
        let ground = FlatGround::new(0.0);
        let mut state = BodyState::new(Vec3d::new(0.0, 3.0, 0.0), Quatd::IDENTITY);
        let env = env(&gait, &debug, &plan, &ground);
        let mut body = SpiderBody::new(&state, &env);
        let mut min_y = f64::MAX;
        for _ in 0..200 {
            body.update(&mut state, &env, &GaitType::Walk);
            min_y = min_y.min(state.position.y);
        }
        assert!(min_y >= -1e-9, "body sank below the ground: min_y={min_y}");
        assert!(state.position.y > 0.2 && state.position.y < 2.0, "settled height y={}", state.position.y);
        assert!(state.position.is_finite() && state.velocity.is_finite());
    }

    /// Drops a body with every leg disabled from `start_y` and records its ground hits.
    fn drop_body(start_y: f64, ticks: usize) -> Vec<crate::events::HitGroundEvent> {
        use parking_lot::Mutex;
        use std::sync::Arc;

        let gait = Gait::default_walk();
        let debug = DebugOptions::default();
        let plan = quad_plan();
        let ground = FlatGround::new(0.0);
        let mut state = BodyState::new(Vec3d::new(0.0, start_y, 0.0), Quatd::IDENTITY);
        let env = env(&gait, &debug, &plan, &ground);
        let mut body = SpiderBody::new(&state, &env);
        for leg in body.legs_mut() {
            leg.set_disabled(true);
        }
        let hits = Arc::new(Mutex::new(Vec::new()));
        {
            let hits = hits.clone();
            body.on_hit_ground.subscribe(move |e| hits.lock().push(*e));
        }
        for _ in 0..ticks {
            body.update(&mut state, &env, &GaitType::Walk);
        }
        let hits = hits.lock().clone();
        hits
    }

    #[test]
    fn hard_landing_fires_hit_ground_once() {
        let hits = drop_body(3.0, 120);
        assert_eq!(hits.len(), 1, "one hard landing expected, got {hits:?}");
        assert!(hits[0].impact_speed > 0.5, "impact={}", hits[0].impact_speed);
        assert!(hits[0].position.y.abs() < 1e-9, "hit={:?}", hits[0].position);
    }

    #[test]
    fn gentle_settle_does_not_fire_hit_ground() {
        let hits = drop_body(0.05, 60);
        assert!(hits.is_empty(), "resting contact below the impact threshold, got {hits:?}");
    }
}
