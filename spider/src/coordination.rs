//! Which legs may lift off, and in what order legs are processed.

use crate::body::{BodyState, Leg};
use crate::gait::GaitType;

/// Index arithmetic for legs laid out in front-to-back left/right pairs.
pub mod lookup {
    pub fn is_left(index: usize) -> bool {
        index % 2 == 0
    }

    pub fn is_right(index: usize) -> bool {
        !is_left(index)
    }

    pub fn pair(index: usize) -> usize {
        index / 2
    }

    /// The leg on the other side of the same pair.
    pub fn mirror(index: usize) -> usize {
        index ^ 1
    }

    pub fn front(index: usize) -> Option<usize> {
        index.checked_sub(2)
    }

    pub fn back(index: usize, count: usize) -> Option<usize> {
        (index + 2 < count).then_some(index + 2)
    }

    /// Front, back and mirror neighbours that exist.
    pub fn adjacent(index: usize, count: usize) -> impl Iterator<Item = usize> {
        let mirror = (mirror(index) < count).then_some(mirror(index));
        [front(index), back(index, count), mirror].into_iter().flatten()
    }

    /// Diagonal groups alternate sides from one pair to the next, so a quadruped's
    /// front-left and back-right legs share a group.
    pub fn in_primary_group(index: usize) -> bool {
        is_left(index) == (pair(index) % 2 == 0)
    }

    pub fn diagonal_pairs(count: usize) -> Vec<(usize, usize)> {
        (0..count)
            .filter_map(|i| back(i, count).map(|b| (i, mirror(b))))
            .filter(|&(_, other)| other < count)
            .collect()
    }

    /// Left legs front to back, then right legs back to front: a closed support loop.
    pub fn polygon_order(count: usize) -> Vec<usize> {
        let lefts = (0..count).filter(|&i| is_left(i));
        let rights = (0..count).filter(|&i| is_right(i)).rev();
        lefts.chain(rights).collect()
    }
}

/// Leg coordination policy consulted by the body every tick.
pub trait LegCoordination {
    /// Whether leg `index`, currently idle and wanting to step, may start moving.
    fn can_move_leg(&self, index: usize, legs: &[Leg], body: &BodyState) -> bool;

    fn update_order(&self, leg_count: usize, body: &BodyState) -> Vec<usize>;
}

fn is_busy(leg: &Leg) -> bool {
    leg.is_moving() && !leg.is_disabled()
}

fn walk_can_move(index: usize, legs: &[Leg]) -> bool {
    lookup::adjacent(index, legs.len()).all(|i| !is_busy(&legs[i]))
}

impl LegCoordination for GaitType {
    fn can_move_leg(&self, index: usize, legs: &[Leg], body: &BodyState) -> bool {
        match self {
            GaitType::Gallop if body.is_walking => {
                let count = legs.len();
                let neighbours_still = [lookup::front(index), lookup::back(index, count)]
                    .into_iter()
                    .flatten()
                    .all(|i| !is_busy(&legs[i]));
                let mirror = lookup::mirror(index);
                let mirror_ready = legs
                    .get(mirror)
                    .map_or(true, |m| m.is_disabled() || m.is_moving() || m.is_outside_trigger_zone());
                neighbours_still && mirror_ready
            }
            _ => walk_can_move(index, legs),
        }
    }

    fn update_order(&self, leg_count: usize, body: &BodyState) -> Vec<usize> {
        match self {
            GaitType::Gallop if body.is_walking => (0..leg_count).collect(),
            _ => {
                let (first, second): (Vec<usize>, Vec<usize>) =
                    (0..leg_count).partition(|&i| lookup::in_primary_group(i));
                first.into_iter().chain(second).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::lookup::*;
    use super::*;
    use crate::math::{Quatd, Vec3d};

    #[test]
    fn lookup_neighbours() {
        assert_eq!(mirror(4), 5);
        assert_eq!(mirror(5), 4);
        assert_eq!(front(1), None);
        assert_eq!(back(5, 6), None);
        let mut adj: Vec<usize> = adjacent(2, 8).collect();
        adj.sort();
        assert_eq!(adj, vec![0, 3, 4]);
    }

    #[test]
    fn diagonal_groups_alternate_by_pair() {
        let body = BodyState::new(Vec3d::ZERO, Quatd::IDENTITY);
        assert_eq!(GaitType::Walk.update_order(4, &body), vec![0, 3, 1, 2]);
        assert_eq!(GaitType::Walk.update_order(6, &body), vec![0, 3, 4, 1, 2, 5]);
        assert_eq!(diagonal_pairs(4), vec![(0, 3), (1, 2)]);
        assert_eq!(polygon_order(6), vec![0, 2, 4, 5, 3, 1]);
    }

    #[test]
    fn gallop_walks_in_index_order() {
        let mut body = BodyState::new(Vec3d::ZERO, Quatd::IDENTITY);
        body.is_walking = true;
        assert_eq!(GaitType::Gallop.update_order(4, &body), vec![0, 1, 2, 3]);
    }

    /// Four legs standing under a body at the origin. Legs in `stepping` lift toward a
    /// body shifted 0.6 forward; legs in `stretched` only see the shift, leaving their
    /// foot outside the trigger zone.
    fn quad_legs(stepping: &[usize], stretched: &[usize]) -> Vec<Leg> {
        use crate::body::LegContext;
        use crate::gait::Gait;
        use crate::math::FORWARD;
        use crate::options::DebugOptions;
        use crate::plan::{BodyPlan, SegmentPlan};
        use crate::terrain::FlatGround;

        let mut plan = BodyPlan::new();
        plan.add_leg_pair(Vec3d::ZERO, Vec3d::new(1.0, 0.0, 1.0), vec![SegmentPlan::new(1.0, FORWARD); 2]);
        plan.add_leg_pair(Vec3d::ZERO, Vec3d::new(1.0, 0.0, -1.0), vec![SegmentPlan::new(1.0, FORWARD); 2]);
        let gait = Gait::default_walk();
        let debug = DebugOptions::default();
        let ground = FlatGround::new(0.0);
        let start = BodyState::new(Vec3d::new(0.0, gait.stationary.body_height, 0.0), Quatd::IDENTITY);
        let moved = BodyState { position: start.position + Vec3d::new(0.0, 0.0, 0.6), ..start.clone() };
        let at_start = LegContext { body: &start, gait: &gait, lerped: gait.stationary, debug: &debug, terrain: &ground };
        let at_moved = LegContext { body: &moved, ..at_start };

        let mut legs: Vec<Leg> =
            plan.legs.iter().enumerate().map(|(i, p)| Leg::new(i, p.clone(), &at_start)).collect();
        for &i in stepping {
            legs[i].update_memo(None, &at_moved);
            legs[i].begin_update(&at_moved);
            legs[i].finish_update(true, &at_moved);
            assert!(legs[i].is_moving(), "leg {i} should be mid-step");
        }
        for &i in stretched {
            legs[i].update_memo(None, &at_moved);
            assert!(legs[i].is_outside_trigger_zone(), "leg {i} should be stretched");
        }
        legs
    }

    fn body(walking: bool) -> BodyState {
        BodyState { is_walking: walking, ..BodyState::new(Vec3d::ZERO, Quatd::IDENTITY) }
    }

    #[test]
    fn walk_waits_for_moving_neighbours() {
        let mut legs = quad_legs(&[0], &[]);
        let walk = GaitType::Walk;
        assert!(!walk.can_move_leg(1, &legs, &body(true)), "mirror of a moving leg must wait");
        assert!(!walk.can_move_leg(2, &legs, &body(true)), "leg behind a moving leg must wait");
        assert!(walk.can_move_leg(3, &legs, &body(true)), "diagonal leg is free");

        legs[0].set_disabled(true);
        assert!(walk.can_move_leg(1, &legs, &body(true)), "disabled legs never block");
    }

    #[test]
    fn gallop_moves_mirrored_pairs_together_while_walking() {
        let gallop = GaitType::Gallop;
        let legs = quad_legs(&[0], &[]);
        assert!(gallop.can_move_leg(1, &legs, &body(true)), "mirror already moving, so follow it");
        assert!(!gallop.can_move_leg(2, &legs, &body(true)), "leg behind a moving leg must wait");

        let idle = quad_legs(&[], &[]);
        assert!(!gallop.can_move_leg(1, &idle, &body(true)), "mirror planted inside its zone");
        let stretched = quad_legs(&[], &[0]);
        assert!(gallop.can_move_leg(1, &stretched, &body(true)), "mirror wants to step too");
    }

    #[test]
    fn gallop_standing_still_uses_walk_rules() {
        let legs = quad_legs(&[0], &[]);
        assert!(!GaitType::Gallop.can_move_leg(1, &legs, &body(false)));
        assert!(GaitType::Gallop.can_move_leg(3, &legs, &body(false)));
    }
}
