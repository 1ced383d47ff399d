//! FABRIK solver over a chain of rigid segments hanging off a root point.
//!
//! Each segment stores the position of its far joint; the near joint is the
//! previous segment's position, or the chain root for the first one.

use serde::{Deserialize, Serialize};

use crate::math::{rotation_between, yaw_pitch_in_frame, yxz, Quatd, Vec3d};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSegment {
    pub position: Vec3d,
    pub length: f64,
    pub init_direction: Vec3d,
}

impl ChainSegment {
    pub fn new(position: Vec3d, length: f64, init_direction: Vec3d) -> Self {
        Self { position, length, init_direction }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicChain {
    pub root: Vec3d,
    pub segments: Vec<ChainSegment>,
    pub max_iterations: usize,
    /// Squared distance at which the end effector counts as converged.
    pub tolerance: f64,
}

impl Default for KinematicChain {
    fn default() -> Self {
        Self::new(Vec3d::ZERO, Vec::new())
    }
}

impl KinematicChain {
    pub const DEFAULT_MAX_ITERATIONS: usize = 20;
    pub const DEFAULT_TOLERANCE: f64 = 0.01;

    pub fn new(root: Vec3d, segments: Vec<ChainSegment>) -> Self {
        Self {
            root,
            segments,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }

    pub fn fabrik(&mut self, target: Vec3d) {
        if self.segments.is_empty() {
            return;
        }
        for _ in 0..self.max_iterations {
            self.fabrik_forward(target);
            self.fabrik_backward();
            if self.end_effector().distance_squared(target) < self.tolerance {
                break;
            }
        }
    }

    /// Pins the tip to `target` and drags every earlier joint along behind it.
    pub fn fabrik_forward(&mut self, target: Vec3d) {
        let Some(last) = self.segments.last_mut() else { return };
        last.position = target;
        for i in (1..self.segments.len()).rev() {
            self.forward_move(i - 1);
        }
    }

    /// Re-anchors the chain to the root and pushes the joints back out toward the tip.
    pub fn fabrik_backward(&mut self) {
        for i in 0..self.segments.len() {
            self.backward_move(i);
        }
    }

    fn forward_move(&mut self, index: usize) {
        let next = &self.segments[index + 1];
        let (pull, length) = (next.position, next.length);
        let segment = &mut self.segments[index];
        segment.position = move_segment(segment.position, pull, length);
    }

    fn backward_move(&mut self, index: usize) {
        let pull = if index == 0 { self.root } else { self.segments[index - 1].position };
        let segment = &mut self.segments[index];
        segment.position = move_segment(segment.position, pull, segment.length);
    }

    /// Lays the segments out end to end from the root along `rotation * init_direction`.
    pub fn straighten_direction(&mut self, rotation: Quatd) {
        let mut position = self.root;
        for segment in &mut self.segments {
            position += rotation * segment.init_direction * segment.length;
            segment.position = position;
        }
    }

    pub fn end_effector(&self) -> Vec3d {
        self.segments.last().map_or(self.root, |s| s.position)
    }

    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }

    /// Offset of each joint from the one before it.
    pub fn vectors(&self) -> Vec<Vec3d> {
        let mut previous = self.root;
        self.segments
            .iter()
            .map(|s| {
                let v = s.position - previous;
                previous = s.position;
                v
            })
            .collect()
    }

    /// First entry is absolute (pivot frame plus yaw/pitch); the rest are arcs between neighbours.
    pub fn relative_rotations(&self, pivot: Quatd) -> Vec<Quatd> {
        let vectors = self.vectors();
        vectors
            .iter()
            .enumerate()
            .map(|(i, current)| {
                if i == 0 {
                    if current.length_squared() <= f64::EPSILON {
                        return pivot;
                    }
                    let (yaw, pitch) = yaw_pitch_in_frame(*current, pivot);
                    (pivot * yxz(yaw, pitch, 0.0)).normalize()
                } else {
                    rotation_between(vectors[i - 1], *current)
                }
            })
            .collect()
    }

    /// World orientation of every segment, with +Z along the segment.
    pub fn rotations(&self, pivot: Quatd) -> Vec<Quatd> {
        let mut rotations = self.relative_rotations(pivot);
        for i in 1..rotations.len() {
            rotations[i] = (rotations[i] * rotations[i - 1]).normalize();
        }
        rotations
    }
}

/// Places `point` on the sphere of radius `length` around `pull_towards`.
pub fn move_segment(point: Vec3d, pull_towards: Vec3d, length: f64) -> Vec3d {
    let direction = (pull_towards - point).try_normalize().unwrap_or(Vec3d::NEG_Y);
    pull_towards - direction * length
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FabrikStage {
    Forward,
    Backward,
}

/// Runs FABRIK one joint move at a time, keeping the state before the last move around.
#[derive(Debug, Clone)]
pub struct FabrikStepper {
    chain: KinematicChain,
    previous: KinematicChain,
    target: Vec3d,
    stage: FabrikStage,
    cursor: usize,
}

impl FabrikStepper {
    pub fn new(chain: KinematicChain, target: Vec3d) -> Self {
        let cursor = chain.segments.len().saturating_sub(1);
        Self { previous: chain.clone(), chain, target, stage: FabrikStage::Forward, cursor }
    }

    pub fn chain(&self) -> &KinematicChain { &self.chain }
    pub fn previous(&self) -> &KinematicChain { &self.previous }
    pub fn stage(&self) -> FabrikStage { self.stage }
    pub fn cursor(&self) -> usize { self.cursor }
    pub fn target(&self) -> Vec3d { self.target }

    pub fn set_target(&mut self, target: Vec3d) {
        self.target = target;
    }

    pub fn set_root(&mut self, root: Vec3d) {
        self.chain.root = root;
    }

    /// Performs a single move. Returns the stage and joint index that were just processed.
    pub fn step(&mut self) -> Option<(FabrikStage, usize)> {
        let n = self.chain.segments.len();
        if n == 0 {
            return None;
        }
        self.previous = self.chain.clone();
        let done = (self.stage, self.cursor);
        match self.stage {
            FabrikStage::Forward => {
                if self.cursor == n - 1 {
                    self.chain.segments[n - 1].position = self.target;
                } else {
                    self.chain.forward_move(self.cursor);
                }
                if self.cursor == 0 {
                    self.stage = FabrikStage::Backward;
                } else {
                    self.cursor -= 1;
                }
            }
            FabrikStage::Backward => {
                self.chain.backward_move(self.cursor);
                if self.cursor + 1 == n {
                    self.stage = FabrikStage::Forward;
                } else {
                    self.cursor += 1;
                }
            }
        }
        Some(done)
    }

    pub fn into_chain(self) -> KinematicChain {
        self.chain
    }
}
