//! Block heightfield: each unit column has a solid top at a height quantised to 1/16.

use serde::{Deserialize, Serialize};
use spider::{GroundQuery, Vec3d};

/// Ray marching step, one sixteenth of a block.
const MARCH_STEP: f64 = 1.0 / 16.0;
const BISECT_ITERATIONS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerrainConfig {
    Flat { height: f64 },
    /// Stairs climbing along +X, starting at x = 0.
    Steps { step_height: f64, step_length: f64 },
    Hills { amplitude: f64, wavelength: f64 },
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig::Flat { height: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightField {
    shape: TerrainConfig,
}

impl HeightField {
    pub fn new(shape: TerrainConfig) -> Self {
        Self { shape }
    }

    pub fn shape(&self) -> TerrainConfig {
        self.shape
    }

    /// Top of the column containing `(x, z)`.
    pub fn column_height(&self, x: f64, z: f64) -> f64 {
        let (cx, cz) = (x.floor(), z.floor());
        let raw = match self.shape {
            TerrainConfig::Flat { height } => height,
            TerrainConfig::Steps { step_height, step_length } => {
                // at least one column per step
                let length = step_length.max(1.0);
                ((cx / length).floor().max(0.0)) * step_height
            }
            TerrainConfig::Hills { amplitude, wavelength } => {
                let k = std::f64::consts::TAU / wavelength.max(1.0);
                amplitude * (cx * k).sin() * (cz * k).cos()
            }
        };
        (raw * 16.0).round() / 16.0
    }
}

impl GroundQuery for HeightField {
    fn raycast_ground(&self, origin: Vec3d, direction: Vec3d, max_distance: f64) -> Option<Vec3d> {
        if self.is_solid(origin) {
            return Some(origin);
        }
        let direction = direction.try_normalize()?;
        if max_distance.is_nan() || max_distance <= 0.0 {
            return None;
        }

        let mut travelled = 0.0;
        while travelled < max_distance {
            let next = (travelled + MARCH_STEP).min(max_distance);
            if self.is_solid(origin + direction * next) {
                let (mut outside, mut inside) = (travelled, next);
                for _ in 0..BISECT_ITERATIONS {
                    let mid = (outside + inside) * 0.5;
                    if self.is_solid(origin + direction * mid) {
                        inside = mid;
                    } else {
                        outside = mid;
                    }
                }
                return Some(origin + direction * outside);
            }
            travelled = next;
        }
        None
    }

    fn is_solid(&self, position: Vec3d) -> bool {
        position.y < self.column_height(position.x, position.z)
    }
}
