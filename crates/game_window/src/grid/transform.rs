//! Index-space to world-space mapping

use serde::{Deserialize, Serialize};
use std::fmt;

use super::coord::Coord;
use super::{GridError, GridResult};
use crate::foundation::math::Vec3d;

/// Uniform scale followed by a translation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    voxel_size: f64,
    translation: Vec3d,
}

impl Transform {
    /// Unit voxels at the origin
    pub fn identity() -> Self {
        Self {
            voxel_size: 1.0,
            translation: Vec3d::zeros(),
        }
    }

    /// Linear transform with the given voxel edge length
    pub fn linear(voxel_size: f64) -> GridResult<Self> {
        if !(voxel_size.is_finite() && voxel_size > 0.0) {
            return Err(GridError::InvalidVoxelSize(voxel_size));
        }
        Ok(Self {
            voxel_size,
            translation: Vec3d::zeros(),
        })
    }

    /// Same transform moved by `offset` in world space
    #[must_use]
    pub fn translated(mut self, offset: Vec3d) -> Self {
        self.translation += offset;
        self
    }

    /// Voxel edge length in world units
    pub const fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    /// World-space translation
    pub const fn translation(&self) -> Vec3d {
        self.translation
    }

    /// World position of a voxel center
    pub fn index_to_world(&self, c: Coord) -> Vec3d {
        Vec3d::new(f64::from(c.x), f64::from(c.y), f64::from(c.z)) * self.voxel_size + self.translation
    }

    /// Continuous index-space position of a world point
    pub fn world_to_index(&self, p: Vec3d) -> Vec3d {
        (p - self.translation) / self.voxel_size
    }

    /// Nearest voxel to a world point
    #[allow(clippy::cast_possible_truncation)]
    pub fn world_to_index_cell(&self, p: Vec3d) -> Coord {
        let i = self.world_to_index(p);
        Coord::new(i.x.round() as i32, i.y.round() as i32, i.z.round() as i32)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "linear, voxel size {}, translation [{}, {}, {}]",
            self.voxel_size, self.translation.x, self.translation.y, self.translation.z
        )
    }
}
