//! Integer voxel coordinates and bounding boxes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Signed integer coordinate of a voxel in index space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// X index
    pub x: i32,
    /// Y index
    pub y: i32,
    /// Z index
    pub z: i32,
}

impl Coord {
    /// The origin
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Create a coordinate
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Coordinate with all three components equal
    pub const fn splat(v: i32) -> Self {
        Self::new(v, v, v)
    }

    /// Clear the low `log2dim` bits of each component.
    ///
    /// This is the origin of the aligned block of side `1 << log2dim` that
    /// contains the coordinate, for negative coordinates too.
    pub const fn aligned(self, log2dim: u32) -> Self {
        let mask = !((1_i32 << log2dim) - 1);
        Self::new(self.x & mask, self.y & mask, self.z & mask)
    }

    /// Component-wise minimum
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Components as an array
    pub const fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[i32; 3]> for Coord {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl Add for Coord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Coord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

/// Inclusive axis-aligned box of voxel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordBBox {
    /// Minimum corner (inclusive)
    pub min: Coord,
    /// Maximum corner (inclusive)
    pub max: Coord,
}

impl CoordBBox {
    /// Create a box from its inclusive corners
    pub const fn new(min: Coord, max: Coord) -> Self {
        Self { min, max }
    }

    /// A box that contains nothing; expanding it by a point yields that point
    pub const fn empty() -> Self {
        Self {
            min: Coord::splat(i32::MAX),
            max: Coord::splat(i32::MIN),
        }
    }

    /// Whether the box contains no coordinates
    pub const fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the box to include `c`
    pub fn expand(&mut self, c: Coord) {
        self.min = self.min.min(c);
        self.max = self.max.max(c);
    }

    /// Whether `c` lies inside the box
    pub const fn contains(&self, c: Coord) -> bool {
        c.x >= self.min.x
            && c.x <= self.max.x
            && c.y >= self.min.y
            && c.y <= self.max.y
            && c.z >= self.min.z
            && c.z <= self.max.z
    }

    /// Number of voxels along each axis, zero for an empty box
    pub fn dim(&self) -> Coord {
        if self.is_empty() {
            Coord::ZERO
        } else {
            self.max - self.min + Coord::splat(1)
        }
    }

    /// Total number of voxels covered
    pub fn volume(&self) -> u64 {
        let d = self.dim();
        [d.x, d.y, d.z].iter().map(|&v| u64::try_from(v).unwrap_or(0)).product()
    }
}

impl Default for CoordBBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for CoordBBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "empty")
        } else {
            write!(f, "{} -> {}", self.min, self.max)
        }
    }
}
