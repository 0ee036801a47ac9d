//! Minimal sparse volumetric grids
//!
//! Just enough of a voxel grid to give the viewer something to display: a
//! block-sparse [`Tree`], a linear [`Transform`], a [`GridClass`] and named
//! [`MetaMap`] entries. Grids are handed to the viewer as a [`GridList`] of
//! type-erased, shared, read-only [`GridBase`] objects.

pub mod accessor;
pub mod coord;
pub mod metadata;
pub mod transform;
pub mod tree;
pub mod value;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use accessor::Accessor;
pub use coord::{Coord, CoordBBox};
pub use metadata::{MetaMap, MetaType, MetaValue};
pub use transform::Transform;
pub use tree::{LeafNode, Tree};
pub use value::{FloatValue, GridValue};

/// Version of the grid library, reported by the viewer
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Grid errors
#[derive(Error, Debug)]
pub enum GridError {
    /// Voxel size is not a positive finite number
    #[error("invalid voxel size {0}")]
    InvalidVoxelSize(f64),

    /// Metadata entry exists with another type
    #[error("metadata \"{name}\" is {found}, not {expected}")]
    MetadataTypeMismatch {
        /// Entry name
        name: String,
        /// Requested type
        expected: &'static str,
        /// Stored type
        found: &'static str,
    },

    /// Narrow band half width is not positive
    #[error("invalid narrow band half width {0}")]
    InvalidNarrowBand(f64),

    /// Radius is not positive
    #[error("invalid radius {0}")]
    InvalidRadius(f64),
}

/// Result type for grid operations
pub type GridResult<T> = Result<T, GridError>;

/// Semantic class of a grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridClass {
    /// No particular interpretation
    #[default]
    Unknown,
    /// Narrow-band signed distance field
    LevelSet,
    /// Density volume
    FogVolume,
    /// Staggered vector field
    Staggered,
}

impl fmt::Display for GridClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::LevelSet => "level set",
            Self::FogVolume => "fog volume",
            Self::Staggered => "staggered",
        };
        f.write_str(name)
    }
}

/// Type-erased, read-only view of a grid
pub trait GridBase: fmt::Debug + Send + Sync {
    /// Grid name
    fn name(&self) -> &str;

    /// Grid class
    fn grid_class(&self) -> GridClass;

    /// Voxel value type name
    fn value_type(&self) -> &'static str;

    /// Number of active voxels
    fn active_voxel_count(&self) -> u64;

    /// Bounding box of active voxels in index space
    fn active_bounding_box(&self) -> CoordBBox;

    /// Number of leaf blocks
    fn leaf_count(&self) -> usize;

    /// Approximate memory footprint in bytes
    fn memory_usage(&self) -> usize;

    /// Index-to-world transform
    fn transform(&self) -> &Transform;

    /// Attached metadata
    fn metadata(&self) -> &MetaMap;

    /// Concrete grid access for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a grid
pub type GridPtr = Arc<dyn GridBase>;

/// Collection of grids passed to the viewer
pub type GridList = Vec<GridPtr>;

/// A named, classed voxel grid
#[derive(Debug, Clone)]
pub struct Grid<T: GridValue> {
    tree: Tree<T>,
    name: String,
    class: GridClass,
    transform: Transform,
    metadata: MetaMap,
}

/// Grid of single precision floats
pub type FloatGrid = Grid<f32>;

/// Grid of double precision floats
pub type DoubleGrid = Grid<f64>;

/// Grid of 32-bit integers
pub type Int32Grid = Grid<i32>;

/// Grid of booleans
pub type BoolGrid = Grid<bool>;

impl<T: GridValue> Grid<T> {
    /// Create an empty grid with the given background
    pub fn new(background: T) -> Self {
        Self {
            tree: Tree::new(background),
            name: String::new(),
            class: GridClass::Unknown,
            transform: Transform::identity(),
            metadata: MetaMap::new(),
        }
    }

    /// Background value
    pub const fn background(&self) -> T {
        self.tree.background()
    }

    /// Set the grid name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Set the grid class
    pub fn set_grid_class(&mut self, class: GridClass) {
        self.class = class;
    }

    /// Replace the transform
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Insert or replace a metadata entry
    pub fn insert_meta(&mut self, name: impl Into<String>, value: impl Into<MetaValue>) {
        self.metadata.insert_meta(name, value);
    }

    /// Mutable metadata
    pub fn metadata_mut(&mut self) -> &mut MetaMap {
        &mut self.metadata
    }

    /// Voxel storage
    pub const fn tree(&self) -> &Tree<T> {
        &self.tree
    }

    /// Mutable voxel storage
    pub fn tree_mut(&mut self) -> &mut Tree<T> {
        &mut self.tree
    }

    /// Coordinate-based voxel accessor
    pub fn accessor(&mut self) -> Accessor<'_, T> {
        Accessor::new(&mut self.tree)
    }

    /// Wrap the grid for inclusion in a [`GridList`]
    pub fn into_ptr(self) -> GridPtr {
        Arc::new(self)
    }
}

impl<T: GridValue> Default for Grid<T> {
    fn default() -> Self {
        Self::new(T::zero())
    }
}

impl<T: GridValue> GridBase for Grid<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn grid_class(&self) -> GridClass {
        self.class
    }

    fn value_type(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn active_voxel_count(&self) -> u64 {
        self.tree.active_voxel_count()
    }

    fn active_bounding_box(&self) -> CoordBBox {
        self.tree.active_bounding_box()
    }

    fn leaf_count(&self) -> usize {
        self.tree.leaf_count()
    }

    fn memory_usage(&self) -> usize {
        self.tree.memory_usage()
    }

    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn metadata(&self) -> &MetaMap {
        &self.metadata
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_base_reports_concrete_grid() {
        let mut grid = Int32Grid::default();
        grid.set_name("cube");
        grid.set_grid_class(GridClass::FogVolume);
        grid.accessor().set_value(Coord::new(1, 2, 3), 7);
        grid.insert_meta("answer", 42_i32);

        let ptr: GridPtr = grid.into_ptr();
        assert_eq!(ptr.name(), "cube");
        assert_eq!(ptr.grid_class(), GridClass::FogVolume);
        assert_eq!(ptr.value_type(), "int32");
        assert_eq!(ptr.active_voxel_count(), 1);
        assert_eq!(ptr.metadata().get_as::<i32>("answer").unwrap(), Some(42));

        let concrete = ptr.as_any().downcast_ref::<Int32Grid>().unwrap();
        assert_eq!(concrete.tree().get_value(Coord::new(1, 2, 3)), 7);
    }

    #[test]
    fn test_grid_class_display() {
        assert_eq!(GridClass::LevelSet.to_string(), "level set");
        assert_eq!(GridClass::default(), GridClass::Unknown);
    }
}
