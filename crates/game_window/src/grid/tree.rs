//! Block-sparse voxel storage
//!
//! Space is divided into aligned 8x8x8 blocks. A block is either absent
//! (every voxel reads the background), a constant inactive tile, or a leaf
//! holding one value and one active bit per voxel.

use std::collections::HashMap;

use super::coord::{Coord, CoordBBox};
use super::value::GridValue;

/// log2 of the leaf side length
pub const LEAF_LOG2DIM: u32 = 3;

/// Leaf side length in voxels
pub const LEAF_DIM: i32 = 1 << LEAF_LOG2DIM;

/// Voxels per leaf
pub const LEAF_SIZE: usize = 1 << (3 * LEAF_LOG2DIM);

const MASK_WORDS: usize = LEAF_SIZE / 64;

/// Dense 8x8x8 block of voxels with an active mask
#[derive(Debug, Clone)]
pub struct LeafNode<T> {
    origin: Coord,
    values: Box<[T]>,
    active: [u64; MASK_WORDS],
}

impl<T: GridValue> LeafNode<T> {
    /// Create a leaf whose voxels are all inactive and equal to `fill`
    pub fn new(origin: Coord, fill: T) -> Self {
        Self {
            origin,
            values: vec![fill; LEAF_SIZE].into_boxed_slice(),
            active: [0; MASK_WORDS],
        }
    }

    /// Origin of the leaf (its minimum corner)
    pub const fn origin(&self) -> Coord {
        self.origin
    }

    /// Linear offset of a coordinate inside its leaf
    #[allow(clippy::cast_sign_loss)]
    pub const fn offset(c: Coord) -> usize {
        let m = LEAF_DIM - 1;
        (((c.x & m) << (2 * LEAF_LOG2DIM)) | ((c.y & m) << LEAF_LOG2DIM) | (c.z & m)) as usize
    }

    /// Local coordinate of a linear offset
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn local_coord(offset: usize) -> Coord {
        let m = (LEAF_DIM - 1) as usize;
        Coord::new(
            ((offset >> (2 * LEAF_LOG2DIM)) & m) as i32,
            ((offset >> LEAF_LOG2DIM) & m) as i32,
            (offset & m) as i32,
        )
    }

    /// Value at a linear offset
    pub fn value_at(&self, offset: usize) -> T {
        self.values[offset]
    }

    /// Whether the voxel at a linear offset is active
    pub const fn is_on(&self, offset: usize) -> bool {
        self.active[offset / 64] & (1 << (offset % 64)) != 0
    }

    /// Set the value at a linear offset and its active state
    pub fn set(&mut self, offset: usize, value: T, on: bool) {
        self.values[offset] = value;
        let bit = 1_u64 << (offset % 64);
        if on {
            self.active[offset / 64] |= bit;
        } else {
            self.active[offset / 64] &= !bit;
        }
    }

    /// Number of active voxels
    pub fn active_count(&self) -> u64 {
        self.active.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Whether no voxel is active
    pub fn is_empty(&self) -> bool {
        self.active.iter().all(|&w| w == 0)
    }

    /// Active voxels as global coordinates and values
    pub fn iter_active(&self) -> impl Iterator<Item = (Coord, T)> + '_ {
        (0..LEAF_SIZE)
            .filter(|&i| self.is_on(i))
            .map(|i| (self.origin + Self::local_coord(i), self.values[i]))
    }
}

/// Sparse voxel tree with a background value
#[derive(Debug, Clone)]
pub struct Tree<T> {
    background: T,
    leaves: HashMap<Coord, LeafNode<T>>,
    tiles: HashMap<Coord, T>,
}

impl<T: GridValue> Tree<T> {
    /// Create an empty tree
    pub fn new(background: T) -> Self {
        Self {
            background,
            leaves: HashMap::new(),
            tiles: HashMap::new(),
        }
    }

    /// Value of every voxel not covered by a leaf or tile
    pub const fn background(&self) -> T {
        self.background
    }

    /// Value of the voxel at `c`
    pub fn get_value(&self, c: Coord) -> T {
        self.probe_value(c).0
    }

    /// Value and active state of the voxel at `c`
    pub fn probe_value(&self, c: Coord) -> (T, bool) {
        let origin = c.aligned(LEAF_LOG2DIM);
        if let Some(leaf) = self.leaves.get(&origin) {
            let offset = LeafNode::<T>::offset(c);
            return (leaf.value_at(offset), leaf.is_on(offset));
        }
        (self.tiles.get(&origin).copied().unwrap_or(self.background), false)
    }

    /// Whether the voxel at `c` is active
    pub fn is_value_on(&self, c: Coord) -> bool {
        self.probe_value(c).1
    }

    /// Set the voxel at `c` and mark it active
    pub fn set_value(&mut self, c: Coord, value: T) {
        self.write(c, value, true);
    }

    /// Set the voxel at `c` and mark it inactive
    pub fn set_value_off(&mut self, c: Coord, value: T) {
        self.write(c, value, false);
    }

    fn write(&mut self, c: Coord, value: T, on: bool) {
        let leaf = self.touch_leaf(c.aligned(LEAF_LOG2DIM));
        leaf.set(LeafNode::<T>::offset(c), value, on);
    }

    fn touch_leaf(&mut self, origin: Coord) -> &mut LeafNode<T> {
        let fill = self.tiles.remove(&origin).unwrap_or(self.background);
        self.leaves.entry(origin).or_insert_with(|| LeafNode::new(origin, fill))
    }

    /// Cover the whole block at `origin` with an inactive constant.
    ///
    /// Ignored when a leaf already occupies the block.
    pub fn set_tile(&mut self, origin: Coord, value: T) {
        let origin = origin.aligned(LEAF_LOG2DIM);
        if !self.leaves.contains_key(&origin) {
            self.tiles.insert(origin, value);
        }
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Number of constant tiles
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Number of active voxels
    pub fn active_voxel_count(&self) -> u64 {
        self.leaves.values().map(LeafNode::active_count).sum()
    }

    /// Bounding box of all active voxels
    pub fn active_bounding_box(&self) -> CoordBBox {
        let mut bbox = CoordBBox::empty();
        for (c, _) in self.iter_active() {
            bbox.expand(c);
        }
        bbox
    }

    /// Iterate over every active voxel, in no particular order
    pub fn iter_active(&self) -> impl Iterator<Item = (Coord, T)> + '_ {
        self.leaves.values().flat_map(|leaf| leaf.iter_active())
    }

    /// Leaves of the tree, in no particular order
    pub fn leaves(&self) -> impl Iterator<Item = &LeafNode<T>> {
        self.leaves.values()
    }

    pub(crate) fn leaves_mut(&mut self) -> impl Iterator<Item = &mut LeafNode<T>> {
        self.leaves.values_mut()
    }

    /// Remove every leaf and tile
    pub fn clear(&mut self) {
        self.leaves.clear();
        self.tiles.clear();
    }

    /// Approximate heap usage in bytes
    pub fn memory_usage(&self) -> usize {
        self.leaves.len() * (LEAF_SIZE * std::mem::size_of::<T>() + std::mem::size_of::<LeafNode<T>>())
            + self.tiles.len() * (std::mem::size_of::<Coord>() + std::mem::size_of::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_roundtrips_local_coord() {
        let c = Coord::new(-3, 10, 7);
        let local = LeafNode::<f32>::local_coord(LeafNode::<f32>::offset(c));
        assert_eq!(c.aligned(LEAF_LOG2DIM) + local, c);
    }

    #[test]
    fn test_unset_voxels_read_background() {
        let tree = Tree::new(2.0_f32);
        assert!((tree.get_value(Coord::new(100, -100, 5)) - 2.0).abs() < f32::EPSILON);
        assert!(!tree.is_value_on(Coord::ZERO));
        assert_eq!(tree.leaf_count(), 0);
    }

    #[test]
    fn test_set_value_creates_single_leaf() {
        let mut tree = Tree::new(0_i32);
        tree.set_value(Coord::new(1, 2, 3), 5);
        tree.set_value(Coord::new(7, 7, 7), 6);

        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.active_voxel_count(), 2);
        assert_eq!(tree.get_value(Coord::new(1, 2, 3)), 5);
        assert!(tree.is_value_on(Coord::new(7, 7, 7)));
        assert!(!tree.is_value_on(Coord::new(0, 0, 0)));
    }

    #[test]
    fn test_set_value_off_keeps_value_inactive() {
        let mut tree = Tree::new(0_i32);
        tree.set_value(Coord::ZERO, 1);
        tree.set_value_off(Coord::ZERO, 9);
        assert_eq!(tree.probe_value(Coord::ZERO), (9, false));
        assert_eq!(tree.active_voxel_count(), 0);
    }

    #[test]
    fn test_tile_is_replaced_by_leaf_on_write() {
        let mut tree = Tree::new(1.0_f32);
        tree.set_tile(Coord::new(8, 0, 0), -1.0);
        assert!((tree.get_value(Coord::new(9, 3, 3)) + 1.0).abs() < f32::EPSILON);
        assert_eq!(tree.tile_count(), 1);

        tree.set_value(Coord::new(9, 3, 3), 0.5);
        assert_eq!(tree.tile_count(), 0);
        assert_eq!(tree.leaf_count(), 1);
        // Other voxels of the block keep the tile value.
        assert!((tree.get_value(Coord::new(10, 3, 3)) + 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_active_bounding_box() {
        let mut tree = Tree::new(0_i32);
        assert!(tree.active_bounding_box().is_empty());
        tree.set_value(Coord::new(-5, 0, 2), 1);
        tree.set_value(Coord::new(20, 1, -3), 1);
        let bbox = tree.active_bounding_box();
        assert_eq!(bbox.min, Coord::new(-5, 0, -3));
        assert_eq!(bbox.max, Coord::new(20, 1, 2));
    }
}
