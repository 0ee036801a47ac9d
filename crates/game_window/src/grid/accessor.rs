//! Coordinate-based voxel access

use super::coord::Coord;
use super::tree::Tree;
use super::value::GridValue;

/// Read/write view over a grid's voxels
///
/// Obtained from [`super::Grid::accessor`]; holds the grid's tree mutably for
/// as long as it lives.
#[derive(Debug)]
pub struct Accessor<'a, T: GridValue> {
    tree: &'a mut Tree<T>,
}

impl<'a, T: GridValue> Accessor<'a, T> {
    pub(crate) fn new(tree: &'a mut Tree<T>) -> Self {
        Self { tree }
    }

    /// Value of the voxel at `c`
    pub fn get_value(&self, c: Coord) -> T {
        self.tree.get_value(c)
    }

    /// Value and active state of the voxel at `c`
    pub fn probe_value(&self, c: Coord) -> (T, bool) {
        self.tree.probe_value(c)
    }

    /// Whether the voxel at `c` is active
    pub fn is_value_on(&self, c: Coord) -> bool {
        self.tree.is_value_on(c)
    }

    /// Set the voxel at `c` and mark it active
    pub fn set_value(&mut self, c: Coord, value: T) {
        self.tree.set_value(c, value);
    }

    /// Set the voxel at `c` and mark it inactive
    pub fn set_value_off(&mut self, c: Coord, value: T) {
        self.tree.set_value_off(c, value);
    }

    /// Apply `op` to the value at `c` and mark the voxel active
    pub fn modify_value(&mut self, c: Coord, op: impl FnOnce(T) -> T) {
        let value = op(self.tree.get_value(c));
        self.tree.set_value(c, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_writes_through() {
        let mut tree = Tree::new(0_i32);
        {
            let mut acc = Accessor::new(&mut tree);
            acc.set_value(Coord::new(1, 1, 1), 4);
            acc.modify_value(Coord::new(1, 1, 1), |v| v * 2);
            acc.modify_value(Coord::new(2, 2, 2), |v| v + 1);
            assert_eq!(acc.get_value(Coord::new(1, 1, 1)), 8);
        }
        assert_eq!(tree.get_value(Coord::new(2, 2, 2)), 1);
        assert_eq!(tree.active_voxel_count(), 2);
    }
}
