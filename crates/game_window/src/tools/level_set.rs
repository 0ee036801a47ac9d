//! Narrow-band level set construction
//!
//! Signed distances are negative inside a surface and positive outside.
//! Only voxels within the narrow band are stored as active values;
//! [`signed_flood_fill`] then gives the enclosed inactive space the inside
//! value `-background`.

use std::collections::HashMap;

use crate::foundation::math::{pow2, round_up, Vec3};
use crate::grid::tree::{LEAF_DIM, LEAF_SIZE};
use crate::grid::{Coord, FloatValue, Grid, GridClass, GridError, GridResult, LeafNode, Transform, Tree};

/// Rasterize a sphere into `grid` as a narrow-band signed distance field.
///
/// Works in index space. The magnitude of the grid's background is the
/// half width of the band, so only distances within
/// `[-background, background]` are written.
#[allow(clippy::cast_possible_truncation)]
pub fn make_sphere<T: FloatValue>(grid: &mut Grid<T>, radius: f32, center: Vec3) {
    let outside = grid.background();
    let inside = -outside;

    let padding = round_up(outside.abs().to_f64());
    let dim = f64::from(radius) + f64::from(padding);
    let radius = f64::from(radius);
    let c = [f64::from(center.x), f64::from(center.y), f64::from(center.z)];

    let mut accessor = grid.accessor();
    let mut i = (c[0] - dim) as i32;
    while f64::from(i) < c[0] + dim {
        let x2 = pow2(f64::from(i) - c[0]);
        let mut j = (c[1] - dim) as i32;
        while f64::from(j) < c[1] + dim {
            let x2y2 = pow2(f64::from(j) - c[1]) + x2;
            let mut k = (c[2] - dim) as i32;
            while f64::from(k) < c[2] + dim {
                let dist = (x2y2 + pow2(f64::from(k) - c[2])).sqrt() - radius;
                let val = T::from_f64(dist);
                if !(val < inside || outside < val) {
                    accessor.set_value(Coord::new(i, j, k), val);
                }
                k += 1;
            }
            j += 1;
        }
        i += 1;
    }

    signed_flood_fill(grid.tree_mut());
}

/// Build a level set sphere in world units.
///
/// `radius` and `center` are in world space, `half_width` is the band half
/// width in voxels. The returned grid has class [`GridClass::LevelSet`], a
/// linear transform of `voxel_size` and background `voxel_size * half_width`.
#[allow(clippy::cast_possible_truncation)]
pub fn create_level_set_sphere<T: FloatValue>(
    radius: f32,
    center: Vec3,
    voxel_size: f32,
    half_width: f32,
) -> GridResult<Grid<T>> {
    let voxel = f64::from(voxel_size);
    let half_width = f64::from(half_width);
    let transform = Transform::linear(voxel)?;
    if !(half_width.is_finite() && half_width > 0.0) {
        return Err(GridError::InvalidNarrowBand(half_width));
    }
    if !(radius.is_finite() && radius > 0.0) {
        return Err(GridError::InvalidRadius(f64::from(radius)));
    }

    let background = voxel * half_width;
    let mut grid = Grid::new(T::from_f64(background));
    grid.set_transform(transform);
    grid.set_grid_class(GridClass::LevelSet);

    // Index-space sphere; distances are scaled back to world units.
    let r = f64::from(radius) / voxel;
    let c = [
        f64::from(center.x) / voxel,
        f64::from(center.y) / voxel,
        f64::from(center.z) / voxel,
    ];
    let outer = r + half_width;
    let inner = (r - half_width).max(0.0);

    let mut accessor = grid.accessor();
    for i in (c[0] - outer).floor() as i32..=(c[0] + outer).ceil() as i32 {
        let x2 = pow2(f64::from(i) - c[0]);
        for j in (c[1] - outer).floor() as i32..=(c[1] + outer).ceil() as i32 {
            let x2y2 = pow2(f64::from(j) - c[1]) + x2;
            if x2y2 > pow2(outer) {
                continue;
            }
            for k in (c[2] - outer).floor() as i32..=(c[2] + outer).ceil() as i32 {
                let d2 = x2y2 + pow2(f64::from(k) - c[2]);
                if d2 > pow2(outer) || d2 < pow2(inner) {
                    continue;
                }
                let dist = d2.sqrt() - r;
                if dist.abs() < half_width {
                    accessor.set_value(Coord::new(i, j, k), T::from_f64(dist * voxel));
                }
            }
        }
    }

    signed_flood_fill(grid.tree_mut());
    Ok(grid)
}

/// Propagate inside/outside sign from the narrow band into inactive space.
///
/// Inactive voxels inside leaves take the sign of the nearest active voxel
/// along z, falling back to the nearest active voxel of the leaf. Empty
/// blocks between two leaves of the same z column whose facing sides are
/// inside become `-background` tiles.
pub fn signed_flood_fill<T: FloatValue>(tree: &mut Tree<T>) {
    let background = tree.background().abs();
    for leaf in tree.leaves_mut() {
        fill_leaf(leaf, background);
    }

    let mut columns: HashMap<(i32, i32), Vec<(i32, bool, bool)>> = HashMap::new();
    for leaf in tree.leaves() {
        let o = leaf.origin();
        columns
            .entry((o.x, o.y))
            .or_default()
            .push((o.z, face_is_inside(leaf, 0), face_is_inside(leaf, LEAF_DIM - 1)));
    }

    let mut tiles = Vec::new();
    for ((x, y), mut column) in columns {
        column.sort_unstable_by_key(|&(z, _, _)| z);
        for pair in column.windows(2) {
            let (lower_z, _, lower_top_inside) = pair[0];
            let (upper_z, upper_bottom_inside, _) = pair[1];
            if lower_top_inside && upper_bottom_inside {
                let mut z = lower_z + LEAF_DIM;
                while z < upper_z {
                    tiles.push(Coord::new(x, y, z));
                    z += LEAF_DIM;
                }
            }
        }
    }

    let inside = -background;
    for origin in tiles {
        tree.set_tile(origin, inside);
    }
}

fn is_inside<T: FloatValue>(value: T) -> bool {
    value.to_f64() < 0.0
}

fn face_is_inside<T: FloatValue>(leaf: &LeafNode<T>, z: i32) -> bool {
    let mut inside = 0;
    for x in 0..LEAF_DIM {
        for y in 0..LEAF_DIM {
            if is_inside(leaf.value_at(LeafNode::<T>::offset(Coord::new(x, y, z)))) {
                inside += 1;
            }
        }
    }
    inside * 2 > LEAF_DIM * LEAF_DIM
}

fn fill_leaf<T: FloatValue>(leaf: &mut LeafNode<T>, background: T) {
    let signed = |inside: bool| if inside { -background } else { background };

    let mut unresolved = Vec::new();
    for x in 0..LEAF_DIM {
        for y in 0..LEAF_DIM {
            let offsets: Vec<usize> = (0..LEAF_DIM)
                .map(|z| LeafNode::<T>::offset(Coord::new(x, y, z)))
                .collect();
            let Some(first) = offsets.iter().copied().find(|&o| leaf.is_on(o)) else {
                unresolved.extend(offsets);
                continue;
            };
            let mut inside = is_inside(leaf.value_at(first));
            for &o in &offsets {
                if leaf.is_on(o) {
                    inside = is_inside(leaf.value_at(o));
                } else {
                    leaf.set(o, signed(inside), false);
                }
            }
        }
    }

    if unresolved.is_empty() || leaf.is_empty() {
        return;
    }
    let active: Vec<(Coord, bool)> = (0..LEAF_SIZE)
        .filter(|&o| leaf.is_on(o))
        .map(|o| (LeafNode::<T>::local_coord(o), is_inside(leaf.value_at(o))))
        .collect();
    for o in unresolved {
        let c = LeafNode::<T>::local_coord(o);
        let nearest = active
            .iter()
            .min_by_key(|(a, _)| (a.x - c.x).abs() + (a.y - c.y).abs() + (a.z - c.z).abs());
        if let Some(&(_, inside)) = nearest {
            leaf.set(o, signed(inside), false);
        }
    }
}
