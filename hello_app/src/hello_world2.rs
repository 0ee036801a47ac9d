//! Sphere rasterized in index space, then given a world transform

use std::process::ExitCode;

use game_window::prelude::*;

fn main() -> ExitCode {
    hello_app::run(|window| {
        let mut grid = FloatGrid::new(2.0);
        let radius = 50.0_f32;
        make_sphere(&mut grid, radius, Vec3::new(1.5, 2.0, 3.0));

        grid.insert_meta("radius", radius);
        grid.set_transform(Transform::linear(0.5)?);
        grid.set_grid_class(GridClass::LevelSet);
        grid.set_name("LevelSetSphere");

        hello_app::show(window, vec![grid.into_ptr()])
    })
}
